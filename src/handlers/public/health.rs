use axum::extract::State;
use chrono::Utc;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /health - Liveness plus a round trip to the drink store
pub async fn get(State(state): State<AppState>) -> ApiResult<Value> {
    match state.store.list_all().await {
        Ok(_) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "timestamp": Utc::now(),
        }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Drink store unavailable"))
        }
    }
}
