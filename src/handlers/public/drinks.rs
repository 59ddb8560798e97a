use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::Drink;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /drinks - Public menu, short representation only
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let drinks = state.store.list_all().await?;
    let short: Vec<_> = drinks.iter().map(Drink::short).collect();

    Ok(ApiResponse::success(json!({ "drinks": short })))
}
