use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::app::AppState;
use crate::auth::Claims;
use crate::database::models::{Drink, DrinkChanges, FieldErrors, NewDrink};
use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /drinks-detail - Full recipes (requires `get:drinks-detail`)
pub async fn detail(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Value> {
    let drinks = state.store.list_all().await?;
    debug!(subject = %claims.sub, count = drinks.len(), "Listing drink details");

    let long: Vec<_> = drinks.iter().map(Drink::long).collect();
    Ok(ApiResponse::success(json!({ "drinks": long })))
}

/// POST /drinks - Add a drink (requires `post:drinks`)
///
/// Expected Input:
/// ```json
/// { "title": "latte", "recipe": [{ "name": "milk", "color": "white", "parts": 3 }] }
/// ```
/// A single ingredient object is accepted in place of the list.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<NewDrink>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload.map_err(reject_body)?;
    let draft = body.validate().map_err(invalid_drink)?;

    let drink = state.store.insert(draft).await?;
    info!(subject = %claims.sub, drink_id = drink.id, "Drink created");

    Ok(ApiResponse::success(json!({ "drinks": drink.long() })))
}

/// PATCH /drinks/:id - Change title and/or recipe (requires `patch:drinks`)
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DrinkChanges>, JsonRejection>,
) -> ApiResult<Value> {
    let id = drink_id(id)?;

    // Unknown ids are reported before anything about the body
    if state.store.get_by_id(id).await?.is_none() {
        return Err(StoreError::NotFound(id).into());
    }

    let Json(changes) = payload.map_err(reject_body)?;
    if changes.is_empty() {
        return Err(ApiError::bad_request("Provide a title or a recipe to update"));
    }
    let update = changes.validate().map_err(invalid_drink)?;

    let drink = state.store.update(id, update).await?;
    info!(subject = %claims.sub, drink_id = id, "Drink updated");

    Ok(ApiResponse::success(json!({ "drinks": [drink.long()] })))
}

/// DELETE /drinks/:id - Remove a drink (requires `delete:drinks`)
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Value> {
    let id = drink_id(id)?;

    state.store.delete(id).await?;
    info!(subject = %claims.sub, drink_id = id, "Drink deleted");

    Ok(ApiResponse::success(json!({ "deleted": id })))
}

/// Non-numeric ids cannot name a drink
fn drink_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError::not_found("Resource not found"))
}

fn reject_body(rejection: JsonRejection) -> ApiError {
    ApiError::invalid_json(rejection.body_text())
}

fn invalid_drink(field_errors: FieldErrors) -> ApiError {
    ApiError::unprocessable_entity("Invalid drink", field_errors)
}
