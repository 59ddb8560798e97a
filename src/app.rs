use axum::{
    handler::Handler,
    middleware::{from_fn_with_state, map_response},
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{Permission, TokenVerifier};
use crate::database::DrinkStore;
use crate::handlers::{protected, public};
use crate::middleware::{json_method_not_allowed, not_found, require_permission, PermissionGate};

/// Shared request state: the drink store and the token verifier, both built
/// once at startup and handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DrinkStore>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn DrinkStore>, verifier: TokenVerifier) -> Self {
        Self {
            store,
            verifier: Arc::new(verifier),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let verifier = state.verifier.clone();
    let gate = move |permission: Permission| {
        from_fn_with_state(PermissionGate::new(verifier.clone(), permission), require_permission)
    };

    Router::new()
        // Public
        .route("/health", get(public::health_get))
        .route(
            "/drinks",
            get(public::drinks_list)
                .post(protected::drinks_create.layer(gate(Permission::PostDrinks))),
        )
        // Protected
        .route(
            "/drinks-detail",
            get(protected::drinks_detail.layer(gate(Permission::GetDrinksDetail))),
        )
        .route(
            "/drinks/:id",
            patch(protected::drinks_update.layer(gate(Permission::PatchDrinks)))
                .delete(protected::drinks_delete.layer(gate(Permission::DeleteDrinks))),
        )
        .fallback(not_found)
        // Global middleware
        .layer(map_response(json_method_not_allowed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
