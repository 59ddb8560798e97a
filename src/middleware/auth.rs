use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{self, AuthError, Permission, TokenVerifier};
use crate::error::ApiError;

/// Verifier plus the permission one route requires
#[derive(Clone, Debug)]
pub struct PermissionGate {
    pub verifier: Arc<TokenVerifier>,
    pub permission: Permission,
}

impl PermissionGate {
    pub fn new(verifier: Arc<TokenVerifier>, permission: Permission) -> Self {
        Self { verifier, permission }
    }
}

/// Middleware run in front of every protected handler.
///
/// Verifies the bearer token, then checks the gate's permission against the
/// token's grant; only when both pass does the request reach the handler, with
/// the verified `Claims` available as a request extension.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };

    let claims = gate.verifier.verify(header_value).map_err(|err| {
        tracing::debug!(reason = err.code(), "Bearer token rejected");
        err
    })?;

    auth::require(&claims, gate.permission.as_str()).map_err(|err| {
        tracing::warn!(
            subject = %claims.sub,
            permission = %gate.permission,
            reason = err.code(),
            "Permission check failed"
        );
        err
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
