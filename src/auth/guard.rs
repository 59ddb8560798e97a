use super::claims::Claims;
use super::error::AuthError;

/// Check that verified claims grant `permission`.
///
/// A token without a `permissions` claim is malformed (400), a token whose
/// grant lacks the permission is denied (403).
pub fn require(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsMissing)?;

    if granted.contains(permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied(permission.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::{Audience, Permission};
    use axum::http::StatusCode;

    fn claims_with(permissions: Option<&[&str]>) -> Claims {
        Claims {
            iss: "https://example.auth0.com/".to_string(),
            sub: "auth0|barista".to_string(),
            aud: Audience::One("coffee-api".to_string()),
            exp: 4_102_444_800,
            iat: None,
            permissions: permissions.map(|p| p.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn granted_permission_passes() {
        let claims = claims_with(Some(&["get:drinks-detail", "post:drinks"][..]));
        assert!(require(&claims, Permission::PostDrinks.as_str()).is_ok());
        assert!(require(&claims, Permission::GetDrinksDetail.as_str()).is_ok());
    }

    #[test]
    fn missing_claim_is_bad_request_for_every_permission() {
        let claims = claims_with(None);
        for permission in Permission::ALL {
            let err = require(&claims, permission.as_str()).unwrap_err();
            assert_eq!(err, AuthError::PermissionsMissing);
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn absent_permission_is_forbidden() {
        let claims = claims_with(Some(&["get:drinks-detail"][..]));
        let err = require(&claims, Permission::DeleteDrinks.as_str()).unwrap_err();
        assert_eq!(err, AuthError::PermissionDenied("delete:drinks".to_string()));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn empty_grant_is_denial_not_missing_claim() {
        let claims = claims_with(Some(&[][..]));
        let err = require(&claims, Permission::PatchDrinks.as_str()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn check_does_not_touch_claims() {
        let claims = claims_with(Some(&["patch:drinks"][..]));
        let before = claims.permissions.clone();
        let first = require(&claims, "delete:drinks");
        let second = require(&claims, "delete:drinks");
        assert_eq!(first, second);
        assert_eq!(claims.permissions, before);
    }
}
