use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::claims::Claims;
use super::error::AuthError;
use super::keys::KeySet;

/// Trust settings checked against every token
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    pub issuer: String,
    pub audience: String,
    pub algorithms: Vec<Algorithm>,
    /// Clock skew tolerated on `exp`, in seconds
    pub leeway_secs: u64,
}

/// Validates bearer tokens issued by the external identity provider.
///
/// Holds only immutable state, so a single instance is shared across all
/// requests without synchronization.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    settings: VerifierSettings,
    keys: KeySet,
}

impl TokenVerifier {
    pub fn new(settings: VerifierSettings, keys: KeySet) -> Self {
        Self { settings, keys }
    }

    pub fn settings(&self) -> &VerifierSettings {
        &self.settings
    }

    /// Verify the raw `Authorization` header value and return the token's claims
    pub fn verify(&self, header_value: Option<&str>) -> Result<Claims, AuthError> {
        let token = bearer_token(header_value)?;
        self.verify_token(token)
    }

    /// Verify an already-extracted bearer token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

        // Unknown or absent kid means no trusted key can vouch for the token
        let entry = header
            .kid
            .as_deref()
            .and_then(|kid| self.keys.get(kid))
            .ok_or(AuthError::InvalidSignature)?;

        if !self.settings.algorithms.contains(&entry.algorithm) {
            return Err(AuthError::InvalidSignature);
        }

        let mut validation = Validation::new(entry.algorithm);
        validation.set_issuer(&[&self.settings.issuer]);
        validation.set_audience(&[&self.settings.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = self.settings.leeway_secs;

        let data = decode::<Claims>(token, &entry.key, &validation)?;
        Ok(data.claims)
    }
}

/// Extract the token from a `Bearer <token>` header value
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AuthError> {
    let value = header_value.ok_or(AuthError::MissingHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}
