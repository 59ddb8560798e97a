use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors while loading verification material
#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("Failed to read key file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JWKS document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to fetch JWKS: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid key material: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),

    #[error("No usable signing keys found")]
    Empty,
}

/// A single trusted key and the algorithm it verifies
#[derive(Clone)]
pub struct VerificationKey {
    pub key: DecodingKey,
    pub algorithm: Algorithm,
}

/// Trusted verification keys indexed by key id (`kid`).
///
/// Loaded once at startup and never mutated afterwards; a verifier owns its
/// key set, so swapping keys means building a new verifier.
#[derive(Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, VerificationKey>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, kid: impl Into<String>, key: DecodingKey, algorithm: Algorithm) -> Self {
        self.keys.insert(kid.into(), VerificationKey { key, algorithm });
        self
    }

    /// HS256 key set built from a shared secret, for local development and tests
    pub fn from_secret(kid: impl Into<String>, secret: &[u8]) -> Self {
        Self::new().with_key(kid, DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    pub fn from_jwks(jwks: &JwkSet) -> Result<Self, KeySetError> {
        let mut set = Self::new();

        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                warn!("Skipping JWK without a key id");
                continue;
            };
            let Some(algorithm) = algorithm_for(jwk) else {
                warn!("Skipping JWK '{}' with unsupported key type or algorithm", kid);
                continue;
            };
            let key = match DecodingKey::from_jwk(jwk) {
                Ok(key) => key,
                Err(e) => {
                    warn!("Skipping JWK '{}' with unusable key material: {}", kid, e);
                    continue;
                }
            };
            set.keys.insert(kid, VerificationKey { key, algorithm });
        }

        if set.is_empty() {
            return Err(KeySetError::Empty);
        }
        Ok(set)
    }

    pub fn from_jwks_json(document: &str) -> Result<Self, KeySetError> {
        let jwks: JwkSet = serde_json::from_str(document)?;
        Self::from_jwks(&jwks)
    }

    pub fn from_jwks_file(path: impl AsRef<Path>) -> Result<Self, KeySetError> {
        let document = std::fs::read_to_string(path.as_ref())?;
        let set = Self::from_jwks_json(&document)?;
        info!("Loaded {} signing key(s) from {}", set.len(), path.as_ref().display());
        Ok(set)
    }

    /// Fetch the identity provider's published JWKS
    pub async fn fetch(url: &url::Url) -> Result<Self, KeySetError> {
        let jwks: JwkSet = reqwest::get(url.clone())
            .await?
            .error_for_status()?
            .json()
            .await?;
        let set = Self::from_jwks(&jwks)?;
        info!("Fetched {} signing key(s) from {}", set.len(), url);
        Ok(set)
    }

    pub fn get(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }
}

impl fmt::Debug for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kids: Vec<&str> = self.key_ids().collect();
        kids.sort_unstable();
        f.debug_struct("KeySet").field("kids", &kids).finish()
    }
}

fn algorithm_for(jwk: &Jwk) -> Option<Algorithm> {
    match (&jwk.algorithm, &jwk.common.key_algorithm) {
        (AlgorithmParameters::RSA(_), None | Some(KeyAlgorithm::RS256)) => Some(Algorithm::RS256),
        (AlgorithmParameters::RSA(_), Some(KeyAlgorithm::RS384)) => Some(Algorithm::RS384),
        (AlgorithmParameters::RSA(_), Some(KeyAlgorithm::RS512)) => Some(Algorithm::RS512),
        (AlgorithmParameters::RSA(_), Some(KeyAlgorithm::PS256)) => Some(Algorithm::PS256),
        (AlgorithmParameters::OctetKey(_), None | Some(KeyAlgorithm::HS256)) => Some(Algorithm::HS256),
        (AlgorithmParameters::OctetKey(_), Some(KeyAlgorithm::HS384)) => Some(Algorithm::HS384),
        (AlgorithmParameters::OctetKey(_), Some(KeyAlgorithm::HS512)) => Some(Algorithm::HS512),
        _ => None,
    }
}
