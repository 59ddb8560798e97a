use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::auth::VerifierSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider tenant domain, e.g. `dev-fc34y9lq.us.auth0.com`
    pub domain: String,
    pub audience: String,
    /// Expected `iss`; derived from the domain when unset
    pub issuer: Option<String>,
    pub algorithms: Vec<String>,
    pub leeway_secs: u64,
    /// Local JWKS document used instead of fetching from the domain
    pub jwks_path: Option<String>,
    /// Shared HS256 secret for local development tokens
    #[serde(skip_serializing)]
    pub shared_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Key id assigned to the shared-secret development key
pub const SHARED_SECRET_KID: &str = "local";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Auth overrides
        if let Some(v) = var("AUTH0_DOMAIN") {
            self.auth.domain = v;
        }
        if let Some(v) = var("API_AUDIENCE") {
            self.auth.audience = v;
        }
        if let Some(v) = var("AUTH_ISSUER") {
            self.auth.issuer = Some(v);
        }
        if let Some(v) = var("AUTH_ALGORITHMS") {
            self.auth.algorithms = split_list(&v);
        }
        if let Some(v) = var("AUTH_LEEWAY_SECS") {
            self.auth.leeway_secs = v.parse().unwrap_or(self.auth.leeway_secs);
        }
        if let Some(v) = var("AUTH_JWKS_PATH") {
            self.auth.jwks_path = Some(v);
        }
        if let Some(v) = var("AUTH_SHARED_SECRET") {
            self.auth.shared_secret = Some(v);
        }

        // Database overrides
        if let Some(v) = var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // Security overrides
        if let Some(v) = var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            auth: AuthConfig::defaults(),
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            auth: AuthConfig::defaults(),
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            auth: AuthConfig::defaults(),
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

impl AuthConfig {
    fn defaults() -> Self {
        Self {
            domain: "dev-fc34y9lq.us.auth0.com".to_string(),
            audience: "coffee-api".to_string(),
            issuer: None,
            algorithms: vec!["RS256".to_string()],
            leeway_secs: 0,
            jwks_path: None,
            shared_secret: None,
        }
    }

    pub fn issuer(&self) -> String {
        self.issuer
            .clone()
            .unwrap_or_else(|| format!("https://{}/", self.domain))
    }

    /// Well-known JWKS location published by the identity provider
    pub fn jwks_url(&self) -> Result<url::Url, url::ParseError> {
        url::Url::parse(&format!("https://{}/", self.domain))?.join(".well-known/jwks.json")
    }

    /// Allowed signing algorithms; unknown names are ignored.
    ///
    /// A shared secret implies HS256 even when the list does not name it.
    pub fn allowed_algorithms(&self) -> Vec<Algorithm> {
        let mut algorithms: Vec<Algorithm> = self
            .algorithms
            .iter()
            .filter_map(|name| match Algorithm::from_str(name) {
                Ok(alg) => Some(alg),
                Err(_) => {
                    tracing::warn!("Ignoring unknown signing algorithm '{}'", name);
                    None
                }
            })
            .collect();

        if self.shared_secret.is_some() && !algorithms.contains(&Algorithm::HS256) {
            algorithms.push(Algorithm::HS256);
        }
        algorithms
    }

    pub fn verifier_settings(&self) -> VerifierSettings {
        VerifierSettings {
            issuer: self.issuer(),
            audience: self.audience.clone(),
            algorithms: self.allowed_algorithms(),
            leeway_secs: self.leeway_secs,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_vars(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::development().with_overrides(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.audience, "coffee-api");
        assert_eq!(config.auth.leeway_secs, 0);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.security.cors_origins, vec!["https://app.example.com"]);
    }

    #[test]
    fn issuer_and_jwks_url_derive_from_domain() {
        let config = with_vars(&[("AUTH0_DOMAIN", "shop.eu.auth0.com")]);
        assert_eq!(config.auth.issuer(), "https://shop.eu.auth0.com/");
        assert_eq!(
            config.auth.jwks_url().unwrap().as_str(),
            "https://shop.eu.auth0.com/.well-known/jwks.json"
        );

        let config = with_vars(&[("AUTH_ISSUER", "https://issuer.example.com/")]);
        assert_eq!(config.auth.issuer(), "https://issuer.example.com/");
    }

    #[test]
    fn overrides_apply_and_bad_numbers_keep_defaults() {
        let config = with_vars(&[
            ("PORT", "not-a-port"),
            ("AUTH_LEEWAY_SECS", "30"),
            ("SECURITY_CORS_ORIGINS", "http://localhost:8100, ,http://localhost:4200"),
        ]);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.leeway_secs, 30);
        assert_eq!(
            config.security.cors_origins,
            vec!["http://localhost:8100", "http://localhost:4200"]
        );
    }

    #[test]
    fn shared_secret_enables_hs256() {
        let config = with_vars(&[("AUTH_ALGORITHMS", "RS256,BOGUS"), ("AUTH_SHARED_SECRET", "s3cret")]);
        assert_eq!(
            config.auth.allowed_algorithms(),
            vec![Algorithm::RS256, Algorithm::HS256]
        );
    }
}
