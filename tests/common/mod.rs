#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use coffee_shop_api::auth::{KeySet, TokenVerifier, VerifierSettings};
use coffee_shop_api::database::models::{DrinkDraft, Ingredient};
use coffee_shop_api::database::{DrinkStore, MemoryDrinkStore};
use coffee_shop_api::{app, AppState};

pub const SECRET: &[u8] = b"integration-test-secret";
pub const KID: &str = "test-key";
pub const ISSUER: &str = "https://coffee.test.auth0.com/";
pub const AUDIENCE: &str = "coffee-api";

pub const ALL_PERMISSIONS: [&str; 4] = ["get:drinks-detail", "post:drinks", "patch:drinks", "delete:drinks"];

pub fn settings() -> VerifierSettings {
    VerifierSettings {
        issuer: ISSUER.to_string(),
        audience: AUDIENCE.to_string(),
        algorithms: vec![Algorithm::HS256],
        leeway_secs: 0,
    }
}

pub fn verifier() -> TokenVerifier {
    TokenVerifier::new(settings(), KeySet::from_secret(KID, SECRET))
}

/// Claims for a token valid for the next hour
pub fn claims(permissions: Option<&[&str]>) -> Value {
    let now = Utc::now().timestamp();
    let mut claims = json!({
        "iss": ISSUER,
        "sub": "auth0|integration",
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
    });
    if let Some(permissions) = permissions {
        claims["permissions"] = json!(permissions);
    }
    claims
}

pub fn sign(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KID.to_string());
    encode(&header, claims, &EncodingKey::from_secret(SECRET)).expect("sign token")
}

pub fn token(permissions: &[&str]) -> String {
    sign(&claims(Some(permissions)))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDrinkStore>,
}

/// App over an in-memory menu holding `water` (id 1) and `latte` (id 2)
pub async fn test_app() -> TestApp {
    let store = Arc::new(MemoryDrinkStore::seeded());
    store
        .insert(DrinkDraft {
            title: "latte".to_string(),
            recipe: vec![
                Ingredient { name: "espresso".into(), color: "brown".into(), parts: 1 },
                Ingredient { name: "milk".into(), color: "white".into(), parts: 3 },
            ],
        })
        .await
        .expect("seed latte");

    let router = app(AppState::new(store.clone(), verifier()));
    TestApp { router, store }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    pub async fn titles(&self) -> Vec<String> {
        self.store
            .list_all()
            .await
            .expect("list drinks")
            .into_iter()
            .map(|d| d.title)
            .collect()
    }
}

pub fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = auth {
        builder = builder.header(header::AUTHORIZATION, bearer(token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("build request")
}
