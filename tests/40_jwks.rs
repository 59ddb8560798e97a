mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

use coffee_shop_api::auth::{AuthError, KeySet, TokenVerifier, VerifierSettings};
use coffee_shop_api::database::MemoryDrinkStore;
use coffee_shop_api::{app, AppState};

use common::{claims, request, TestApp};

const JWKS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/jwks.json");
const PRIVATE_KEY: &[u8] = include_bytes!("fixtures/rs256_private.pem");
const FIXTURE_KID: &str = "fixture-rsa-1";

fn rs256_verifier() -> Result<TokenVerifier> {
    let settings = VerifierSettings {
        algorithms: vec![Algorithm::RS256],
        ..common::settings()
    };
    Ok(TokenVerifier::new(settings, KeySet::from_jwks_file(JWKS_PATH)?))
}

fn rs256_token(kid: &str, permissions: &[&str]) -> Result<String> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY)?;
    Ok(encode(&header, &claims(Some(permissions)), &key)?)
}

#[test]
fn jwks_fixture_loads_rsa_key() -> Result<()> {
    let keys = KeySet::from_jwks_file(JWKS_PATH)?;
    assert_eq!(keys.key_ids().collect::<Vec<_>>(), vec![FIXTURE_KID]);
    assert_eq!(keys.get(FIXTURE_KID).map(|k| k.algorithm), Some(Algorithm::RS256));
    Ok(())
}

#[test]
fn rs256_token_from_identity_provider_verifies() -> Result<()> {
    let verifier = rs256_verifier()?;
    let token = rs256_token(FIXTURE_KID, &["get:drinks-detail"])?;

    let claims = verifier.verify(Some(&format!("Bearer {}", token)))?;
    assert_eq!(claims.sub, "auth0|integration");
    Ok(())
}

#[test]
fn unknown_kid_is_invalid_signature() -> Result<()> {
    let verifier = rs256_verifier()?;
    let token = rs256_token("rotated-away", &["get:drinks-detail"])?;

    assert_eq!(verifier.verify_token(&token).unwrap_err(), AuthError::InvalidSignature);
    Ok(())
}

#[test]
fn symmetric_token_cannot_impersonate_rsa_key() -> Result<()> {
    let verifier = rs256_verifier()?;
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(FIXTURE_KID.to_string());
    let token = encode(
        &header,
        &claims(Some(&["delete:drinks"][..])),
        &EncodingKey::from_secret(b"public-modulus-guess"),
    )?;

    assert_eq!(verifier.verify_token(&token).unwrap_err(), AuthError::InvalidSignature);
    Ok(())
}

#[tokio::test]
async fn rs256_token_drives_protected_route() -> Result<()> {
    let store = Arc::new(MemoryDrinkStore::seeded());
    let app = TestApp {
        router: app(AppState::new(store.clone(), rs256_verifier()?)),
        store,
    };
    let token = rs256_token(FIXTURE_KID, &["delete:drinks"])?;

    let (status, body) = app.send(request("DELETE", "/drinks/1", Some(&token), None)).await?;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["deleted"], json!(1));
    assert!(app.titles().await.is_empty());
    Ok(())
}
