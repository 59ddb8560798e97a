use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;

use coffee_shop_api::auth::{KeySet, TokenVerifier};
use coffee_shop_api::config::{AppConfig, AuthConfig, DatabaseConfig, Environment, SecurityConfig, SHARED_SECRET_KID};
use coffee_shop_api::database::{DrinkStore, MemoryDrinkStore, PgDrinkStore};
use coffee_shop_api::{app, AppState};

#[derive(Parser)]
#[command(name = "coffee-shop-api")]
#[command(about = "Coffee shop menu API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Address to bind (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Drop the drinks table and reseed it before serving")]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up AUTH0_DOMAIN, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting coffee shop API in {:?} mode", config.environment);

    let keys = load_keys(&config.auth, config.environment).await?;
    let verifier = TokenVerifier::new(config.auth.verifier_settings(), keys);
    let store = build_store(&config.database, args.reset_db).await?;

    let mut router = app(AppState::new(store.clone(), verifier));
    if let Some(cors) = cors_layer(&config.security, config.environment) {
        router = router.layer(cors);
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Coffee shop API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn load_keys(auth: &AuthConfig, environment: Environment) -> anyhow::Result<KeySet> {
    if let Some(path) = &auth.jwks_path {
        return KeySet::from_jwks_file(path).with_context(|| format!("loading JWKS from {}", path));
    }

    if let Some(secret) = &auth.shared_secret {
        if environment == Environment::Production {
            tracing::warn!("AUTH_SHARED_SECRET is set in production; tokens are verified with a shared HS256 key");
        }
        return Ok(KeySet::from_secret(SHARED_SECRET_KID, secret.as_bytes()));
    }

    let url = auth.jwks_url().context("invalid AUTH0_DOMAIN")?;
    KeySet::fetch(&url)
        .await
        .with_context(|| format!("fetching JWKS from {}", url))
}

async fn build_store(database: &DatabaseConfig, reset: bool) -> anyhow::Result<Arc<dyn DrinkStore>> {
    let Some(url) = &database.url else {
        tracing::warn!("DATABASE_URL not set; drinks are kept in memory and lost on restart");
        if reset {
            tracing::warn!("--reset-db has no effect without DATABASE_URL; the in-memory menu starts seeded");
        }
        return Ok(Arc::new(MemoryDrinkStore::seeded()));
    };

    let store = PgDrinkStore::connect(url, database.max_connections)
        .await
        .context("connecting to database")?;
    if reset {
        store.reset().await.context("resetting drinks table")?;
    } else {
        store.ensure_schema().await.context("creating drinks table")?;
    }
    Ok(Arc::new(store))
}

fn cors_layer(security: &SecurityConfig, environment: Environment) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if environment == Environment::Development || security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
