mod auth;
mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod profile;
mod routes;
mod state;
mod validation;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::session::RedisTokenStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::profile::gateway::PgProfileGateway;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerBridge API v{}", env!("CARGO_PKG_VERSION"));

    let mut state = AppState::in_memory(config.clone());

    // PostgreSQL backs the profile gateway when configured
    if let Some(database_url) = &config.database_url {
        let pool = create_pool(database_url).await?;
        state.gateway = Arc::new(PgProfileGateway::new(pool.clone()));
        state.db = Some(pool);
    }
    info!("Profile gateway: {}", state.gateway.backend());

    // Redis holds session tokens when configured
    if let Some(redis_url) = &config.redis_url {
        let client = redis::Client::open(redis_url.as_str())?;
        state.tokens = Arc::new(RedisTokenStore::new(client, config.session_ttl_secs));
    }
    info!("Token store: {}", state.tokens.backend());

    // TODO: restrict CORS origins once the web client has a fixed host
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
