use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus the storage backends in use.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let database = match &state.db {
        Some(pool) if pool.is_closed() => "closed",
        Some(_) => "connected",
        None => "disabled",
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "careerbridge-api",
        "profileGateway": state.gateway.backend(),
        "tokenStore": state.tokens.backend(),
        "database": database,
        "openWizards": state.wizards.len().await,
    }))
}
