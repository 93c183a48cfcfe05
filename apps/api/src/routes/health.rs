use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "prepify-api"
    }))
}

/// GET /api/v1/env-check
/// Reports whether the provider credential is configured, never the credential itself.
pub async fn env_check_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "has_key": state.recipes.has_api_key() }))
}
