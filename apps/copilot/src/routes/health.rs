use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "copilot",
        "reasoning_model": state.config.reasoning_model,
        "api_key_set": state.credentials.is_set(),
        "authenticated": state.pipeline.session().is_authenticated(),
    }))
}
