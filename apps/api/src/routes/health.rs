use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::config::StorageBackend;
use crate::state::AppState;

/// GET /health
/// Returns service status, version and which optional surfaces are enabled.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let storage = match state.config.storage_backend {
        StorageBackend::File => "file",
        StorageBackend::Memory => "memory",
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-api",
        "storage": storage,
        "advisor": state.advisor.is_some()
    }))
}
