use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and the active completion backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "screening-api",
        "backend": state.backend.kind(),
        "semantic_similarity": state.backend.semantic_similarity(),
        "indexed": state.index.len(),
    }))
}
