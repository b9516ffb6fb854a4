//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use spendwise_core::{check_health, CompletionBackend};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Backend kind (`openai`, `ollama`, `mock`), null when unconfigured
    pub ai_backend: Option<&'static str>,
    pub ai_model: Option<String>,
    pub ai_available: bool,
}

/// GET /health - Liveness plus a live AI backend check
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai_available = match state.ai {
        Some(ref client) => check_health(client, state.health_timeout).await,
        None => false,
    };

    Json(HealthResponse {
        status: "ok",
        ai_backend: state.ai.as_ref().map(|c| c.kind()),
        ai_model: state.ai.as_ref().map(|c| c.model().to_string()),
        ai_available,
    })
}
