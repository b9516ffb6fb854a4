//! Test utilities for spendwise-core
//!
//! Provides a mock completion server speaking both the OpenAI chat
//! completions API and the Ollama generate API, for backend tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

#[derive(Default)]
struct ServerState {
    reply: String,
    failing: bool,
    requests: AtomicUsize,
    last_request: Mutex<Option<Value>>,
}

impl ServerState {
    fn record(&self, body: Value) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(body);
        }
    }
}

/// Mock completion server for backend tests
pub struct MockCompletionServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCompletionServer {
    /// Start a server that answers every completion with `reply`
    pub async fn start_with_reply(reply: &str) -> Self {
        Self::start_with_state(ServerState {
            reply: reply.to_string(),
            ..Default::default()
        })
        .await
    }

    /// Start a server whose completion endpoints return 500
    pub async fn start_failing() -> Self {
        Self::start_with_state(ServerState {
            failing: true,
            ..Default::default()
        })
        .await
    }

    async fn start_with_state(state: ServerState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat))
            .route("/v1/models", get(handle_models))
            .route("/api/generate", post(handle_generate))
            .route("/api/tags", get(handle_tags))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Completion requests received so far
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// JSON body of the most recent completion request
    pub fn last_request(&self) -> Option<Value> {
        self.state.last_request.lock().ok().and_then(|l| l.clone())
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCompletionServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_chat(State(state): State<Arc<ServerState>>, Json(body): Json<Value>) -> Response {
    let model = body["model"].clone();
    state.record(body);

    if state.failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model overloaded").into_response();
    }

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": state.reply},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

async fn handle_generate(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> Response {
    let model = body["model"].clone();
    state.record(body);

    if state.failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model overloaded").into_response();
    }

    Json(json!({
        "model": model,
        "response": state.reply,
        "done": true
    }))
    .into_response()
}

async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "gpt-4o-mini", "object": "model"}]
    }))
}

async fn handle_tags() -> Json<Value> {
    Json(json!({
        "models": [{
            "name": "llama3.2:latest",
            "modified_at": "2024-01-01T00:00:00Z",
            "size": 4_000_000_000u64
        }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockCompletionServer::start_with_reply("Food").await;
        assert!(server.url().starts_with("http://127.0.0.1:"));
        assert_eq!(server.request_count(), 0);
        assert!(server.last_request().is_none());
    }
}
