//! Pluggable text-completion backend abstraction
//!
//! Everything the app asks of a language model goes through one narrow
//! capability: `complete(system_prompt, user_message) -> text`. The
//! categorizer and insight generator are built on top of it; the store and
//! the HTTP layer never see a concrete client.
//!
//! # Architecture
//!
//! - `CompletionBackend` trait: the capability every backend implements
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `OllamaBackend`, `MockBackend`
//! - `complete_with_retry`: per-attempt timeout plus jittered retry on top of any backend
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai, ollama, mock). Default: openai
//! - `OPENAI_API_KEY`: API key for the OpenAI-compatible backend
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4o-mini)
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)

mod mock;
mod ollama;
mod openai_compatible;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::RequestPolicy;
use crate::error::{Error, Result};

/// Trait defining the interface for all completion backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one system prompt and one user message, returning the raw reply text
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI chat completions API (api.openai.com, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `openai` (default): Uses OPENAI_API_KEY, OPENAI_BASE_URL and OPENAI_MODEL
    /// - `ollama`: Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai".to_string());

        match backend.to_lowercase().as_str() {
            "openai" | "openai_compatible" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai");
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Short backend name for status output
    pub fn kind(&self) -> &'static str {
        match self {
            AIClient::OpenAICompatible(_) => "openai",
            AIClient::Ollama(_) => "ollama",
            AIClient::Mock(_) => "mock",
        }
    }
}

// Implement CompletionBackend for AIClient by delegating to the inner backend
#[async_trait]
impl CompletionBackend for AIClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.complete(system_prompt, user_message).await,
            AIClient::Ollama(b) => b.complete(system_prompt, user_message).await,
            AIClient::Mock(b) => b.complete(system_prompt, user_message).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

/// Health check bounded by `timeout`
///
/// A backend that accepts the connection but never answers counts as down.
pub async fn check_health<B>(backend: &B, timeout: Duration) -> bool
where
    B: CompletionBackend + ?Sized,
{
    match tokio::time::timeout(timeout, backend.health_check()).await {
        Ok(healthy) => healthy,
        Err(_) => {
            warn!(
                host = backend.host(),
                timeout_ms = timeout.as_millis() as u64,
                "AI health check timed out"
            );
            false
        }
    }
}

/// Run one completion under `policy`
///
/// Each attempt is bounded by `policy.timeout`. Failed, timed-out, or empty
/// replies are retried up to `policy.max_retries` times with jittered
/// exponential backoff. Returns the trimmed reply, or the last failure.
pub async fn complete_with_retry<B>(
    backend: &B,
    policy: &RequestPolicy,
    system_prompt: &str,
    user_message: &str,
) -> Result<String>
where
    B: CompletionBackend + ?Sized,
{
    let attempts = policy.attempts();
    let mut last_error = Error::Service("no attempts made".into());

    for attempt in 1..=attempts {
        let outcome =
            tokio::time::timeout(policy.timeout, backend.complete(system_prompt, user_message))
                .await;

        match outcome {
            Ok(Ok(text)) => {
                let text = text.trim();
                if !text.is_empty() {
                    debug!(model = backend.model(), attempt, "Completion succeeded");
                    return Ok(text.to_string());
                }
                last_error = Error::Service("empty response".into());
            }
            Ok(Err(e)) => last_error = e,
            Err(_) => {
                last_error = Error::Service(format!("timed out after {:?}", policy.timeout));
            }
        }

        if attempt < attempts {
            let delay = policy.backoff_delay(attempt);
            warn!(
                model = backend.model(),
                attempt,
                error = %last_error,
                delay_ms = delay.as_millis() as u64,
                "Completion attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_error)
}
