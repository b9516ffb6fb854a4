//! Mock backend for testing
//!
//! Returns scripted or keyword-derived replies, can fail on demand, and
//! records every call so tests can assert how often the model was asked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::CompletionBackend;

/// Mock AI backend for testing
///
/// Clones share call history and counters, so a clone handed to a service
/// can be inspected through the original.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Replies keyed by exact user message
    scripted: HashMap<String, String>,
    /// Reply for messages with no scripted entry
    default_response: Option<String>,
    delay: Option<Duration>,
    failures_remaining: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
    history: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// A backend whose every call fails
    pub fn failing() -> Self {
        Self::new().fail_times(usize::MAX)
    }

    /// Reply with `response` to any message without a scripted entry
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = Some(response.into());
        self
    }

    /// Reply with `response` when the user message is exactly `message`
    pub fn respond_to(mut self, message: impl Into<String>, response: impl Into<String>) -> Self {
        self.scripted.insert(message.into(), response.into());
        self
    }

    /// Fail the next `n` calls before answering normally
    pub fn fail_times(self, n: usize) -> Self {
        self.failures_remaining.store(n, Ordering::SeqCst);
        self
    }

    /// Sleep before answering (health checks included)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `complete` calls made so far (failed ones included)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All `(system_prompt, user_message)` pairs received, oldest first
    pub fn requests(&self) -> Vec<(String, String)> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn take_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Keyword guess used when no reply has been scripted
fn keyword_category(message: &str) -> &'static str {
    let m = message.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| m.contains(w));

    if has(&["pizza", "lunch", "dinner", "coffee", "grocer", "restaurant", "food"]) {
        "Food"
    } else if has(&["uber", "taxi", "flight", "train", "bus", "fuel", "hotel"]) {
        "Travel"
    } else if has(&["amazon", "shoes", "clothes", "mall", "shop"]) {
        "Shopping"
    } else if has(&["rent", "electric", "water", "internet", "phone", "bill"]) {
        "Bills"
    } else if has(&["movie", "netflix", "concert", "game", "spotify"]) {
        "Entertainment"
    } else {
        "Other"
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.history.lock() {
            Ok(mut h) => h.push((system_prompt.to_string(), user_message.to_string())),
            Err(poisoned) => poisoned
                .into_inner()
                .push((system_prompt.to_string(), user_message.to_string())),
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.take_failure() {
            return Err(Error::Service("mock backend failure".into()));
        }

        if let Some(reply) = self.scripted.get(user_message) {
            return Ok(reply.clone());
        }
        if let Some(ref reply) = self.default_response {
            return Ok(reply.clone());
        }

        if system_prompt.to_lowercase().contains("categor") {
            Ok(keyword_category(user_message).to_string())
        } else {
            Ok(format!(
                "Mock insight covering {} line(s).",
                user_message.lines().count()
            ))
        }
    }

    async fn health_check(&self) -> bool {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
