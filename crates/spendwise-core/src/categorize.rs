//! Expense categorization
//!
//! Maps a free-text title to one of the fixed categories by asking the
//! completion backend. Unparseable replies become `Other`; exhausted retries
//! or a missing backend surface as `CategorizationUnavailable`, which
//! `categorize` swallows so that saving an expense never depends on the model.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::ai::{complete_with_retry, AIClient};
use crate::config::{AiSettings, RequestPolicy};
use crate::error::{Error, Result};
use crate::models::Category;

/// System prompt sent with every categorization request
pub const CATEGORIZE_SYSTEM_PROMPT: &str = "\
You categorize personal expenses.
Allowed categories: Food, Travel, Shopping, Bills, Entertainment, Other.
Rules:
- Reply with exactly one category name
- No explanation
- No punctuation
- If unsure, reply Other";

/// Interpret a model reply as a category
///
/// Takes the first word, strips surrounding punctuation, and matches it
/// case-insensitively. Anything unrecognized is `Other`.
pub fn parse_category_response(raw: &str) -> Category {
    raw.split_whitespace()
        .next()
        .map(|word| word.trim_matches(|c: char| !c.is_alphabetic()))
        .and_then(|word| word.parse().ok())
        .unwrap_or(Category::Other)
}

/// Title to category classifier with a bounded memo cache
#[derive(Clone)]
pub struct Categorizer {
    ai: Option<AIClient>,
    policy: RequestPolicy,
    cache: Arc<RwLock<HashMap<String, Category>>>,
    cache_capacity: usize,
}

impl Categorizer {
    pub fn new(ai: Option<AIClient>, settings: &AiSettings) -> Self {
        Self {
            ai,
            policy: settings.request.clone(),
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_capacity: settings.cache_capacity,
        }
    }

    /// Categorizer with no backend; everything is `Other`
    pub fn disabled() -> Self {
        Self::new(None, &AiSettings::default())
    }

    /// The backend in use, if any
    pub fn backend(&self) -> Option<&AIClient> {
        self.ai.as_ref()
    }

    /// Categorize a title, surfacing backend failure
    pub async fn try_categorize(&self, title: &str) -> Result<Category> {
        let key = title.trim().to_lowercase();

        if let Some(category) = self.cached(&key) {
            debug!(title = %title, category = %category, "Category cache hit");
            return Ok(category);
        }

        let ai = self.ai.as_ref().ok_or_else(|| {
            Error::CategorizationUnavailable("no AI backend configured".into())
        })?;

        let reply = complete_with_retry(ai, &self.policy, CATEGORIZE_SYSTEM_PROMPT, title)
            .await
            .map_err(|e| Error::CategorizationUnavailable(e.to_string()))?;

        let category = parse_category_response(&reply);
        debug!(title = %title, reply = %reply, category = %category, "Categorized expense");

        self.remember(key, category);
        Ok(category)
    }

    /// Categorize a title, falling back to `Other` when the backend is unavailable
    pub async fn categorize(&self, title: &str) -> Category {
        match self.try_categorize(title).await {
            Ok(category) => category,
            Err(e) => {
                warn!(title = %title, error = %e, "Categorization unavailable, using Other");
                Category::Other
            }
        }
    }

    fn cached(&self, key: &str) -> Option<Category> {
        self.cache.read().ok()?.get(key).copied()
    }

    fn remember(&self, key: String, category: Category) {
        if self.cache_capacity == 0 {
            return;
        }
        if let Ok(mut cache) = self.cache.write() {
            // Crude bound: start over once full
            if cache.len() >= self.cache_capacity && !cache.contains_key(&key) {
                cache.clear();
            }
            cache.insert(key, category);
        }
    }
}
