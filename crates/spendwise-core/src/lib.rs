//! Spendwise Core Library
//!
//! Shared functionality for the Spendwise expense tracker:
//! - Expense store (SQLite with connection pooling)
//! - Pluggable completion backends (OpenAI-compatible, Ollama, mock)
//! - Expense categorization with retry and caching
//! - Spending summaries and budget alerts
//! - CSV and spreadsheet import

pub mod ai;
pub mod categorize;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;
pub mod tracker;

/// Test utilities including a mock completion server
#[cfg(test)]
pub(crate) mod test_utils;

pub use ai::{
    check_health, complete_with_retry, AIClient, CompletionBackend, MockBackend, OllamaBackend,
    OpenAICompatibleBackend,
};
pub use categorize::{parse_category_response, Categorizer};
pub use config::{AiSettings, RequestPolicy};
pub use db::Database;
pub use error::{Error, Result};
pub use import::ImportFormat;
pub use insights::{InsightGenerator, NO_EXPENSES_MESSAGE};
pub use models::{total_spent, Category, CategoryTotal, Expense, Insights, NewExpense};
pub use tracker::ExpenseTracker;
