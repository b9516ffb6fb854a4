//! Error types for Spendwise

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Config error: {0}")]
    Config(String),

    /// The completion service could not label an expense.
    /// The categorizer degrades this to `Category::Other`.
    #[error("Categorization unavailable: {0}")]
    CategorizationUnavailable(String),

    /// The completion service could not produce an insight.
    #[error("Insight unavailable: {0}")]
    InsightUnavailable(String),

    #[error("Invalid import schema: {0}")]
    InvalidImportSchema(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Raw failure talking to a completion backend (status, timeout, empty body)
    #[error("Completion service error: {0}")]
    Service(String),
}

pub type Result<T> = std::result::Result<T, Error>;
