//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, AI setup)
//! - `expenses` - Add, list, delete, and category summary
//! - `import` - CSV/Excel import
//! - `insights` - Spending summary and budget alert
//! - `serve` - Web server command

pub mod core;
pub mod expenses;
pub mod import;
pub mod insights;
pub mod serve;

// Re-export command functions for main.rs
pub use core::*;
pub use expenses::*;
pub use import::*;
pub use insights::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
