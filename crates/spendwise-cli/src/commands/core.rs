//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `AiContext` - AI backend and settings resolved from the environment
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use spendwise_core::{
    AIClient, AiSettings, Categorizer, CompletionBackend, Database, ExpenseTracker,
    InsightGenerator,
};

/// Open (and migrate) the database
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// AI backend and settings shared by the commands that need them
pub struct AiContext {
    pub ai: Option<AIClient>,
    pub settings: AiSettings,
}

impl AiContext {
    pub fn from_env() -> Result<Self> {
        let settings = AiSettings::load().context("Failed to load AI config")?;
        let ai = AIClient::from_env();

        match ai {
            Some(ref client) => {
                tracing::debug!(backend = client.kind(), model = client.model(), "AI backend configured")
            }
            None => tracing::debug!("AI backend not configured"),
        }

        Ok(Self { ai, settings })
    }

    pub fn tracker(&self, db: Database) -> ExpenseTracker {
        ExpenseTracker::new(db, Categorizer::new(self.ai.clone(), &self.settings))
    }

    pub fn insights(&self) -> InsightGenerator {
        InsightGenerator::new(self.ai.clone(), &self.settings)
    }
}

/// Open the database and wire it to the configured categorizer
pub fn open_tracker(db_path: &Path) -> Result<ExpenseTracker> {
    let ai = AiContext::from_env()?;
    Ok(ai.tracker(open_db(db_path)?))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let count = db.count_expenses()?;
    println!("   {} expense(s) stored", count);

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add an expense: spendwise add --title \"Pizza\" --amount 15");
    println!("  2. Import a file: spendwise import --file expenses.csv");
    println!("  3. Start web API: spendwise serve");

    Ok(())
}
