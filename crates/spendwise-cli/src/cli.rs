//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendwise - Track expenses with AI categorization and insights
#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "Self-hosted expense tracker with AI categorization", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "spendwise.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Add an expense (category is assigned automatically)
    Add {
        /// What the money was spent on
        #[arg(short, long)]
        title: String,

        /// Amount spent
        #[arg(short, long)]
        amount: f64,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List expenses
    List {
        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Delete expenses by ID
    Delete {
        /// Expense IDs
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Import expenses from a CSV or Excel file
    Import {
        /// File with title, amount and date columns
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show spending per category
    Summary {
        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Generate a spending summary and budget alert
    Insights {
        /// Monthly budget
        #[arg(short, long)]
        budget: f64,

        /// Month to analyze (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory of dashboard files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}
