//! Spendwise CLI - Expense tracker with AI categorization
//!
//! Usage:
//!   spendwise init                              Initialize database
//!   spendwise add --title Pizza --amount 15     Add an expense
//!   spendwise import --file march.csv           Import expenses from CSV/Excel
//!   spendwise insights --budget 20000           Summary and budget alert
//!   spendwise serve --port 8000                 Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Add {
            title,
            amount,
            date,
        } => {
            let tracker = commands::open_tracker(&cli.db)?;
            commands::cmd_add(&tracker, &title, amount, date.as_deref())
                .await
                .map(|_| ())
        }
        Commands::List { month, json } => {
            let tracker = commands::open_tracker(&cli.db)?;
            commands::cmd_list(&tracker, month.as_deref(), json).await
        }
        Commands::Delete { ids } => {
            let tracker = commands::open_tracker(&cli.db)?;
            commands::cmd_delete(&tracker, &ids).await.map(|_| ())
        }
        Commands::Import { file } => {
            let tracker = commands::open_tracker(&cli.db)?;
            commands::cmd_import(&tracker, &file).await.map(|_| ())
        }
        Commands::Summary { month } => {
            let tracker = commands::open_tracker(&cli.db)?;
            commands::cmd_summary(&tracker, month.as_deref()).await
        }
        Commands::Insights { budget, month } => {
            let ai = commands::AiContext::from_env()?;
            let tracker = ai.tracker(commands::open_db(&cli.db)?);
            commands::cmd_insights(&tracker, &ai.insights(), budget, month.as_deref()).await
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.db, &host, port, static_dir.as_deref()).await,
    }
}
