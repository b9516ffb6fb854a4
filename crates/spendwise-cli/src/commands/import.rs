//! Import command implementation

use std::path::Path;

use anyhow::{Context, Result};
use spendwise_core::ExpenseTracker;

pub async fn cmd_import(tracker: &ExpenseTracker, file: &Path) -> Result<usize> {
    println!("📥 Importing {}...", file.display());

    let data = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("File name must be valid UTF-8")?;

    let count = tracker.import_file(filename, &data).await?;

    println!("✅ {} expenses uploaded successfully", count);

    Ok(count)
}
