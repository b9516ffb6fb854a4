//! Insights command implementation

use anyhow::Result;
use spendwise_core::{ExpenseTracker, InsightGenerator};

/// Current month as `YYYY-MM`
pub fn current_month() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

pub async fn cmd_insights(
    tracker: &ExpenseTracker,
    generator: &InsightGenerator,
    budget: f64,
    month: Option<&str>,
) -> Result<()> {
    let month = month.map(str::to_string).unwrap_or_else(current_month);

    println!("🤖 Generating insights for {}...", month);

    let expenses = tracker.list(Some(&month)).await?;
    let insights = generator.generate(&expenses, budget).await?;

    println!();
    println!("💡 Summary");
    println!("   ─────────────────────────────");
    for line in insights.summary.lines() {
        println!("   {}", line);
    }

    println!();
    println!("💰 Budget ({:.2})", budget);
    println!("   ─────────────────────────────");
    for line in insights.budget_alert.lines() {
        println!("   {}", line);
    }

    Ok(())
}
