//! Expense command implementations

use anyhow::{bail, Result};
use chrono::NaiveDate;
use spendwise_core::{CategoryTotal, ExpenseTracker, NewExpense};

use super::truncate;

/// Resolve the date for a new expense, defaulting to today
pub fn resolve_date(date: Option<&str>) -> Result<String> {
    match date {
        Some(d) => {
            if NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err() {
                bail!("Invalid date '{}'. Use YYYY-MM-DD", d);
            }
            Ok(d.to_string())
        }
        None => Ok(chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()),
    }
}

pub async fn cmd_add(
    tracker: &ExpenseTracker,
    title: &str,
    amount: f64,
    date: Option<&str>,
) -> Result<i64> {
    let date = resolve_date(date)?;
    let id = tracker
        .create(NewExpense::new(title, amount, date))
        .await?;
    let expense = tracker.get(id).await?;

    println!("✅ Expense added [{}]", id);
    println!(
        "   {} │ {:>10.2} │ {:<13} │ {}",
        expense.date,
        expense.amount,
        expense.category,
        truncate(&expense.title, 40)
    );

    Ok(id)
}

pub async fn cmd_list(tracker: &ExpenseTracker, month: Option<&str>, json: bool) -> Result<()> {
    let expenses = tracker.list(month).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
        return Ok(());
    }

    if expenses.is_empty() {
        println!("No expenses found. Add some with:");
        println!("  spendwise add --title \"Pizza\" --amount 15");
        return Ok(());
    }

    println!();
    match month {
        Some(m) => println!("📝 Expenses for {}", m),
        None => println!("📝 Expenses"),
    }
    println!("   ─────────────────────────────────────────────────────────────");

    for e in &expenses {
        println!(
            "   [{:>4}] {} │ {:>10.2} │ {:<13} │ {}",
            e.id,
            e.date,
            e.amount,
            e.category,
            truncate(&e.title, 35)
        );
    }

    println!();
    println!(
        "   {} expense(s), total {:.2}",
        expenses.len(),
        spendwise_core::total_spent(&expenses)
    );

    Ok(())
}

pub async fn cmd_delete(tracker: &ExpenseTracker, ids: &[i64]) -> Result<usize> {
    let deleted = tracker.delete_many(ids).await?;

    println!("🗑️  Deleted {} expense(s)", deleted);
    let skipped = ids.len().saturating_sub(deleted);
    if skipped > 0 {
        println!("   {} ID(s) did not match any expense", skipped);
    }

    Ok(deleted)
}

/// Share of each category in the grand total, as percentages
pub fn category_shares(totals: &[CategoryTotal]) -> Vec<f64> {
    let grand_total: f64 = totals.iter().map(|t| t.total).sum();
    totals
        .iter()
        .map(|t| {
            if grand_total > 0.0 {
                t.total / grand_total * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

pub async fn cmd_summary(tracker: &ExpenseTracker, month: Option<&str>) -> Result<()> {
    let totals = tracker.category_totals(month).await?;

    if totals.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    println!();
    match month {
        Some(m) => println!("📊 Spending by Category ({})", m),
        None => println!("📊 Spending by Category"),
    }
    println!("   ─────────────────────────────────────────────────────────────");

    for (total, share) in totals.iter().zip(category_shares(&totals)) {
        let bar = "█".repeat((share / 5.0).round() as usize);
        println!(
            "   {:<13} {:>10.2} {:>5.1}% ({:>3}) {}",
            total.category, total.total, share, total.count, bar
        );
    }

    Ok(())
}
