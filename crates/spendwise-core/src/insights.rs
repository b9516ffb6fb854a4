//! Natural-language spending insights
//!
//! Two operations over a set of expenses: a free-form summary, and a budget
//! check that only consults the model when the budget is exceeded.

use tracing::{debug, info};

use crate::ai::{complete_with_retry, AIClient};
use crate::config::{AiSettings, RequestPolicy};
use crate::error::{Error, Result};
use crate::models::{total_spent, Expense, Insights};

/// Returned by `summarize` when there is nothing to summarize
pub const NO_EXPENSES_MESSAGE: &str = "No expenses recorded yet.";

const SUMMARY_SYSTEM_PROMPT: &str = "You analyze a month of personal expenses and give short, \
practical insights: where the money went, unusual items, and one or two suggestions.";

const BUDGET_SYSTEM_PROMPT: &str = "You are a financial advisor. The user is over budget. \
Give a brief warning and concrete suggestions to cut spending.";

/// Render expenses one per line as `title - amount - category`
pub fn format_expense_lines(expenses: &[Expense]) -> String {
    expenses
        .iter()
        .map(|e| format!("{} - {:.2} - {}", e.title, e.amount, e.category))
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_budget(budget: f64) -> Result<()> {
    if !budget.is_finite() || budget < 0.0 {
        return Err(Error::InvalidData(format!(
            "Budget must be a non-negative number, got {}",
            budget
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct InsightGenerator {
    ai: Option<AIClient>,
    policy: RequestPolicy,
    currency_symbol: String,
}

impl InsightGenerator {
    pub fn new(ai: Option<AIClient>, settings: &AiSettings) -> Self {
        Self {
            ai,
            policy: settings.request.clone(),
            currency_symbol: settings.currency_symbol.clone(),
        }
    }

    /// Summarize spending patterns
    pub async fn summarize(&self, expenses: &[Expense]) -> Result<String> {
        if expenses.is_empty() {
            return Ok(NO_EXPENSES_MESSAGE.to_string());
        }

        let lines = format_expense_lines(expenses);
        let summary = self.complete(SUMMARY_SYSTEM_PROMPT, &lines).await?;
        debug!(expenses = expenses.len(), "Generated spending summary");
        Ok(summary)
    }

    /// Compare total spending against `budget`
    ///
    /// Within budget the message is built locally; over budget the model is
    /// asked for a warning and its reply is returned as-is.
    pub async fn budget_alert(&self, expenses: &[Expense], budget: f64) -> Result<String> {
        validate_budget(budget)?;

        let total = total_spent(expenses);
        let symbol = &self.currency_symbol;

        if total <= budget {
            return Ok(format!(
                "✅ You are within budget. Total spent: {}{:.2}",
                symbol, total
            ));
        }

        info!(total, budget, "Spending exceeds budget");
        let message = format!(
            "My monthly budget is {symbol}{budget:.2}. I have spent {symbol}{total:.2}. \
             Give a warning and suggestions."
        );
        self.complete(BUDGET_SYSTEM_PROMPT, &message).await
    }

    /// Run both operations concurrently
    ///
    /// An invalid budget is rejected before any completion call is made.
    pub async fn generate(&self, expenses: &[Expense], budget: f64) -> Result<Insights> {
        validate_budget(budget)?;

        let (summary, budget_alert) =
            tokio::join!(self.summarize(expenses), self.budget_alert(expenses, budget));

        Ok(Insights {
            summary: summary?,
            budget_alert: budget_alert?,
        })
    }

    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let ai = self
            .ai
            .as_ref()
            .ok_or_else(|| Error::InsightUnavailable("no AI backend configured".into()))?;

        complete_with_retry(ai, &self.policy, system_prompt, user_message)
            .await
            .map_err(|e| Error::InsightUnavailable(e.to_string()))
    }
}
