//! Domain models for Spendwise

use serde::{Deserialize, Serialize};

/// Closed set of expense labels assigned by the categorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Bills,
    Entertainment,
    /// Fallback label when the categorizer cannot decide
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Travel => "Travel",
            Self::Shopping => "Shopping",
            Self::Bills => "Bills",
            Self::Entertainment => "Entertainment",
            Self::Other => "Other",
        }
    }

    /// Get all categories
    pub fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Travel,
            Self::Shopping,
            Self::Bills,
            Self::Entertainment,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "travel" => Ok(Self::Travel),
            "shopping" => Ok(Self::Shopping),
            "bills" => Ok(Self::Bills),
            "entertainment" => Ok(Self::Entertainment),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A stored expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub title: String,
    pub amount: f64,
    pub category: Category,
    /// `YYYY-MM-DD`, matched by textual prefix for month filters
    pub date: String,
}

/// Caller-supplied fields of a new expense (category is never supplied)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub date: String,
}

impl NewExpense {
    pub fn new(title: impl Into<String>, amount: f64, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            amount,
            date: date.into(),
        }
    }

    /// Reject amounts that cannot be stored as a spend
    pub fn validate(&self) -> crate::Result<()> {
        if !self.amount.is_finite() {
            return Err(crate::Error::InvalidData(format!(
                "Amount for '{}' is not a number",
                self.title
            )));
        }
        if self.amount < 0.0 {
            return Err(crate::Error::InvalidData(format!(
                "Amount for '{}' must not be negative: {}",
                self.title, self.amount
            )));
        }
        Ok(())
    }
}

/// Spending total for one category (pie chart slice)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    pub count: i64,
}

/// Combined result of the insights operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub summary: String,
    pub budget_alert: String,
}

/// Sum of amounts over a set of expenses
pub fn total_spent(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}
