//! Expense service
//!
//! Ties the store to the categorizer. Store calls run on the blocking pool
//! so async callers never block the runtime.

use tracing::info;

use crate::categorize::Categorizer;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::import::{parse_expenses, ImportFormat};
use crate::models::{CategoryTotal, Expense, NewExpense};

#[derive(Clone)]
pub struct ExpenseTracker {
    db: Database,
    categorizer: Categorizer,
}

impl ExpenseTracker {
    pub fn new(db: Database, categorizer: Categorizer) -> Self {
        Self { db, categorizer }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    /// Run a store operation on the blocking pool
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(&db)).await?
    }

    /// Validate, categorize and store one expense
    pub async fn create(&self, expense: NewExpense) -> Result<i64> {
        expense.validate()?;

        let category = self.categorizer.categorize(&expense.title).await;
        let id = self
            .blocking(move |db| db.insert_expense(&expense, category))
            .await?;

        info!(id, category = %category, "Expense added");
        Ok(id)
    }

    /// List expenses, optionally for one month (`YYYY-MM` prefix)
    pub async fn list(&self, month: Option<&str>) -> Result<Vec<Expense>> {
        let month = month.map(str::to_string);
        self.blocking(move |db| db.list_expenses(month.as_deref()))
            .await
    }

    /// Fetch one expense by ID
    pub async fn get(&self, id: i64) -> Result<Expense> {
        self.blocking(move |db| db.get_expense(id))
            .await?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))
    }

    /// Delete by ID; unknown IDs are ignored
    pub async fn delete_many(&self, ids: &[i64]) -> Result<usize> {
        let ids = ids.to_vec();
        let deleted = self.blocking(move |db| db.delete_expenses(&ids)).await?;
        info!(deleted, "Expenses deleted");
        Ok(deleted)
    }

    /// Store a batch of expenses atomically
    ///
    /// Every row is validated before anything is categorized; each row is
    /// then categorized once (degrading to `Other` on its own) and the batch
    /// is written in a single transaction.
    pub async fn bulk_create(&self, expenses: Vec<NewExpense>) -> Result<usize> {
        for expense in &expenses {
            expense.validate()?;
        }

        let mut rows = Vec::with_capacity(expenses.len());
        for expense in expenses {
            let category = self.categorizer.categorize(&expense.title).await;
            rows.push((expense, category));
        }

        let count = self.blocking(move |db| db.insert_expenses(&rows)).await?;
        info!(count, "Bulk expenses added");
        Ok(count)
    }

    /// Parse an uploaded file and store its rows
    pub async fn import_file(&self, filename: &str, data: &[u8]) -> Result<usize> {
        let format = ImportFormat::from_filename(filename)?;
        let expenses = parse_expenses(data, format)?;
        info!(file = %filename, rows = expenses.len(), "Importing expenses");
        self.bulk_create(expenses).await
    }

    /// Spending per category, largest first
    pub async fn category_totals(&self, month: Option<&str>) -> Result<Vec<CategoryTotal>> {
        let month = month.map(str::to_string);
        self.blocking(move |db| db.category_totals(month.as_deref()))
            .await
    }
}
