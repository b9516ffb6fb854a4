//! Expense operations

use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::Result;
use crate::models::{Category, CategoryTotal, Expense, NewExpense};

/// Month filter clause: pure textual prefix comparison, `NULL` matches everything.
/// `substr` keeps `%` and `_` in the prefix literal (unlike `LIKE`).
const MONTH_FILTER: &str = "(?1 IS NULL OR substr(date, 1, length(?1)) = ?1)";

fn row_to_expense(row: &Row) -> rusqlite::Result<Expense> {
    let category: String = row.get(3)?;
    Ok(Expense {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        // Rows written outside the categorizer may hold stray labels
        category: category.parse().unwrap_or_default(),
        date: row.get(4)?,
    })
}

impl Database {
    /// Insert one categorized expense, returning its new ID
    pub fn insert_expense(&self, expense: &NewExpense, category: Category) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO expenses (title, amount, category, date) VALUES (?, ?, ?, ?)",
            params![
                expense.title,
                expense.amount,
                category.as_str(),
                expense.date
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Insert a batch of categorized expenses in a single transaction
    ///
    /// Either every row is committed or none is.
    pub fn insert_expenses(&self, rows: &[(NewExpense, Category)]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO expenses (title, amount, category, date) VALUES (?, ?, ?, ?)",
            )?;
            for (expense, category) in rows {
                stmt.execute(params![
                    expense.title,
                    expense.amount,
                    category.as_str(),
                    expense.date
                ])?;
            }
        }

        tx.commit()?;
        Ok(rows.len())
    }

    /// List expenses, optionally restricted to dates starting with `month`
    pub fn list_expenses(&self, month: Option<&str>) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT id, title, amount, category, date FROM expenses WHERE {} ORDER BY id",
            MONTH_FILTER
        ))?;

        let expenses = stmt
            .query_map(params![month], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Get a single expense by ID
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;

        let expense = conn
            .query_row(
                "SELECT id, title, amount, category, date FROM expenses WHERE id = ?",
                params![id],
                row_to_expense,
            )
            .optional()?;

        Ok(expense)
    }

    /// Delete expenses by ID, returning how many rows were removed
    ///
    /// IDs that do not exist are ignored.
    pub fn delete_expenses(&self, ids: &[i64]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut deleted = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM expenses WHERE id = ?")?;
            for id in ids {
                deleted += stmt.execute(params![id])?;
            }
        }

        tx.commit()?;
        Ok(deleted)
    }

    /// Count all stored expenses
    pub fn count_expenses(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Spending per category, largest total first
    pub fn category_totals(&self, month: Option<&str>) -> Result<Vec<CategoryTotal>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT category, SUM(amount), COUNT(*)
            FROM expenses
            WHERE {}
            GROUP BY category
            ORDER BY SUM(amount) DESC, category
            "#,
            MONTH_FILTER
        ))?;

        let totals = stmt
            .query_map(params![month], |row| {
                let category: String = row.get(0)?;
                Ok(CategoryTotal {
                    category: category.parse().unwrap_or_default(),
                    total: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }
}
