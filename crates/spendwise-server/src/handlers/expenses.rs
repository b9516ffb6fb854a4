//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Multipart, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use spendwise_core::{CategoryTotal, Expense, NewExpense};

/// Optional month filter (`YYYY-MM`, matched as a date prefix)
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

/// Request body for deleting expenses
#[derive(Debug, Deserialize)]
pub struct DeleteExpensesRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateExpenseResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteExpensesResponse {
    pub message: String,
    pub deleted: usize,
}

/// POST /expenses - Add one expense
///
/// The category is assigned before responding; a failed model call stores
/// the expense as Other.
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewExpense>, JsonRejection>,
) -> Result<Json<CreateExpenseResponse>, AppError> {
    let Json(expense) = body.map_err(|e| AppError::bad_request(&e.body_text()))?;

    let id = state.tracker.create(expense).await?;

    Ok(Json(CreateExpenseResponse {
        message: "Expense added".to_string(),
        id,
    }))
}

/// POST /expenses/upload - Bulk add from a CSV or Excel file (multipart field `file`)
pub async fn upload_expenses(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::bad_request("Uploaded file has no name"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        // Check file size limit
        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        upload = Some((filename, bytes.to_vec()));
    }

    let (filename, data) = upload.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let count = state.tracker.import_file(&filename, &data).await?;

    Ok(Json(UploadResponse {
        message: format!("{} expenses uploaded successfully", count),
        count,
    }))
}

/// GET /expenses - List expenses, optionally for one month
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let Query(params) = query.map_err(|e| AppError::bad_request(&e.body_text()))?;
    let expenses = state.tracker.list(params.month.as_deref()).await?;
    Ok(Json(expenses))
}

/// DELETE /expenses - Delete expenses by ID (unknown IDs are ignored)
pub async fn delete_expenses(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DeleteExpensesRequest>, JsonRejection>,
) -> Result<Json<DeleteExpensesResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::bad_request(&e.body_text()))?;

    let deleted = state.tracker.delete_many(&request.ids).await?;

    Ok(Json(DeleteExpensesResponse {
        message: "Expenses deleted".to_string(),
        deleted,
    }))
}

/// GET /expenses/summary - Spending per category for the dashboard pie chart
pub async fn expense_summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Vec<CategoryTotal>>, AppError> {
    let Query(params) = query.map_err(|e| AppError::bad_request(&e.body_text()))?;
    let totals = state.tracker.category_totals(params.month.as_deref()).await?;
    Ok(Json(totals))
}
