//! Insight handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use spendwise_core::Insights;

/// Query parameters for insights
#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    /// Monthly budget to compare against
    pub budget: f64,
    /// Month to analyze (`YYYY-MM`)
    pub month: String,
}

/// GET /insights - Spending summary and budget alert for one month
///
/// Both texts are generated concurrently; if either cannot be produced the
/// request fails with 502.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    query: Result<Query<InsightsQuery>, QueryRejection>,
) -> Result<Json<Insights>, AppError> {
    let Query(params) = query.map_err(|e| AppError::bad_request(&e.body_text()))?;

    let expenses = state.tracker.list(Some(params.month.as_str())).await?;
    let insights = state.insights.generate(&expenses, params.budget).await?;

    Ok(Json(insights))
}
