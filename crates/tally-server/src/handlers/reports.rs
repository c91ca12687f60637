//! Summary and trend handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{today, AppError, AppState};
use tally_core::reports::MAX_TREND_MONTHS;
use tally_core::{category_trend, monthly_trend, summarize, Category, ExpenseSummary, MonthlyTrend};

/// Query parameters for trend reports
#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    /// Number of months ending with the current one
    pub months: Option<usize>,
}

impl TrendQuery {
    fn months(&self, default: usize) -> Result<usize, AppError> {
        match self.months.unwrap_or(default) {
            n @ 1..=MAX_TREND_MONTHS => Ok(n),
            _ => Err(AppError::bad_request(&format!(
                "months must be between 1 and {}",
                MAX_TREND_MONTHS
            ))),
        }
    }
}

/// GET /api/summary - Totals, this month, and category breakdown
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExpenseSummary>, AppError> {
    let repo = state.repo()?;
    Ok(Json(summarize(repo.expenses(), today())))
}

/// GET /api/trends - Spending per month
pub async fn get_trends(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendQuery>,
) -> Result<Json<Vec<MonthlyTrend>>, AppError> {
    let months = params.months(state.config.trend_months)?;
    let repo = state.repo()?;

    Ok(Json(monthly_trend(repo.expenses(), months, today())))
}

/// GET /api/trends/:category - Spending per month for one category
pub async fn get_category_trend(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(params): Query<TrendQuery>,
) -> Result<Json<Vec<MonthlyTrend>>, AppError> {
    let category: Category = category
        .parse()
        .map_err(|e: String| AppError::bad_request(&e))?;
    let months = params.months(state.config.trend_months)?;
    let repo = state.repo()?;

    Ok(Json(category_trend(
        repo.expenses(),
        category,
        months,
        today(),
    )))
}
