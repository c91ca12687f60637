//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{AppError, AppState, SuccessResponse};
use tally_core::{
    CategoryFilter, Expense, ExpenseFilter, ExpenseRepository, ExpenseUpdate, NewExpense,
    SaveOutcome,
};

/// Query parameters for listing expenses
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    /// Search text (case-insensitive, matches description)
    pub search: Option<String>,
    /// Category name, or "all"
    pub category: Option<String>,
    /// Start date (YYYY-MM-DD), inclusive
    pub from: Option<String>,
    /// End date (YYYY-MM-DD), inclusive
    pub to: Option<String>,
}

impl ExpenseQuery {
    /// Validate the raw parameters into a filter
    pub fn to_filter(&self) -> Result<ExpenseFilter, AppError> {
        let category = match self.category.as_deref() {
            Some(c) => c
                .parse::<CategoryFilter>()
                .map_err(|e| AppError::bad_request(&e))?,
            None => CategoryFilter::All,
        };

        Ok(ExpenseFilter::new()
            .search(self.search.as_deref())
            .category(category)
            .start_date(parse_date(self.from.as_deref(), "from")?)
            .end_date(parse_date(self.to.as_deref(), "to")?))
    }
}

fn parse_date(value: Option<&str>, name: &str) -> Result<Option<NaiveDate>, AppError> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d"))
        .transpose()
        .map_err(|_| {
            AppError::bad_request(&format!("Invalid '{}' date format (use YYYY-MM-DD)", name))
        })
}

/// Log a write that failed after the in-memory change was applied
fn note_save_outcome(repo: &ExpenseRepository, action: &str) {
    if let SaveOutcome::Failed(reason) = repo.last_save() {
        warn!("{} kept in memory but not persisted: {}", action, reason);
    }
}

/// GET /api/expenses - List expenses, most recent first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseQuery>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let filter = params.to_filter()?;
    let repo = state.repo()?;

    Ok(Json(filter.apply(repo.expenses())))
}

/// POST /api/expenses - Record a new expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let mut repo = state.repo()?;

    let created = repo
        .add(body)
        .map_err(AppError::from_core)?
        .last()
        .cloned()
        .ok_or_else(|| AppError::internal("Expense was not recorded"))?;

    info!("Created expense {} via API", created.id);
    note_save_outcome(&repo, "New expense");

    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/expenses - Delete every expense
pub async fn clear_expenses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, AppError> {
    let mut repo = state.repo()?;

    repo.clear();
    note_save_outcome(&repo, "Clear");

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/expenses/:id - Get a single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Expense>, AppError> {
    let repo = state.repo()?;

    repo.get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(&format!("Expense {} not found", id)))
}

/// PUT /api/expenses/:id - Change fields of an expense
///
/// An empty body only refreshes `updatedAt`.
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ExpenseUpdate>,
) -> Result<Json<Expense>, AppError> {
    let mut repo = state.repo()?;
    repo.update(&id, &body).map_err(AppError::from_core)?;
    note_save_outcome(&repo, "Update");

    repo.get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(&format!("Expense {} not found", id)))
}

/// DELETE /api/expenses/:id - Delete an expense
///
/// An unknown id is a no-op and still succeeds.
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let mut repo = state.repo()?;

    repo.remove(&id);
    note_save_outcome(&repo, "Delete");

    Ok(Json(SuccessResponse { success: true }))
}
