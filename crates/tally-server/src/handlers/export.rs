//! Export handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Response, StatusCode},
};
use serde::Deserialize;
use tracing::info;

use super::expenses::ExpenseQuery;
use crate::{AppError, AppState};
use tally_core::{export::render, ExportFormat};

/// Query parameters for export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Output format (default: csv)
    #[serde(default = "default_format")]
    pub format: String,
    /// Same filters as the expense list
    #[serde(flatten)]
    pub filter: ExpenseQuery,
}

fn default_format() -> String {
    "csv".to_string()
}

/// GET /api/export - Download expenses as CSV or JSON
pub async fn export_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportQuery>,
) -> Result<Response<Body>, AppError> {
    let format: ExportFormat = params
        .format
        .parse()
        .map_err(|_| AppError::bad_request("Invalid format. Use 'csv' or 'json'"))?;
    let filter = params.filter.to_filter()?;

    let expenses = {
        let repo = state.repo()?;
        filter.apply(repo.expenses())
    };

    let body = render(&expenses, format).map_err(AppError::from_core)?;
    info!("Exported {} expenses to {}", expenses.len(), format);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.mime_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", format.default_file_name()),
        )
        .body(Body::from(body))
        .map_err(|e| AppError::internal(&e.to_string()))
}
