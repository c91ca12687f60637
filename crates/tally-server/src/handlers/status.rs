//! Health and reference data handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use tally_core::Category;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub expenses: usize,
    pub storage: String,
}

/// GET /api/health - Liveness and storage info
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let repo = state.repo()?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        expenses: repo.len(),
        storage: repo.store().backend_name().to_string(),
    }))
}

#[derive(Serialize)]
pub struct CategoryInfo {
    pub name: Category,
    pub color: &'static str,
}

/// GET /api/categories - All categories in display order
pub async fn list_categories() -> Json<Vec<CategoryInfo>> {
    Json(
        Category::ALL
            .iter()
            .map(|c| CategoryInfo {
                name: *c,
                color: c.color(),
            })
            .collect(),
    )
}
