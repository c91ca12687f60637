//! Tally Web Server
//!
//! Axum-based REST API for the Tally expense tracker.
//!
//! One `ExpenseRepository` is shared by all requests behind a mutex; each
//! request runs its repository operation to completion under the lock.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Security headers on every response
//! - Sanitized error responses

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info};

use tally_core::reports::DEFAULT_TREND_MONTHS;
use tally_core::ExpenseRepository;

mod handlers;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Trend window used when a request doesn't specify `months`
    pub trend_months: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            trend_months: DEFAULT_TREND_MONTHS,
        }
    }
}

/// Shared application state
pub struct AppState {
    repo: Mutex<ExpenseRepository>,
    pub config: ServerConfig,
}

impl AppState {
    /// Lock the repository for the duration of one request
    pub fn repo(&self) -> Result<MutexGuard<'_, ExpenseRepository>, AppError> {
        self.repo.lock().map_err(|_| {
            error!("Expense repository lock poisoned");
            AppError::internal("An internal error occurred")
        })
    }
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Local calendar date used for validation and reports
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Create the application router
pub fn create_router(
    repo: ExpenseRepository,
    static_dir: Option<&Path>,
    config: ServerConfig,
) -> Router {
    // Build CORS layer before config moves into state
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    let state = Arc::new(AppState {
        repo: Mutex::new(repo),
        config,
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/categories", get(handlers::list_categories))
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses)
                .post(handlers::create_expense)
                .delete(handlers::clear_expenses),
        )
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        // Reports
        .route("/summary", get(handlers::get_summary))
        .route("/trends", get(handlers::get_trends))
        .route("/trends/:category", get(handlers::get_category_trend))
        // Export
        .route("/export", get(handlers::export_expenses));

    // CSP: same-origin only, inline styles allowed for the bundled UI
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    repo: ExpenseRepository,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> anyhow::Result<()> {
    serve_with_config(repo, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    repo: ExpenseRepository,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        "Serving {} expenses from {} storage (key '{}')",
        repo.len(),
        repo.store().backend_name(),
        repo.store().key()
    );

    let app = create_router(repo, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error to its HTTP status
    ///
    /// Validation and lookup failures carry their message to the client;
    /// anything else becomes a generic 500.
    pub fn from_core(err: tally_core::Error) -> Self {
        use tally_core::Error;

        match err {
            Error::NotFound(msg) => Self::not_found(&msg),
            Error::Validation(msg) | Error::InvalidData(msg) => Self::bad_request(&msg),
            other => Self::from(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
