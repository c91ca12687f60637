//! Tally Core Library
//!
//! Shared functionality for the Tally expense tracker:
//! - Expense model and form validation
//! - Key-value persistence with pluggable storage backends
//! - Repository owning the session's expense collection
//! - Spending summaries and monthly trends
//! - List filtering
//! - CSV/JSON export with pluggable destinations

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod reports;
pub mod repository;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use export::{
    format_currency, to_csv, to_json, ExportDestination, ExportFormat, LocalExportDestination,
};
pub use filter::{CategoryFilter, ExpenseFilter};
pub use models::{
    parse_amount, Category, CategoryTotal, Expense, ExpenseSummary, ExpenseUpdate, MonthlyTrend,
    NewExpense,
};
pub use reports::{category_trend, monthly_trend, summarize};
pub use repository::ExpenseRepository;
pub use store::{ExpenseStore, FileStorage, MemoryStorage, SaveOutcome, StorageBackend};
