//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_config, open_repository, today)
//! - `expenses` - Expense commands (add, list, edit, delete, clear, categories)
//! - `export` - CSV/JSON export and listing written exports
//! - `reports` - Summary and trend reports
//! - `serve` - Web server command

pub mod core;
pub mod expenses;
pub mod export;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use core::*;
pub use expenses::*;
pub use export::*;
pub use reports::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
