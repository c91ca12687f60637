//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod expenses;
pub mod export;
pub mod reports;
pub mod status;

// Re-export all handlers for use in router
pub use expenses::*;
pub use export::*;
pub use reports::*;
pub use status::*;
