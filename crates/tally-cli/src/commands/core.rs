//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Environment configuration with CLI overrides applied
//! - `open_repository` - Open the file-backed expense repository
//! - `today` - Local calendar date used by reports and validation

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tally_core::{Config, ExpenseRepository};

/// Build the configuration: defaults, then TALLY_* env vars, then flags
pub fn load_config(data_dir: Option<&Path>, key: Option<&str>) -> Config {
    let mut config = Config::from_env();
    if let Some(dir) = data_dir {
        config.data_dir = dir.to_path_buf();
    }
    if let Some(key) = key {
        config.storage_key = key.to_string();
    }
    config
}

/// Open the repository the configuration points at
pub fn open_repository(config: &Config) -> Result<ExpenseRepository> {
    config.open_repository().with_context(|| {
        format!(
            "Failed to open expense storage in {}",
            config.data_dir.display()
        )
    })
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
