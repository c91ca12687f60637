//! Runtime configuration
//!
//! Settings come from defaults, then `TALLY_*` environment variables. The
//! CLI layers its own flags on top.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::reports::{DEFAULT_TREND_MONTHS, MAX_TREND_MONTHS};
use crate::repository::ExpenseRepository;
use crate::store::{ExpenseStore, FileStorage, DEFAULT_STORAGE_KEY};

pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";
pub const STORAGE_KEY_ENV: &str = "TALLY_STORAGE_KEY";
pub const TREND_MONTHS_ENV: &str = "TALLY_TREND_MONTHS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the storage files
    pub data_dir: PathBuf,
    /// Key the expense collection is stored under
    pub storage_key: String,
    /// Months covered by trend reports
    pub trend_months: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            trend_months: DEFAULT_TREND_MONTHS,
        }
    }
}

impl Config {
    /// Defaults overridden by `TALLY_DATA_DIR`, `TALLY_STORAGE_KEY` and
    /// `TALLY_TREND_MONTHS`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(dir) = set(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = set(STORAGE_KEY_ENV) {
            config.storage_key = key.trim().to_string();
        }
        if let Some(months) = set(TREND_MONTHS_ENV) {
            match months.trim().parse::<usize>() {
                Ok(n) if (1..=MAX_TREND_MONTHS).contains(&n) => config.trend_months = n,
                _ => tracing::warn!(
                    value = %months,
                    "Ignoring invalid {}, using {}",
                    TREND_MONTHS_ENV,
                    config.trend_months
                ),
            }
        }

        config
    }

    /// Open the file-backed repository this configuration points at
    pub fn open_repository(&self) -> Result<ExpenseRepository> {
        let backend = FileStorage::new(&self.data_dir)?;
        let store = ExpenseStore::from_boxed(Box::new(backend), &self.storage_key);
        Ok(ExpenseRepository::open(store))
    }
}

/// Platform data directory for Tally, falling back to the working directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tally")
}
