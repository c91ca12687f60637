//! Expense persistence with pluggable storage backends
//!
//! The whole expense collection lives under a single key as a JSON array.
//! Every operation is a whole-collection read-modify-write: there is no
//! delta persistence and no locking, so two writers sharing a backend race
//! and the last write wins.
//!
//! # Architecture
//!
//! - `StorageBackend` trait defines the key-value primitive
//! - `MemoryStorage` keeps values in process memory (optional byte quota)
//! - `FileStorage` keeps one JSON file per key in a data directory
//! - `ExpenseStore` layers the expense collection on top of a backend
//!
//! # Failure policy
//!
//! Reads never fail: a missing or unparseable payload is an empty
//! collection. Writes never abort the caller: a failed write is logged and
//! reported as `SaveOutcome::Failed`.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Expense, ExpenseUpdate};

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Key the expense collection is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "expense-tracker-data";

/// Trait for key-value storage backends
///
/// Implementations handle storing string payloads in different places:
/// - Process memory
/// - Local filesystem
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for this backend
    fn name(&self) -> &str;

    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Deleting an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Result of a write that is not allowed to fail the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The write failed; the message has already been logged
    Failed(String),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// The expense collection stored in a backend under one key
pub struct ExpenseStore {
    backend: Box<dyn StorageBackend>,
    key: String,
}

impl ExpenseStore {
    /// Create a store using the default key
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::from_boxed(Box::new(backend), DEFAULT_STORAGE_KEY)
    }

    /// Create a store from an already boxed backend and a custom key
    pub fn from_boxed(backend: Box<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Create a store backed by process memory (for testing)
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// The key the collection is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name of the underlying backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Read the stored collection
    ///
    /// Absent data and unreadable or unparseable payloads all load as an
    /// empty collection.
    pub fn load(&self) -> Vec<Expense> {
        let payload = match self.backend.get(&self.key) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("No stored expenses under '{}'", self.key);
                return Vec::new();
            }
            Err(e) => {
                warn!("Error reading from {} storage: {}", self.backend.name(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Expense>>(&payload) {
            Ok(expenses) => {
                debug!("Loaded {} expenses from '{}'", expenses.len(), self.key);
                expenses
            }
            Err(e) => {
                warn!("Stored expenses under '{}' are unreadable: {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// Overwrite the stored payload with the full collection
    pub fn save(&self, expenses: &[Expense]) -> SaveOutcome {
        let result = serde_json::to_string(expenses)
            .map_err(Error::from)
            .and_then(|payload| self.backend.set(&self.key, &payload));

        match result {
            Ok(()) => {
                debug!("Saved {} expenses to '{}'", expenses.len(), self.key);
                SaveOutcome::Saved
            }
            Err(e) => {
                warn!("Error saving to {} storage: {}", self.backend.name(), e);
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    /// Append an expense and return the updated collection
    pub fn add(&self, expense: Expense) -> Vec<Expense> {
        let mut expenses = self.load();
        expenses.push(expense);
        self.save(&expenses);
        expenses
    }

    /// Merge `update` into the expense with `id` and return the updated
    /// collection
    ///
    /// Fails with `Error::NotFound` without writing anything when no expense
    /// has that id.
    pub fn update(&self, id: &str, update: &ExpenseUpdate) -> Result<Vec<Expense>> {
        let mut expenses = self.load();
        apply_update(&mut expenses, id, update)?;
        self.save(&expenses);
        Ok(expenses)
    }

    /// Remove the expense with `id` and return the updated collection
    ///
    /// An unknown id leaves the collection as it was.
    pub fn remove(&self, id: &str) -> Vec<Expense> {
        let mut expenses = self.load();
        remove_by_id(&mut expenses, id);
        self.save(&expenses);
        expenses
    }

    /// Delete the stored payload entirely
    pub fn clear(&self) -> SaveOutcome {
        match self.backend.remove(&self.key) {
            Ok(()) => SaveOutcome::Saved,
            Err(e) => {
                warn!("Error clearing {} storage: {}", self.backend.name(), e);
                SaveOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Merge `update` into the matching expense and refresh its `updated_at`
pub(crate) fn apply_update(
    expenses: &mut [Expense],
    id: &str,
    update: &ExpenseUpdate,
) -> Result<()> {
    let expense = expenses
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| Error::NotFound(format!("Expense {} not found", id)))?;

    update.apply_to(expense);
    expense.updated_at = next_timestamp(expense.updated_at);
    Ok(())
}

/// Drop the expense with `id`, returning whether anything was removed
pub(crate) fn remove_by_id(expenses: &mut Vec<Expense>, id: &str) -> bool {
    let before = expenses.len();
    expenses.retain(|e| e.id != id);
    expenses.len() != before
}

/// Current time, nudged past `previous` so `updated_at` always advances
/// even on a coarse clock
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
