//! Session-scoped expense repository
//!
//! The repository owns the expense collection in memory and writes it
//! through an injected `ExpenseStore` after every change. The in-memory copy
//! is authoritative for the session: if a write fails the change is kept,
//! the failure is logged, and `last_save()` reports it.

use chrono::{Local, NaiveDate, Utc};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Expense, ExpenseUpdate, NewExpense};
use crate::store::{apply_update, remove_by_id, ExpenseStore, SaveOutcome};

pub struct ExpenseRepository {
    store: ExpenseStore,
    expenses: Vec<Expense>,
    last_save: SaveOutcome,
}

impl ExpenseRepository {
    /// Open a repository, loading whatever the store currently holds
    pub fn open(store: ExpenseStore) -> Self {
        let expenses = store.load();
        info!(
            "Opened {} storage with {} expenses",
            store.backend_name(),
            expenses.len()
        );
        Self {
            store,
            expenses,
            last_save: SaveOutcome::Saved,
        }
    }

    /// Open a repository over process memory (for testing)
    pub fn in_memory() -> Self {
        Self::open(ExpenseStore::in_memory())
    }

    pub fn store(&self) -> &ExpenseStore {
        &self.store
    }

    /// The current collection, in insertion order
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// Outcome of the most recent write
    pub fn last_save(&self) -> &SaveOutcome {
        &self.last_save
    }

    /// Validate and record a new expense, returning the updated collection
    pub fn add(&mut self, new: NewExpense) -> Result<&[Expense]> {
        new.validate(today())?;
        let expense = new.into_expense(Utc::now());
        self.insert(expense)
    }

    /// Record a fully built expense
    ///
    /// The id must not already be in use.
    pub fn insert(&mut self, expense: Expense) -> Result<&[Expense]> {
        if self.get(&expense.id).is_some() {
            return Err(Error::InvalidData(format!(
                "Expense {} already exists",
                expense.id
            )));
        }

        info!(
            "Adding expense {} ({} {:.2})",
            expense.id, expense.category, expense.amount
        );
        self.expenses.push(expense);
        self.persist();
        Ok(&self.expenses)
    }

    /// Apply a partial update, returning the updated collection
    ///
    /// Fails with `Error::NotFound` when `id` is unknown, before any field is
    /// validated; nothing is written in that case.
    pub fn update(&mut self, id: &str, update: &ExpenseUpdate) -> Result<&[Expense]> {
        if self.get(id).is_none() {
            return Err(Error::NotFound(format!("Expense {} not found", id)));
        }
        update.validate(today())?;
        apply_update(&mut self.expenses, id, update)?;
        info!("Updated expense {}", id);
        self.persist();
        Ok(&self.expenses)
    }

    /// Delete an expense, returning the updated collection
    ///
    /// Deleting an unknown id is a no-op, but the collection is still
    /// rewritten like any other mutation.
    pub fn remove(&mut self, id: &str) -> &[Expense] {
        if remove_by_id(&mut self.expenses, id) {
            info!("Deleted expense {}", id);
        }
        self.persist();
        &self.expenses
    }

    /// Drop every expense and delete the stored payload
    pub fn clear(&mut self) {
        info!("Clearing {} expenses", self.expenses.len());
        self.expenses.clear();
        self.last_save = self.store.clear();
    }

    /// Discard the in-memory collection and load the stored one again
    pub fn reload(&mut self) -> &[Expense] {
        self.expenses = self.store.load();
        &self.expenses
    }

    fn persist(&mut self) {
        self.last_save = self.store.save(&self.expenses);
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
