//! Domain models for Tally

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest amount accepted for a single expense
pub const MAX_AMOUNT: f64 = 999_999.0;

/// Description length bounds, in characters
pub const MIN_DESCRIPTION_LEN: usize = 2;
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Expense categories
///
/// The set is closed. Declaration order is the canonical display order and
/// also breaks ties when categories are ranked by amount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Category {
    Food,
    Transportation,
    Entertainment,
    Shopping,
    Bills,
    Healthcare,
    #[default]
    Other,
}

impl Category {
    /// Every category, in canonical order
    pub const ALL: [Category; 7] = [
        Self::Food,
        Self::Transportation,
        Self::Entertainment,
        Self::Shopping,
        Self::Bills,
        Self::Healthcare,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transportation => "Transportation",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Bills => "Bills",
            Self::Healthcare => "Healthcare",
            Self::Other => "Other",
        }
    }

    /// Chart colour for this category
    pub fn color(&self) -> &'static str {
        match self {
            Self::Food => "#10b981",
            Self::Transportation => "#3b82f6",
            Self::Entertainment => "#8b5cf6",
            Self::Shopping => "#f59e0b",
            Self::Bills => "#ef4444",
            Self::Healthcare => "#06b6d4",
            Self::Other => "#6b7280",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "transportation" | "transport" => Ok(Self::Transportation),
            "entertainment" => Ok(Self::Entertainment),
            "shopping" => Ok(Self::Shopping),
            "bills" => Ok(Self::Bills),
            "healthcare" => Ok(Self::Healthcare),
            "other" => Ok(Self::Other),
            _ => Err(format!(
                "Unknown category: {} (valid: Food, Transportation, Entertainment, Shopping, Bills, Healthcare, Other)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded expense
///
/// This is the persisted shape: the storage payload is a JSON array of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Assigned at creation, never changes
    pub id: String,
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Expense as entered by the user, before an id is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: f64,
    #[serde(default)]
    pub category: Category,
    pub description: String,
    pub date: NaiveDate,
}

impl NewExpense {
    /// Check the form rules. `today` bounds the expense date.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        validate_amount(self.amount)?;
        validate_description(&self.description)?;
        validate_date(self.date, today)
    }

    /// Build the stored record, assigning a fresh id and timestamps
    pub fn into_expense(self, now: DateTime<Utc>) -> Expense {
        Expense {
            id: uuid::Uuid::new_v4().to_string(),
            amount: self.amount,
            category: self.category,
            description: self.description.trim().to_string(),
            date: self.date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of an existing expense
///
/// `id` and `created_at` cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl ExpenseUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }

    /// Validate only the fields being set
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        if let Some(date) = self.date {
            validate_date(date, today)?;
        }
        Ok(())
    }

    /// Merge the set fields into `expense`. Timestamps are left to the caller.
    pub fn apply_to(&self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(ref description) = self.description {
            expense.description = description.trim().to_string();
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    // NaN fails the first comparison too
    if !(amount > 0.0) {
        return Err(Error::Validation("Amount must be greater than 0".into()));
    }
    if amount > MAX_AMOUNT {
        return Err(Error::Validation(
            "Amount must be less than $1,000,000".into(),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    let len = description.trim().chars().count();
    if len < MIN_DESCRIPTION_LEN {
        return Err(Error::Validation(format!(
            "Description must be at least {} characters",
            MIN_DESCRIPTION_LEN
        )));
    }
    if len > MAX_DESCRIPTION_LEN {
        return Err(Error::Validation(format!(
            "Description must be less than {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

fn validate_date(date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date > today {
        return Err(Error::Validation("Date cannot be in the future".into()));
    }
    Ok(())
}

/// Parse a user-typed amount such as `"$1,234.50"`
///
/// Everything except digits and `.` is dropped, then the longest numeric
/// prefix is parsed. Input with no number in it yields 0.
pub fn parse_amount(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    // Stop at a second decimal point: "1.2.3" reads as 1.2
    let end = cleaned
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .nth(1)
        .map(|(i, _)| i)
        .unwrap_or(cleaned.len());

    cleaned[..end].parse().unwrap_or(0.0)
}

// ========== Report Models ==========

/// One category's share of total spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: f64,
    pub percentage: f64,
}

/// Dashboard summary, recomputed on demand and never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub total_spending: f64,
    pub monthly_spending: f64,
    /// Every category is present, with 0 when it has no expenses
    pub category_breakdown: BTreeMap<Category, f64>,
    pub top_categories: Vec<CategoryTotal>,
}

/// A single month in a trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub total: f64,
    pub count: usize,
}
