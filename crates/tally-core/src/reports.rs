//! Spending summaries and trends
//!
//! Everything here is a pure function of the expense slice and a reference
//! date, so callers decide what "today" means.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{Category, CategoryTotal, Expense, ExpenseSummary, MonthlyTrend};

/// How many categories the summary ranks
pub const TOP_CATEGORY_LIMIT: usize = 5;

/// Default number of months in a trend series
pub const DEFAULT_TREND_MONTHS: usize = 6;

/// Largest trend window the CLI and API will compute
pub const MAX_TREND_MONTHS: usize = 120;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Compute the dashboard summary
///
/// `monthly_spending` covers the calendar month containing `today`.
/// `top_categories` ranks categories with non-zero spending, largest first.
pub fn summarize(expenses: &[Expense], today: NaiveDate) -> ExpenseSummary {
    let total_spending: f64 = expenses.iter().map(|e| e.amount).sum();

    let current = YearMonth::of(today);
    let monthly_spending: f64 = expenses
        .iter()
        .filter(|e| YearMonth::of(e.date) == current)
        .map(|e| e.amount)
        .sum();

    let mut category_breakdown: BTreeMap<Category, f64> =
        Category::ALL.iter().map(|c| (*c, 0.0)).collect();
    for expense in expenses {
        *category_breakdown.entry(expense.category).or_insert(0.0) += expense.amount;
    }

    let mut top_categories: Vec<CategoryTotal> = category_breakdown
        .iter()
        .filter(|(_, amount)| **amount > 0.0)
        .map(|(category, amount)| CategoryTotal {
            category: *category,
            amount: *amount,
            percentage: percentage_of(*amount, total_spending),
        })
        .collect();
    // Stable sort: equal amounts keep canonical category order
    top_categories.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    top_categories.truncate(TOP_CATEGORY_LIMIT);

    ExpenseSummary {
        total_spending,
        monthly_spending,
        category_breakdown,
        top_categories,
    }
}

/// Spending per month for the `month_count` months ending with the month
/// containing `today`, oldest first
///
/// Months without expenses are included with zero totals, so the result
/// always has exactly `month_count` entries. Labels look like `"Jan 2024"`.
pub fn monthly_trend(expenses: &[Expense], month_count: usize, today: NaiveDate) -> Vec<MonthlyTrend> {
    bucket_by_month(expenses.iter(), month_count, today, |ym| ym.long_label())
}

/// Like [`monthly_trend`] but restricted to one category, with short
/// month-only labels (`"Jan"`)
pub fn category_trend(
    expenses: &[Expense],
    category: Category,
    month_count: usize,
    today: NaiveDate,
) -> Vec<MonthlyTrend> {
    bucket_by_month(
        expenses.iter().filter(|e| e.category == category),
        month_count,
        today,
        |ym| ym.short_label().to_string(),
    )
}

fn bucket_by_month<'a>(
    expenses: impl Iterator<Item = &'a Expense>,
    month_count: usize,
    today: NaiveDate,
    label: impl Fn(YearMonth) -> String,
) -> Vec<MonthlyTrend> {
    let current = YearMonth::of(today);
    let months: Vec<YearMonth> = (0..month_count)
        .rev()
        .map(|back| current.minus(back))
        .collect();

    let mut trend: Vec<MonthlyTrend> = months
        .iter()
        .map(|ym| MonthlyTrend {
            month: label(*ym),
            total: 0.0,
            count: 0,
        })
        .collect();

    for expense in expenses {
        let ym = YearMonth::of(expense.date);
        if let Some(index) = months.iter().position(|m| *m == ym) {
            trend[index].total += expense.amount;
            trend[index].count += 1;
        }
    }

    trend
}

fn percentage_of(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        (amount / total) * 100.0
    } else {
        0.0
    }
}

/// Calendar month, without a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct YearMonth {
    year: i32,
    /// 1-based
    month: u32,
}

impl YearMonth {
    fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month `back` months before this one
    fn minus(self, back: usize) -> Self {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) - back as i64;
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    fn short_label(self) -> &'static str {
        MONTH_ABBREVIATIONS[(self.month - 1) as usize]
    }

    fn long_label(self) -> String {
        format!("{} {}", self.short_label(), self.year)
    }
}
