//! Expense command implementations

use anyhow::{bail, Result};
use chrono::NaiveDate;
use tally_core::{
    format_currency, parse_amount, Category, ExpenseFilter, ExpenseRepository, ExpenseUpdate,
    NewExpense, SaveOutcome,
};

use super::{today, truncate};

pub fn cmd_add(
    repo: &mut ExpenseRepository,
    amount: &str,
    description: &str,
    category: Category,
    date: Option<NaiveDate>,
) -> Result<()> {
    let new = NewExpense {
        amount: parse_amount(amount),
        category,
        description: description.to_string(),
        date: date.unwrap_or_else(today),
    };

    let expenses = repo.add(new)?;
    let added = &expenses[expenses.len() - 1];

    println!(
        "✅ Added {} {} for {} on {}",
        format_currency(added.amount),
        added.category,
        added.description,
        added.date
    );
    println!("   ID: {}", added.id);
    warn_if_unsaved(repo);

    Ok(())
}

pub fn cmd_list(
    repo: &ExpenseRepository,
    filter: &ExpenseFilter,
    limit: usize,
    json: bool,
) -> Result<()> {
    let matched = filter.apply(repo.expenses());

    if json {
        let shown: Vec<_> = matched.iter().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if matched.is_empty() {
        if repo.is_empty() {
            println!("No expenses yet. Record one with:");
            println!("  tally add --amount 12.50 --description \"Lunch\" --category Food");
        } else {
            println!("No expenses match the current filters.");
        }
        return Ok(());
    }

    println!();
    println!("📝 Expenses");
    println!("   ─────────────────────────────────────────────────────────────");

    for expense in matched.iter().take(limit) {
        println!(
            "   {} │ {:>12} │ {:<14} │ {}",
            expense.date,
            format_currency(expense.amount),
            expense.category,
            truncate(&expense.description, 36)
        );
    }

    let total: f64 = matched.iter().map(|e| e.amount).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    if matched.len() > limit {
        println!(
            "   Showing {} of {} matching expenses (total {})",
            limit,
            matched.len(),
            format_currency(total)
        );
    } else {
        println!(
            "   {} expenses, total {}",
            matched.len(),
            format_currency(total)
        );
    }
    if filter.is_active() {
        println!("   {} filter(s) active", filter.active_count());
    }

    Ok(())
}

/// Collect edit flags into a partial update
pub fn build_update(
    amount: Option<&str>,
    description: Option<&str>,
    category: Option<Category>,
    date: Option<NaiveDate>,
) -> ExpenseUpdate {
    ExpenseUpdate {
        amount: amount.map(parse_amount),
        category,
        description: description.map(str::to_string),
        date,
    }
}

pub fn cmd_edit(repo: &mut ExpenseRepository, id: &str, update: &ExpenseUpdate) -> Result<()> {
    if repo.get(id).is_none() {
        bail!("Expense {} not found", id);
    }
    if update.is_empty() {
        bail!("Nothing to change. Pass at least one of --amount, --description, --category, --date");
    }

    repo.update(id, update)?;

    if let Some(expense) = repo.get(id) {
        println!(
            "✏️  Updated {}: {} {} for {} on {}",
            expense.id,
            format_currency(expense.amount),
            expense.category,
            expense.description,
            expense.date
        );
    }
    warn_if_unsaved(repo);

    Ok(())
}

/// Delete an expense; an unknown id leaves the collection as it was
pub fn cmd_delete(repo: &mut ExpenseRepository, id: &str) -> Result<()> {
    let existing = repo.get(id).cloned();
    repo.remove(id);

    match existing {
        Some(expense) => println!(
            "🗑️  Deleted {} {} ({})",
            format_currency(expense.amount),
            expense.description,
            expense.date
        ),
        None => println!("Nothing to delete: no expense {}", id),
    }
    warn_if_unsaved(repo);

    Ok(())
}

pub fn cmd_clear(repo: &mut ExpenseRepository, yes: bool) -> Result<()> {
    let count = repo.len();

    if !yes {
        bail!(
            "This deletes all {} stored expenses. Re-run with --yes to confirm.",
            count
        );
    }

    repo.clear();

    println!("🗑️  Cleared {} expenses", count);
    warn_if_unsaved(repo);

    Ok(())
}

pub fn cmd_categories() -> Result<()> {
    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────");

    for category in Category::ALL {
        println!("   {:<14} {}", category.as_str(), category.color());
    }

    Ok(())
}

fn warn_if_unsaved(repo: &ExpenseRepository) {
    if let SaveOutcome::Failed(reason) = repo.last_save() {
        println!("   ⚠️  Change kept for this run but not saved: {}", reason);
    }
}
