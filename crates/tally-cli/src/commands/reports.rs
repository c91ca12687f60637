//! Report command implementations

use anyhow::{bail, Result};
use chrono::NaiveDate;
use tally_core::reports::MAX_TREND_MONTHS;
use tally_core::{
    category_trend, format_currency, monthly_trend, summarize, Category, ExpenseRepository,
};

/// Width of the widest bar in trend output
const BAR_WIDTH: usize = 30;

pub fn cmd_summary(repo: &ExpenseRepository, today: NaiveDate) -> Result<()> {
    let summary = summarize(repo.expenses(), today);

    println!();
    println!("💰 Spending Summary");
    println!("   ─────────────────────────────────────");
    println!(
        "   Total spending:   {:>14}",
        format_currency(summary.total_spending)
    );
    println!(
        "   This month:       {:>14}",
        format_currency(summary.monthly_spending)
    );
    println!("   Expenses:         {:>14}", repo.len());

    if summary.top_categories.is_empty() {
        println!();
        println!("   No spending recorded yet.");
        return Ok(());
    }

    println!();
    println!("   Top categories:");
    for (i, top) in summary.top_categories.iter().enumerate() {
        println!(
            "   {}. {:<14} {:>12}  {:>5.1}%",
            i + 1,
            top.category,
            format_currency(top.amount),
            top.percentage
        );
    }

    println!();
    println!("   By category:");
    for (category, amount) in &summary.category_breakdown {
        println!("      {:<14} {:>12}", category, format_currency(*amount));
    }

    Ok(())
}

pub fn cmd_trend(
    repo: &ExpenseRepository,
    months: usize,
    category: Option<Category>,
    today: NaiveDate,
) -> Result<()> {
    if !(1..=MAX_TREND_MONTHS).contains(&months) {
        bail!("months must be between 1 and {}", MAX_TREND_MONTHS);
    }

    let trend = match category {
        Some(category) => category_trend(repo.expenses(), category, months, today),
        None => monthly_trend(repo.expenses(), months, today),
    };

    println!();
    match category {
        Some(category) => println!("📈 {} spending, last {} months", category, months),
        None => println!("📈 Monthly spending, last {} months", months),
    }
    println!("   ─────────────────────────────────────────────────────────────");

    let max = trend.iter().map(|t| t.total).fold(0.0_f64, f64::max);

    for point in &trend {
        let bar_len = if max > 0.0 {
            ((point.total / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        println!(
            "   {:<8} │ {:>12} │ {:>3} │ {}",
            point.month,
            format_currency(point.total),
            point.count,
            "█".repeat(bar_len)
        );
    }

    Ok(())
}
