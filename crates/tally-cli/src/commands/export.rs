//! Export command implementation

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::export::{export_to, render};
use tally_core::{ExportDestination, ExportFormat, ExpenseRepository, LocalExportDestination};

/// Export every expense, sorted most recent first
///
/// With `output` the export is written into that directory under a
/// timestamped name; otherwise it goes to stdout.
pub fn cmd_export(
    repo: &ExpenseRepository,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let expenses = tally_core::ExpenseFilter::new().apply(repo.expenses());

    match output {
        Some(dir) => {
            let destination = LocalExportDestination::new(dir)
                .with_context(|| format!("Failed to prepare {}", dir.display()))?;
            let location = export_to(&destination, &expenses, format)?;
            println!(
                "📤 Exported {} expenses as {} to {}",
                expenses.len(),
                format.as_str().to_uppercase(),
                location
            );
        }
        None => {
            println!("{}", render(&expenses, format)?);
        }
    }

    Ok(())
}

/// List exports previously written into `dir`, newest first
pub fn cmd_exports(dir: &Path) -> Result<()> {
    if !dir.exists() {
        println!("No exports found (directory does not exist)");
        println!("Directory: {}", dir.display());
        return Ok(());
    }

    let destination = LocalExportDestination::new(dir)
        .with_context(|| format!("Failed to access export directory: {}", dir.display()))?;
    let exports = destination.list().context("Failed to list exports")?;

    if exports.is_empty() {
        println!("No exports found");
        println!("Directory: {}", destination.export_dir().display());
        return Ok(());
    }

    println!("Exports in {}:", destination.export_dir().display());
    println!();
    println!("{:<35} {:>10} {:>17}", "NAME", "SIZE", "WRITTEN");
    println!("{}", "-".repeat(64));

    for export in &exports {
        println!(
            "{:<35} {:>10} {:>17}",
            export.name,
            format_size(export.size),
            export.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!("{} export(s)", exports.len());

    Ok(())
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
