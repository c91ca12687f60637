//! Export functionality for expenses
//!
//! Supports:
//! - CSV export for spreadsheets (human-readable dates, quoted descriptions)
//! - JSON export of the raw expense array
//! - Pluggable export destinations (local directory)
//!
//! Exports are one-way: nothing here reads an export back in.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::Expense;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json; charset=utf-8",
        }
    }

    /// File name offered for downloads
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Csv => "expenses.csv",
            Self::Json => "expenses.json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {} (valid: csv, json)", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render expenses in the requested format
pub fn render(expenses: &[Expense], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => Ok(to_csv(expenses)),
        ExportFormat::Json => to_json(expenses),
    }
}

/// Export expenses to CSV
///
/// Columns are `Date,Category,Description,Amount`. The date is written as
/// `Jan 5, 2024` without quoting, the description is always quoted, and
/// rows are joined with `\n` with no trailing newline.
pub fn to_csv(expenses: &[Expense]) -> String {
    let mut lines = Vec::with_capacity(expenses.len() + 1);
    lines.push("Date,Category,Description,Amount".to_string());

    for expense in expenses {
        lines.push(format!(
            "{},{},{},{:.2}",
            format_export_date(expense.date),
            expense.category,
            quote_csv_field(&expense.description),
            expense.amount
        ));
    }

    lines.join("\n")
}

/// Export expenses as a pretty-printed JSON array
pub fn to_json(expenses: &[Expense]) -> Result<String> {
    Ok(serde_json::to_string_pretty(expenses)?)
}

/// Short human-readable date, e.g. `Jan 5, 2024`
pub fn format_export_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Format an amount as US dollars, e.g. `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

fn quote_csv_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Information about a stored export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportInfo {
    /// Export filename
    pub name: String,
    /// Full path
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// When the export was written
    pub created_at: DateTime<Utc>,
}

/// Trait for export destinations
///
/// Implementations decide where rendered exports end up. Only the local
/// filesystem is supported.
pub trait ExportDestination: Send + Sync {
    /// Human-readable name for this destination
    fn name(&self) -> &str;

    /// Store rendered export contents under `file_name`
    ///
    /// Returns where the export was written.
    fn store(&self, file_name: &str, contents: &str) -> Result<String>;

    /// List exports in this destination, newest first
    fn list(&self) -> Result<Vec<ExportInfo>>;
}

/// Render `expenses` and hand them to `destination` under a timestamped name
pub fn export_to(
    destination: &dyn ExportDestination,
    expenses: &[Expense],
    format: ExportFormat,
) -> Result<String> {
    let contents = render(expenses, format)?;
    let name = generate_export_name(format, Utc::now());
    let location = destination.store(&name, &contents)?;
    info!(
        "Exported {} expenses as {} to {} ({})",
        expenses.len(),
        format,
        location,
        destination.name()
    );
    Ok(location)
}

/// Generate an export filename with timestamp
pub fn generate_export_name(format: ExportFormat, at: DateTime<Utc>) -> String {
    format!(
        "expenses-{}.{}",
        at.format("%Y-%m-%d-%H%M%S"),
        format.extension()
    )
}

/// Local filesystem export destination
pub struct LocalExportDestination {
    /// Directory where exports are written
    export_dir: PathBuf,
}

impl LocalExportDestination {
    /// Create a new local destination
    ///
    /// Creates the export directory if it doesn't exist.
    pub fn new(export_dir: impl Into<PathBuf>) -> Result<Self> {
        let export_dir = export_dir.into();

        if !export_dir.exists() {
            fs::create_dir_all(&export_dir).map_err(|e| {
                Error::Export(format!(
                    "Failed to create export directory {}: {}",
                    export_dir.display(),
                    e
                ))
            })?;
            info!("Created export directory: {}", export_dir.display());
        }

        Ok(Self { export_dir })
    }

    /// Get the export directory path
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

impl ExportDestination for LocalExportDestination {
    fn name(&self) -> &str {
        "local"
    }

    fn store(&self, file_name: &str, contents: &str) -> Result<String> {
        if file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(Error::Export(format!("Invalid export name: {}", file_name)));
        }

        let dest_path = self.export_dir.join(file_name);
        if dest_path.exists() {
            return Err(Error::Export(format!(
                "Export already exists: {}",
                dest_path.display()
            )));
        }

        fs::write(&dest_path, contents)?;
        Ok(dest_path.to_string_lossy().to_string())
    }

    fn list(&self) -> Result<Vec<ExportInfo>> {
        let mut exports = Vec::new();

        for entry in fs::read_dir(&self.export_dir)? {
            let entry = entry?;
            let path = entry.path();

            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) if name.starts_with("expenses") => name.to_string(),
                _ => continue,
            };

            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            let created_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            exports.push(ExportInfo {
                name: file_name,
                path: path.to_string_lossy().to_string(),
                size: metadata.len(),
                created_at,
            });
        }

        exports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(exports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use tempfile::TempDir;

    fn expense(description: &str, amount: f64, category: Category, on: NaiveDate) -> Expense {
        let now = Utc::now();
        Expense {
            id: "id-1".to_string(),
            amount,
            category,
            description: description.to_string(),
            date: on,
            created_at: now,
            updated_at: now,
        }
    }

    fn jan5() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn test_csv_single_expense() {
        let csv = to_csv(&[expense(
            "Lunch \"special\"",
            12.5,
            Category::Food,
            jan5(),
        )]);

        assert_eq!(
            csv,
            "Date,Category,Description,Amount\nJan 5, 2024,Food,\"Lunch \"\"special\"\"\",12.50"
        );
    }

    #[test]
    fn test_csv_empty_is_header_only() {
        assert_eq!(to_csv(&[]), "Date,Category,Description,Amount");
    }

    #[test]
    fn test_csv_keeps_input_order() {
        let later = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let csv = to_csv(&[
            expense("First", 1.0, Category::Bills, jan5()),
            expense("Second", 2.345, Category::Other, later),
        ]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Jan 5, 2024,Bills,\"First\",1.00");
        assert_eq!(lines[2], "Mar 15, 2024,Other,\"Second\",2.35");
    }

    #[test]
    fn test_json_is_pretty_array() {
        let expenses = vec![expense("Lunch", 12.5, Category::Food, jan5())];
        let json = to_json(&expenses).unwrap();

        assert!(json.starts_with("[\n"));
        assert!(json.contains("\"createdAt\""));
        let parsed: Vec<Expense> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, expenses);
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Csv.default_file_name(), "expenses.csv");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(12.5), "$12.50");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-3.0), "-$3.00");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn test_generate_export_name() {
        let at = DateTime::parse_from_rfc3339("2024-01-15T14:30:22Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            generate_export_name(ExportFormat::Json, at),
            "expenses-2024-01-15-143022.json"
        );
    }

    #[test]
    fn test_local_destination_store_and_list() {
        let dir = TempDir::new().unwrap();
        let dest = LocalExportDestination::new(dir.path().join("exports")).unwrap();

        let expenses = vec![expense("Lunch", 12.5, Category::Food, jan5())];
        let location = export_to(&dest, &expenses, ExportFormat::Csv).unwrap();

        let written = fs::read_to_string(&location).unwrap();
        assert!(written.starts_with("Date,Category,Description,Amount"));

        let listed = dest.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].name.ends_with(".csv"));
    }

    #[test]
    fn test_local_destination_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let dest = LocalExportDestination::new(dir.path()).unwrap();

        dest.store("expenses.csv", "a").unwrap();
        assert!(dest.store("expenses.csv", "b").is_err());
        assert!(dest.store("../expenses.csv", "b").is_err());
    }
}
