//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tally_core::reports::MAX_TREND_MONTHS;
use tally_core::{Category, CategoryFilter, ExportFormat};

/// Tally - Track where your money goes
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal expense tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding stored expenses
    ///
    /// Defaults to TALLY_DATA_DIR, then the platform data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage key the expense collection lives under
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new expense
    Add {
        /// Amount, e.g. 12.50 or "$1,234.50"
        #[arg(short, long)]
        amount: String,

        /// What the money was spent on
        #[arg(short, long)]
        description: String,

        /// Category (Food, Transportation, Entertainment, Shopping, Bills, Healthcare, Other)
        #[arg(short, long, default_value = "Other")]
        category: Category,

        /// Date of the expense, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List expenses, most recent first
    List {
        /// Only descriptions containing this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Category to show, or "all"
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,

        /// Earliest date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Maximum number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Print the matching expenses as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of an existing expense
    Edit {
        /// Expense ID
        id: String,

        /// New amount
        #[arg(short, long)]
        amount: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<Category>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: String,
    },

    /// Delete every stored expense
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show total, this month, and spending by category
    Summary,

    /// Show spending per month
    Trend {
        /// Number of months to show, 1-120 (defaults to TALLY_TREND_MONTHS, then 6)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=MAX_TREND_MONTHS as u64))]
        months: Option<u64>,

        /// Restrict to one category
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Export expenses to CSV or JSON
    Export {
        /// Output format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Directory to write the export into (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List exports written into a directory, newest first
    Exports {
        /// Directory previously passed to `export --output`
        dir: PathBuf,
    },

    /// List categories and their chart colours
    Categories,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}
