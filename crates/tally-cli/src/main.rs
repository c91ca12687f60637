//! Tally CLI - Personal expense tracker
//!
//! Usage:
//!   tally add -a 12.50 -d "Lunch" -c Food   Record an expense
//!   tally list --category Food              List expenses
//!   tally summary                           Spending overview
//!   tally exports ./exports                 List written exports
//!   tally serve --port 3000                 Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.data_dir.as_deref(), cli.key.as_deref());

    match cli.command {
        Commands::Add {
            amount,
            description,
            category,
            date,
        } => {
            let mut repo = commands::open_repository(&config)?;
            commands::cmd_add(&mut repo, &amount, &description, category, date)
        }
        Commands::List {
            search,
            category,
            from,
            to,
            limit,
            json,
        } => {
            let repo = commands::open_repository(&config)?;
            let filter = tally_core::ExpenseFilter::new()
                .search(search.as_deref())
                .category(category)
                .start_date(from)
                .end_date(to);
            commands::cmd_list(&repo, &filter, limit, json)
        }
        Commands::Edit {
            id,
            amount,
            description,
            category,
            date,
        } => {
            let mut repo = commands::open_repository(&config)?;
            let update = commands::build_update(
                amount.as_deref(),
                description.as_deref(),
                category,
                date,
            );
            commands::cmd_edit(&mut repo, &id, &update)
        }
        Commands::Delete { id } => {
            let mut repo = commands::open_repository(&config)?;
            commands::cmd_delete(&mut repo, &id)
        }
        Commands::Clear { yes } => {
            let mut repo = commands::open_repository(&config)?;
            commands::cmd_clear(&mut repo, yes)
        }
        Commands::Summary => {
            let repo = commands::open_repository(&config)?;
            commands::cmd_summary(&repo, commands::today())
        }
        Commands::Trend { months, category } => {
            let repo = commands::open_repository(&config)?;
            commands::cmd_trend(
                &repo,
                months.map(|m| m as usize).unwrap_or(config.trend_months),
                category,
                commands::today(),
            )
        }
        Commands::Export { format, output } => {
            let repo = commands::open_repository(&config)?;
            commands::cmd_export(&repo, format, output.as_deref())
        }
        Commands::Exports { dir } => commands::cmd_exports(&dir),
        Commands::Categories => commands::cmd_categories(),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&config, &host, port, static_dir.as_deref()).await,
    }
}
