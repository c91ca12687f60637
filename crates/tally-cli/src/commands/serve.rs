//! Server command implementation

use std::path::Path;

use anyhow::Result;
use tally_core::Config;

use super::open_repository;

pub async fn cmd_serve(
    config: &Config,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Tally web server...");
    println!("   Data: {}", config.data_dir.display());
    println!("   Storage key: {}", config.storage_key);
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Parse allowed CORS origins from environment (comma-separated)
    let allowed_origins: Vec<String> = std::env::var("TALLY_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 Allowed origins: {} (TALLY_ALLOWED_ORIGINS)",
            allowed_origins.join(", ")
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let repo = open_repository(config)?;

    let server_config = tally_server::ServerConfig {
        allowed_origins,
        trend_months: config.trend_months,
    };

    tally_server::serve_with_config(repo, host, port, static_dir, server_config).await?;

    Ok(())
}
