//! Market maker CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use quoter_config::{load_config, LogFormat};
use quoter_monitor::setup_logging;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Loaded once up front; a broken file is reported by the command itself.
    let config = load_config(Some(&cli.config));

    let (level, json, file) = match &config {
        Ok(config) => (
            cli.log_level
                .map(|level| level.as_str().to_string())
                .unwrap_or_else(|| config.logging.level.clone()),
            cli.json_logs || config.logging.format == LogFormat::Json,
            config.logging.file.clone(),
        ),
        Err(_) => (
            cli.log_level.map_or("info", |level| level.as_str()).to_string(),
            cli.json_logs,
            None,
        ),
    };
    let _guard = setup_logging(&level, json, file.as_deref().map(Path::new));

    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, &cli.config, config).await,
        Commands::ValidateConfig(args) => cli::commands::validate::run(args, &cli.config, config),
    }
}
