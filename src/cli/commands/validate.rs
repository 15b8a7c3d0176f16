//! Validate configuration command.

use anyhow::{Context, Result};
use quoter_config::{AppConfig, ConfigError};
use std::path::Path;

pub fn run(
    args: crate::cli::ValidateArgs,
    config_path: &Path,
    loaded: Result<AppConfig, ConfigError>,
) -> Result<()> {
    if args.print_default {
        print!("{}", AppConfig::default().to_toml()?);
        return Ok(());
    }

    println!("Validating configuration: {}", config_path.display());

    let config = loaded.with_context(|| format!("Failed to load {}", config_path.display()))?;
    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {} ({})", config.app.name, config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Exchange: {}", config.market.exchange);
    println!("Trading pair: {}", config.market.trading_pair);
    println!("Price source: {}", config.market.price_source);
    println!("Order amount: {}", config.quoting.order_amount);
    println!("Refresh interval: {}s", config.quoting.refresh_interval_secs);
    println!(
        "Lookback: {} bars, volatility floor {}",
        config.quoting.lookback, config.quoting.volatility_floor
    );
    println!(
        "Uptrend spread factors: bid {} / ask {}",
        config.quoting.uptrend_bid_factor, config.quoting.uptrend_ask_factor
    );

    Ok(())
}
