//! Configuration management.

mod settings;
mod validation;

pub use settings::{
    AppConfig, AppSettings, LogFormat, LoggingConfig, MarketSettings, PaperSettings,
    QuotingSettings,
};
pub use validation::ConfigValidationError;

pub use config::ConfigError;

use config::{Config, Environment, File};
use std::path::Path;

/// Load configuration from built-in defaults, an optional file and the environment.
///
/// Environment variables use the `QUOTER` prefix with `__` between path
/// segments, e.g. `QUOTER__QUOTING__ORDER_AMOUNT=0.05`.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        .add_source(
            Environment::with_prefix("QUOTER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None).unwrap();

        assert_eq!(config.market.trading_pair.to_string(), "ETH-USDT");
        assert_eq!(config.quoting.refresh_interval_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("quoter-config-{}.toml", std::process::id()));
        fs::write(
            &path,
            r#"
[market]
trading_pair = "BTC-USDT"
price_source = "best_bid"

[quoting]
order_amount = "0.001"
lookback = 20
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.market.trading_pair.base(), "BTC");
        assert_eq!(config.quoting.order_amount, dec!(0.001));
        assert_eq!(config.quoting.lookback, 20);
        // Untouched keys keep their defaults.
        assert_eq!(config.quoting.volatility_floor, 0.001);
        assert_eq!(config.market.max_records, 200);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/quoter.toml"))).is_err());
    }
}
