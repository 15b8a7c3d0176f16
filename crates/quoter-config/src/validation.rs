//! Startup validation of a loaded configuration.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::settings::MAX_REFRESH_INTERVAL_SECS;
use crate::AppConfig;

/// A configuration value the quoter cannot start with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("{field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unsupported exchange '{0}', only 'paper' is available")]
    UnsupportedExchange(String),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

impl AppConfig {
    /// Check every setting; returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.market.exchange != "paper" {
            return Err(ConfigValidationError::UnsupportedExchange(
                self.market.exchange.clone(),
            ));
        }

        self.quote_config()
            .validate()
            .map_err(|reason| invalid("quoting", reason))?;
        self.indicator_config()
            .validate()
            .map_err(|err| invalid("quoting", err.to_string()))?;

        let quoting = &self.quoting;
        if quoting.refresh_interval_secs == 0 {
            return Err(invalid("quoting.refresh_interval_secs", "must be positive"));
        }
        if quoting.refresh_interval_secs > MAX_REFRESH_INTERVAL_SECS {
            return Err(invalid(
                "quoting.refresh_interval_secs",
                format!("must not exceed {}", MAX_REFRESH_INTERVAL_SECS),
            ));
        }
        if quoting.tick_period_ms == 0 {
            return Err(invalid("quoting.tick_period_ms", "must be positive"));
        }
        if self.market.max_records <= quoting.lookback {
            return Err(invalid(
                "market.max_records",
                format!("must exceed the lookback ({})", quoting.lookback),
            ));
        }

        let paper = &self.paper;
        let non_negative = [
            ("paper.base_balance", paper.base_balance),
            ("paper.quote_balance", paper.quote_balance),
            ("paper.fee_pct", paper.fee_pct),
            ("paper.tick_size", paper.tick_size),
            ("paper.step_size", paper.step_size),
            ("paper.min_amount", paper.min_amount),
            ("paper.min_notional", paper.min_notional),
            ("paper.book_half_spread_pct", paper.book_half_spread_pct),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(invalid(field, "must not be negative"));
            }
        }
        if paper.replay_interval_ms == 0 {
            return Err(invalid("paper.replay_interval_ms", "must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(AppConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_quoting_values() {
        let mut config = AppConfig::default();
        config.quoting.order_amount = Decimal::ZERO;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.quoting.volatility_floor = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.quoting.refresh_interval_secs = 0;
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "quoting.refresh_interval_secs: must be positive"
        );
    }

    #[test]
    fn test_rejects_refresh_interval_above_one_day() {
        let mut config = AppConfig::default();
        config.quoting.refresh_interval_secs = MAX_REFRESH_INTERVAL_SECS;
        assert_eq!(config.validate(), Ok(()));

        config.quoting.refresh_interval_secs = u64::MAX;
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "quoting.refresh_interval_secs: must not exceed 86400"
        );
    }

    #[test]
    fn test_window_must_hold_lookback_plus_one() {
        let mut config = AppConfig::default();
        config.quoting.lookback = 200;

        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidValue {
                field: "market.max_records",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_negative_paper_settings() {
        let mut config = AppConfig::default();
        config.paper.fee_pct = dec!(-0.1);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_only_paper_exchange() {
        let mut config = AppConfig::default();
        config.market.exchange = "binance".to_string();

        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::UnsupportedExchange("binance".into()))
        );
    }
}
