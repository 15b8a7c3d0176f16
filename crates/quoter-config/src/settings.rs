//! Configuration structures.

use chrono::Duration as TimeDelta;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use quoter_core::types::{PriceType, Timeframe, TradingPair, TradingRules};
use quoter_engine::LifecycleConfig;
use quoter_indicators::IndicatorConfig;
use quoter_risk::BudgetConfig;
use quoter_strategy::{QuoteConfig, SpreadSkew};

/// Longest accepted refresh interval (one day).
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 86_400;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub quoting: QuotingSettings,
    #[serde(default)]
    pub paper: PaperSettings,
}

impl AppConfig {
    /// Render as TOML, e.g. to print the defaults.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn indicator_config(&self) -> IndicatorConfig {
        IndicatorConfig {
            lookback: self.quoting.lookback,
            volatility_floor: self.quoting.volatility_floor,
        }
    }

    pub fn quote_config(&self) -> QuoteConfig {
        QuoteConfig {
            order_amount: self.quoting.order_amount,
            uptrend_skew: SpreadSkew::new(
                self.quoting.uptrend_bid_factor,
                self.quoting.uptrend_ask_factor,
            ),
        }
    }

    pub fn budget_config(&self) -> BudgetConfig {
        BudgetConfig {
            fee_pct: self.paper.fee_pct,
        }
    }

    pub fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            pair: self.market.trading_pair.clone(),
            price_type: self.market.price_source,
            refresh_interval: TimeDelta::seconds(
                self.quoting.refresh_interval_secs.min(MAX_REFRESH_INTERVAL_SECS) as i64,
            ),
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.quoting.tick_period_ms)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "quoter".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Console log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Also write JSON logs to this file
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

/// Instrument and market data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSettings {
    /// Venue the orders go to
    pub exchange: String,
    pub trading_pair: TradingPair,
    /// Reference price the quotes are anchored on
    pub price_source: PriceType,
    pub candle_interval: Timeframe,
    /// Candles kept in the rolling window
    pub max_records: usize,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            exchange: "paper".to_string(),
            trading_pair: TradingPair::new("ETH", "USDT"),
            price_source: PriceType::MidPrice,
            candle_interval: Timeframe::Minute1,
            max_records: 200,
        }
    }
}

/// Quoting loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotingSettings {
    /// Size of each quote in the base asset
    pub order_amount: Decimal,
    pub refresh_interval_secs: u64,
    pub lookback: usize,
    pub volatility_floor: f64,
    pub uptrend_bid_factor: Decimal,
    pub uptrend_ask_factor: Decimal,
    /// How often the loop checks whether a refresh is due
    pub tick_period_ms: u64,
}

impl Default for QuotingSettings {
    fn default() -> Self {
        Self {
            order_amount: dec!(0.02),
            refresh_interval_secs: 10,
            lookback: 10,
            volatility_floor: 0.001,
            uptrend_bid_factor: dec!(0.5),
            uptrend_ask_factor: dec!(1.5),
            tick_period_ms: 1000,
        }
    }
}

/// Paper venue and candle replay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperSettings {
    pub base_balance: Decimal,
    pub quote_balance: Decimal,
    /// Maker fee in percent of notional
    pub fee_pct: Decimal,
    pub tick_size: Decimal,
    pub step_size: Decimal,
    pub min_amount: Decimal,
    pub min_notional: Decimal,
    /// Candles to replay, `timestamp,open,high,low,close,volume`
    pub candles_file: Option<String>,
    pub replay_interval_ms: u64,
    /// Candles appended up front so quoting can start immediately
    pub warmup_bars: usize,
    /// Synthetic book half-spread around each replayed close, in percent
    pub book_half_spread_pct: Decimal,
}

impl Default for PaperSettings {
    fn default() -> Self {
        Self {
            base_balance: dec!(1),
            quote_balance: dec!(10000),
            fee_pct: dec!(0.1),
            tick_size: dec!(0.01),
            step_size: dec!(0.0001),
            min_amount: dec!(0.0001),
            min_notional: dec!(10),
            candles_file: None,
            replay_interval_ms: 1000,
            warmup_bars: 11,
            book_half_spread_pct: dec!(0.01),
        }
    }
}

impl PaperSettings {
    pub fn trading_rules(&self) -> TradingRules {
        TradingRules {
            tick_size: self.tick_size,
            step_size: self.step_size,
            min_amount: self.min_amount,
            min_notional: self.min_notional,
        }
    }

    pub fn replay_interval(&self) -> Duration {
        Duration::from_millis(self.replay_interval_ms)
    }
}
