//! Per-tick volatility and trend computation.

use quoter_core::error::{IndicatorError, QuoteError};
use quoter_core::traits::Indicator;
use quoter_core::types::Bar;
use serde::{Deserialize, Serialize};

use crate::{Returns, Sma, StdDev};

/// Indicator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// Lookback L shared by the moving average and the volatility estimate
    pub lookback: usize,
    /// Substituted when the measured volatility is zero
    pub volatility_floor: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            lookback: 10,
            volatility_floor: 0.001,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), IndicatorError> {
        if self.lookback < 2 {
            return Err(IndicatorError::InvalidParameter(
                "lookback must be at least 2".into(),
            ));
        }
        if !(self.volatility_floor.is_finite() && self.volatility_floor > 0.0) {
            return Err(IndicatorError::InvalidParameter(
                "volatility floor must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Indicator outputs for one tick. Recomputed from scratch every time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    /// Sample std-dev of the last L returns, never zero
    pub volatility: f64,
    /// Latest close strictly above the L-bar SMA
    pub trend_up: bool,
    pub moving_average: f64,
    pub last_close: f64,
    /// The floor replaced a zero (or non-finite) measurement
    pub floored: bool,
}

/// Derives `IndicatorSnapshot`s from a candle window.
///
/// Stateless: the same window always yields the same snapshot.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
    returns: Returns,
    std_dev: StdDev,
    sma: Sma,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self, IndicatorError> {
        config.validate()?;
        Ok(Self {
            returns: Returns::new(),
            std_dev: StdDev::new(config.lookback),
            sma: Sma::new(config.lookback),
            config,
        })
    }

    /// Number of bars needed before a snapshot can be produced (L + 1).
    pub fn required_bars(&self) -> usize {
        self.config.lookback + 1
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Compute volatility and trend from `window` (oldest bar first).
    pub fn compute(&self, window: &[Bar]) -> Result<IndicatorSnapshot, QuoteError> {
        let required = self.required_bars();
        if window.len() < required {
            return Err(QuoteError::InsufficientData {
                required,
                available: window.len(),
            });
        }

        let closes: Vec<f64> = window.iter().map(|bar| bar.close).collect();
        let returns = self.returns.calculate(&closes);

        let insufficient = |_| QuoteError::InsufficientData {
            required,
            available: window.len(),
        };
        let measured = self.std_dev.latest(&returns).map_err(insufficient)?;
        let moving_average = self.sma.latest(&closes).map_err(insufficient)?;
        let last_close = closes[closes.len() - 1];

        let floored = measured == 0.0 || !measured.is_finite();
        let volatility = if floored {
            self.config.volatility_floor
        } else {
            measured
        };

        Ok(IndicatorSnapshot {
            volatility,
            trend_up: last_close > moving_average,
            moving_average,
            last_close,
            floored,
        })
    }
}
