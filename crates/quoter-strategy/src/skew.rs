//! Trend-dependent spread asymmetry.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use quoter_core::types::Side;

/// Multipliers applied to volatility to get each side's spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadSkew {
    pub bid_factor: Decimal,
    pub ask_factor: Decimal,
}

impl SpreadSkew {
    /// Symmetric spread used when the trend is down or flat.
    pub const NEUTRAL: SpreadSkew = SpreadSkew {
        bid_factor: Decimal::ONE,
        ask_factor: Decimal::ONE,
    };

    pub fn new(bid_factor: Decimal, ask_factor: Decimal) -> Self {
        Self {
            bid_factor,
            ask_factor,
        }
    }

    pub fn factor(&self, side: Side) -> Decimal {
        match side {
            Side::Buy => self.bid_factor,
            Side::Sell => self.ask_factor,
        }
    }
}

impl Default for SpreadSkew {
    /// Uptrend skew: tighten the bid, widen the ask.
    fn default() -> Self {
        Self::new(dec!(0.5), dec!(1.5))
    }
}
