//! Core data types for the quoting loop.

mod market;
mod ohlcv;
mod order;
mod timeframe;

pub use market::{AvailableCapital, PriceType, TopOfBook, TradingPair, TradingRules};
pub use ohlcv::{Bar, BarSeries};
pub use order::{ActiveOrder, FillEvent, OrderProposal, OrderRequest, OrderStatus, Side};
pub use timeframe::Timeframe;

use num_traits::FromPrimitive;
use rust_decimal::Decimal;

/// Convert an indicator value into a price-domain decimal.
///
/// Returns `None` for NaN and infinities.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}
