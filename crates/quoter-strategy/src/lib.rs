//! Quote generation.
//!
//! Turns a reference price, the current best bid/ask and the tick's
//! `IndicatorSnapshot` into one maker buy and one maker sell proposal.
//! Spreads scale with volatility and skew toward accumulation in an uptrend.

mod generator;
mod skew;

pub use generator::{MarketPrices, QuoteConfig, QuoteGenerator, QuotePair};
pub use skew::SpreadSkew;
