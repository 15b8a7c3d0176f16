//! Volatility and trend indicators.
//!
//! This crate provides the batch indicators the quoting loop needs:
//! - Per-bar returns
//! - Simple moving average
//! - Sample standard deviation
//!
//! `IndicatorEngine` combines them into the per-tick `IndicatorSnapshot`.

pub mod engine;
pub mod moving_average;
pub mod returns;
pub mod volatility;

pub use engine::{IndicatorConfig, IndicatorEngine, IndicatorSnapshot};
pub use moving_average::Sma;
pub use returns::Returns;
pub use volatility::StdDev;
