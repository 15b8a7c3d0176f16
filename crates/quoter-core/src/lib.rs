//! Core types and traits for the quoting loop.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, TopOfBook)
//! - Order proposals, resting orders and fill events
//! - The error taxonomy shared by every stage of a tick
//! - Collaborator traits for the candle feed, venue, pricing and budget

pub mod types;
pub mod traits;
pub mod error;

pub use error::{QuoterError, QuoterResult};
pub use types::*;
pub use traits::*;
