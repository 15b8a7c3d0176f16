//! Error types for the quoting loop.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{PriceType, Side};

/// Top-level quoter error.
#[derive(Error, Debug)]
pub enum QuoterError {
    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),
}

/// Reasons a tick stops short of submitting quotes.
///
/// None of these are failures of the loop itself: each one degrades the
/// tick to cancel-only and quoting is retried on the next refresh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    #[error("Insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Price unavailable: {0}")]
    PriceUnavailable(PriceKind),

    #[error("Insufficient {asset} budget: required {required}, available {available}")]
    BudgetInsufficient {
        asset: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("Invalid {side} proposal: {reason}")]
    InvalidProposal { side: Side, reason: String },
}

/// Which price input was missing when generating quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    Reference(PriceType),
    BestBid,
    BestAsk,
}

impl std::fmt::Display for PriceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceKind::Reference(price_type) => write!(f, "reference price ({})", price_type),
            PriceKind::BestBid => write!(f, "best bid"),
            PriceKind::BestAsk => write!(f, "best ask"),
        }
    }
}

/// Venue command and query errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrokerError {
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Order would cross the book: {side} at {price}")]
    WouldCross { side: Side, price: Decimal },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Market data errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("No data available")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Feed already started")]
    AlreadyStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for quoter operations.
pub type QuoterResult<T> = Result<T, QuoterError>;
