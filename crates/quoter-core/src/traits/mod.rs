//! Collaborator traits for the quoting loop.

mod feed;
mod indicator;
mod notifier;
mod venue;

pub use feed::CandleFeed;
pub use indicator::Indicator;
pub use notifier::FillNotifier;
pub use venue::{BudgetSource, PriceSource, Venue};
