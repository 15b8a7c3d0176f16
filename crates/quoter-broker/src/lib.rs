//! Execution venue implementations.

mod paper;

pub use paper::PaperVenue;
