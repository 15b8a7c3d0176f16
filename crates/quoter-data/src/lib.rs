//! Candle feeds for the quoting loop.

mod buffer;
mod csv_source;
mod replay;

pub use buffer::CandleBuffer;
pub use csv_source::{load_csv, parse_csv};
pub use replay::{BarCallback, CsvReplayFeed};
