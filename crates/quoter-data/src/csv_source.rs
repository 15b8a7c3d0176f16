//! CSV candle loading.

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use quoter_core::error::DataError;
use quoter_core::types::Bar;

#[derive(Debug, Deserialize)]
struct CandleRecord {
    #[serde(alias = "Timestamp", alias = "date", alias = "Date")]
    timestamp: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

/// Load candles from a `timestamp,open,high,low,close,volume` file.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>, DataError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let bars = parse_csv(file)?;
    debug!(path = %path.display(), bars = bars.len(), "Loaded candles");
    Ok(bars)
}

/// Parse candles from any reader, sorted oldest first.
///
/// Rows with non-positive prices are rejected rather than skipped.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (row, result) in reader.deserialize().enumerate() {
        let record: CandleRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
        let bar = Bar::new(
            parse_timestamp(&record.timestamp)?,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        );
        if !bar.is_valid() {
            return Err(DataError::ParseError(format!(
                "row {}: inconsistent candle {:?}",
                row + 1,
                bar
            )));
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(DataError::NoDataAvailable);
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

/// Unix seconds, Unix milliseconds or an ISO-like date/time, all UTC.
fn parse_timestamp(raw: &str) -> Result<i64, DataError> {
    if let Ok(ts) = raw.parse::<i64>() {
        // Anything past 10^10 can only be milliseconds.
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| DataError::ParseError(format!("Could not parse timestamp: {}", raw)))
}
