//! OHLCV (Open, High, Low, Close, Volume) data types.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One candle of a fixed interval.
/// Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar with every price set to `close`. Handy for feeds that only report trades.
    pub fn flat(timestamp: i64, close: f64) -> Self {
        Self::new(timestamp, close, close, close, close, 0.0)
    }

    /// Check the bar is internally consistent (positive prices, high >= low).
    pub fn is_valid(&self) -> bool {
        self.close > 0.0
            && self.open > 0.0
            && self.low > 0.0
            && self.high >= self.low
            && self.volume >= 0.0
    }
}

/// Rolling window of candles, oldest first.
///
/// The window is append-only: when `capacity` is reached the oldest bar is evicted.
#[derive(Debug, Clone)]
pub struct BarSeries {
    /// Symbol identifier
    pub symbol: String,
    bars: VecDeque<Bar>,
    /// Maximum capacity (0 = unlimited)
    capacity: usize,
}

impl BarSeries {
    /// Create a new, unbounded bar series.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: VecDeque::new(),
            capacity: 0,
        }
    }

    /// Create a bar series holding at most `capacity` bars.
    pub fn with_capacity(symbol: impl Into<String>, capacity: usize) -> Self {
        Self {
            symbol: symbol.into(),
            bars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new bar, removing the oldest if at capacity.
    pub fn push(&mut self, bar: Bar) {
        if self.capacity > 0 && self.bars.len() >= self.capacity {
            self.bars.pop_front();
        }
        self.bars.push_back(bar);
    }

    /// Push multiple bars.
    pub fn extend(&mut self, bars: impl IntoIterator<Item = Bar>) {
        for bar in bars {
            self.push(bar);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the last bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.back()
    }

    /// Copy the window out, oldest first.
    pub fn to_vec(&self) -> Vec<Bar> {
        self.bars.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_validity() {
        assert!(Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 10.0).is_valid());
        assert!(!Bar::new(1000, 100.0, 90.0, 95.0, 105.0, 10.0).is_valid());
        assert!(!Bar::flat(1000, 0.0).is_valid());
    }

    #[test]
    fn test_bar_series_capacity() {
        let mut series = BarSeries::with_capacity("ETH-USDT", 3);

        series.push(Bar::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0));
        series.push(Bar::new(2, 100.5, 102.0, 100.0, 101.5, 1000.0));
        series.push(Bar::new(3, 101.5, 103.0, 101.0, 102.5, 1000.0));
        assert_eq!(series.len(), 3);

        // Should remove oldest when at capacity
        series.push(Bar::new(4, 102.5, 104.0, 102.0, 103.5, 1000.0));
        assert_eq!(series.len(), 3);
        assert_eq!(series.to_vec()[0].timestamp, 2);
        assert_eq!(series.last().unwrap().timestamp, 4);
    }

    #[test]
    fn test_unbounded_series() {
        let mut series = BarSeries::new("ETH-USDT");
        series.extend((0..500).map(|i| Bar::flat(i, 100.0)));

        assert_eq!(series.len(), 500);
        assert_eq!(series.capacity(), 0);
    }
}
