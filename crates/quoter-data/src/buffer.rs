//! Shared bounded candle window.

use std::sync::{Arc, PoisonError, RwLock};

use quoter_core::types::{Bar, BarSeries};

/// Rolling candle window shared between a feed's writer task and its readers.
///
/// Holds at most `capacity` bars; the oldest bar is evicted on overflow.
#[derive(Debug, Clone)]
pub struct CandleBuffer {
    series: Arc<RwLock<BarSeries>>,
}

impl CandleBuffer {
    pub fn new(symbol: impl Into<String>, capacity: usize) -> Self {
        Self {
            series: Arc::new(RwLock::new(BarSeries::with_capacity(symbol, capacity))),
        }
    }

    pub fn push(&self, bar: Bar) {
        self.series
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(bar);
    }

    pub fn extend(&self, bars: impl IntoIterator<Item = Bar>) {
        self.series
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(bars);
    }

    /// Copy of the current window, oldest first.
    pub fn window(&self) -> Vec<Bar> {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .to_vec()
    }

    pub fn last(&self) -> Option<Bar> {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    pub fn len(&self) -> usize {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .capacity()
    }
}
