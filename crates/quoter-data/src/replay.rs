//! Historical candle replay.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use quoter_core::error::DataError;
use quoter_core::traits::CandleFeed;
use quoter_core::types::Bar;

use crate::CandleBuffer;

/// Invoked with every bar the replay appends.
pub type BarCallback = Arc<dyn Fn(&Bar) + Send + Sync>;

/// Replays a fixed set of candles into a `CandleBuffer`, one per interval.
///
/// Stopping keeps the replay position, so a later `start` resumes where the
/// previous run left off.
pub struct CsvReplayFeed {
    name: String,
    bars: Arc<Vec<Bar>>,
    buffer: CandleBuffer,
    interval: Duration,
    warmup: usize,
    cursor: Arc<AtomicUsize>,
    on_bar: Option<BarCallback>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CsvReplayFeed {
    pub fn new(
        name: impl Into<String>,
        bars: Vec<Bar>,
        buffer: CandleBuffer,
        interval: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            bars: Arc::new(bars),
            buffer,
            interval,
            warmup: 0,
            cursor: Arc::new(AtomicUsize::new(0)),
            on_bar: None,
            task: Mutex::new(None),
        }
    }

    /// Append the first `warmup` bars immediately on the first start.
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_callback(mut self, on_bar: BarCallback) -> Self {
        self.on_bar = Some(on_bar);
        self
    }

    pub fn buffer(&self) -> &CandleBuffer {
        &self.buffer
    }

    /// Bars not yet replayed.
    pub fn remaining(&self) -> usize {
        self.bars.len().saturating_sub(self.cursor.load(Ordering::SeqCst))
    }

    fn emit(buffer: &CandleBuffer, on_bar: Option<&BarCallback>, bar: Bar) {
        buffer.push(bar);
        if let Some(callback) = on_bar {
            callback(&bar);
        }
    }
}

#[async_trait]
impl CandleFeed for CsvReplayFeed {
    async fn start(&self) -> Result<(), DataError> {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Err(DataError::AlreadyStarted);
        }
        if self.bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }

        if self.cursor.load(Ordering::SeqCst) == 0 && self.warmup > 0 {
            let warmup = self.warmup.min(self.bars.len());
            for bar in &self.bars[..warmup] {
                Self::emit(&self.buffer, self.on_bar.as_ref(), *bar);
            }
            self.cursor.store(warmup, Ordering::SeqCst);
            debug!(feed = %self.name, bars = warmup, "Warmup bars loaded");
        }

        let bars = Arc::clone(&self.bars);
        let buffer = self.buffer.clone();
        let cursor = Arc::clone(&self.cursor);
        let on_bar = self.on_bar.clone();
        let name = self.name.clone();
        let period = self.interval;

        *task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(bar) = bars.get(index).copied() else {
                    cursor.store(bars.len(), Ordering::SeqCst);
                    info!(feed = %name, "Replay exhausted");
                    break;
                };
                Self::emit(&buffer, on_bar.as_ref(), bar);
            }
        }));

        info!(feed = %self.name, interval_ms = period.as_millis() as u64, "Candle replay started");
        Ok(())
    }

    async fn stop(&self) {
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            info!(feed = %self.name, "Candle replay stopped");
        }
    }

    fn window(&self) -> Vec<Bar> {
        self.buffer.window()
    }

    fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
