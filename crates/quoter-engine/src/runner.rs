//! Quoting loop driver.

use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::info;

use quoter_core::types::FillEvent;
use quoter_core::QuoterResult;

use crate::{OrderLifecycleManager, Schedule};

/// Counters for one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub ticks: u64,
    /// Ticks that were due and went through a full cycle
    pub cycles: u64,
    pub orders_submitted: u64,
    pub fills: u64,
}

/// Ticks the lifecycle manager on a fixed period and relays fills.
pub struct QuotingLoop {
    manager: OrderLifecycleManager,
    tick_period: Duration,
}

impl QuotingLoop {
    pub fn new(manager: OrderLifecycleManager, tick_period: Duration) -> Self {
        Self {
            manager,
            tick_period,
        }
    }

    pub fn manager(&self) -> &OrderLifecycleManager {
        &self.manager
    }

    /// Run until `shutdown` resolves.
    ///
    /// Starts the candle feed first and, on the way out, cancels every
    /// resting order and stops the feed. A tick always runs to completion
    /// before the next one or a fill is handled.
    pub async fn run<S>(
        &self,
        mut fills: mpsc::UnboundedReceiver<FillEvent>,
        shutdown: S,
    ) -> QuoterResult<LoopSummary>
    where
        S: Future<Output = ()>,
    {
        let feed = self.manager.feed();
        feed.start().await?;
        info!(
            feed = feed.name(),
            venue = self.manager.venue().name(),
            pair = %self.manager.config().pair,
            tick_ms = self.tick_period.as_millis() as u64,
            "Quoting loop started"
        );

        let mut ticker = tokio::time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut schedule = Schedule::immediate();
        let mut summary = LoopSummary::default();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    summary.ticks += 1;
                    let report = self.manager.tick(Utc::now(), schedule).await;
                    schedule = report.schedule;
                    if !report.is_idle() {
                        summary.cycles += 1;
                        summary.orders_submitted += report.submitted.len() as u64;
                    }
                }
                Some(fill) = fills.recv() => {
                    summary.fills += 1;
                    self.manager.on_fill(&fill);
                }
            }
        }

        let (cancelled, failures) = self.manager.cancel_all().await;
        info!(
            cancelled = cancelled.len(),
            failures = failures.len(),
            "Resting orders cancelled"
        );
        feed.stop().await;
        info!(?summary, "Quoting loop stopped");

        Ok(summary)
    }
}
