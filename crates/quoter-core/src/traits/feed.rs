//! Candle feed trait definition.

use crate::error::DataError;
use crate::types::Bar;
use async_trait::async_trait;

/// Source of the rolling candle window the indicators read.
///
/// The subscription lifecycle is owned by the caller: `start` on
/// initialization, `stop` on shutdown.
#[async_trait]
pub trait CandleFeed: Send + Sync {
    /// Begin the background subscription.
    async fn start(&self) -> Result<(), DataError>;

    /// End the background subscription. Stopping a stopped feed is a no-op.
    async fn stop(&self);

    /// Snapshot of the current window, oldest first.
    fn window(&self) -> Vec<Bar>;

    /// Check if the background subscription is running.
    fn is_running(&self) -> bool;

    /// Get the feed name.
    fn name(&self) -> &str;
}
