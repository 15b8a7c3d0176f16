//! Fill notification through the log.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use quoter_core::traits::FillNotifier;
use quoter_core::types::FillEvent;

/// Writes every fill record to the log at info level.
#[derive(Debug, Default)]
pub struct LogNotifier {
    count: AtomicU64,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fills seen so far.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl FillNotifier for LogNotifier {
    fn notify(&self, fill: &FillEvent, message: &str) {
        self.count.fetch_add(1, Ordering::Relaxed);
        info!(
            order_id = %fill.order_id,
            side = %fill.side,
            price = %fill.price,
            amount = %fill.amount,
            "{}",
            message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quoter_core::types::Side;
    use rust_decimal_macros::dec;

    #[test]
    fn test_counts_fills() {
        let notifier = LogNotifier::new();
        let fill = FillEvent {
            order_id: "abc".to_string(),
            symbol: "ETH-USDT".to_string(),
            side: Side::Sell,
            amount: dec!(0.02),
            price: dec!(1820.5),
            timestamp: Utc::now(),
        };

        notifier.notify(&fill, &fill.summary());
        notifier.notify(&fill, &fill.summary());

        assert_eq!(notifier.count(), 2);
    }
}
