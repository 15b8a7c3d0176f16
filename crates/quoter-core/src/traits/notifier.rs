//! Fill notification sink.

use crate::types::FillEvent;

/// Receives the human-readable record produced for each fill.
///
/// Implementations must not block: notification happens between ticks on the
/// same task that drives quoting.
pub trait FillNotifier: Send + Sync {
    fn notify(&self, fill: &FillEvent, message: &str);
}
