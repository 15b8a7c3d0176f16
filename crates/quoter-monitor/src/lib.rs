//! Logging and fill notification.

mod logging;
mod notifier;

pub use logging::setup_logging;
pub use notifier::LogNotifier;
