//! Order lifecycle management and the quoting loop driver.

mod lifecycle;
mod runner;

#[cfg(test)]
mod testing;

pub use lifecycle::{
    Collaborators, CommandFailure, LifecycleConfig, LifecyclePhase, OrderLifecycleManager,
    Schedule, TickReport,
};
pub use runner::{LoopSummary, QuotingLoop};
