//! Budget management for quoting.
//!
//! Checks a tick's proposals against the venue's free balances and trading
//! rules. The whole set is funded or none of it is.

mod budget;

pub use budget::{BudgetAdjuster, BudgetConfig, BudgetDecision};
