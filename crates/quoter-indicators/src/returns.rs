//! Simple per-bar returns.

use quoter_core::traits::Indicator;

/// Simple returns `x[i] / x[i - 1] - 1` for each consecutive pair.
#[derive(Debug, Clone, Default)]
pub struct Returns;

impl Returns {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Returns {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        data.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
    }

    fn period(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        "Returns"
    }
}
