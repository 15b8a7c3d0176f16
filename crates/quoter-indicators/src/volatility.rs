//! Volatility indicators.

use quoter_core::traits::Indicator;

use crate::moving_average::mean;

/// Rolling sample standard deviation (n - 1 denominator).
#[derive(Debug, Clone)]
pub struct StdDev {
    period: usize,
}

impl StdDev {
    /// Create a new standard deviation indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        Self { period }
    }
}

impl Indicator for StdDev {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let dof = (self.period - 1) as f64;
        data.windows(self.period)
            .map(|window| {
                let avg = mean(window);
                let squares: f64 = window.iter().map(|x| (x - avg).powi(2)).sum();
                (squares / dof).sqrt()
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "StdDev"
    }
}
