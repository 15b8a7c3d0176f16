//! Indicator trait definition.

use crate::error::IndicatorError;

/// Trait for batch technical indicators.
///
/// Indicators process price data and produce derived values
/// useful for quoting decisions.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    ///
    /// # Arguments
    /// * `data` - Input data (typically close prices), oldest first
    ///
    /// # Returns
    /// One value per complete window, oldest first; empty if there is not enough data
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        if data.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            });
        }
        Ok(())
    }

    /// Value for the most recent window, or an error if there is not enough data.
    fn latest(&self, data: &[f64]) -> Result<Self::Output, IndicatorError> {
        self.validate_data(data)?;
        self.calculate(data)
            .pop()
            .ok_or(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            })
    }
}
