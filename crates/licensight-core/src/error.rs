//! Error types for the analytics engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

/// Conditions raised by the analytics engine.
///
/// Only [`AnalyticsError::EmptyInput`] is fatal for a call. Insufficient data is
/// never an error: it is reported through fields on the returned values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// No usage points were supplied.
    #[error("no usage data provided")]
    EmptyInput,

    /// The billing model is not recognized; cost forecasting falls back to per-unit pricing.
    #[error("unrecognized billing model: {0}")]
    InvalidBillingModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(AnalyticsError::EmptyInput.to_string(), "no usage data provided");
        assert_eq!(
            AnalyticsError::InvalidBillingModel("unknown".to_string()).to_string(),
            "unrecognized billing model: unknown"
        );
    }
}
