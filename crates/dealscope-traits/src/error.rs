//! Error types for the dealscope engine.
//!
//! Two failure classes exist. Input domain violations (a discount rate that
//! does not exceed terminal growth, a target with no usable comparables) are
//! typed variants the caller is expected to match on. Sparse or missing
//! historical data is never an error; aggregate functions degrade to
//! zero-valued or low-confidence output instead.

use thiserror::Error;

/// The main error type for dealscope operations.
#[derive(Debug, Error)]
pub enum DealscopeError {
    /// The discount rate does not exceed the terminal growth rate, so the
    /// perpetuity-growth terminal value diverges or inverts sign.
    #[error(
        "Discount rate {wacc} must exceed terminal growth {terminal_growth} for a finite terminal value"
    )]
    DiscountRateNotAboveGrowth {
        /// Weighted average cost of capital supplied by the caller.
        wacc: f64,
        /// Terminal growth rate supplied by the caller.
        terminal_growth: f64,
    },

    /// No peer survived the comparable-company filters.
    #[error("No usable comparable companies for {target}")]
    NoComparables {
        /// Ticker of the company being valued.
        target: String,
    },

    /// A numeric input is outside the range the operation accepts.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The inputs lack a fundamental the operation cannot proceed without.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A collaborator (statement store, market data provider) failed.
    #[error("Data source error: {0}")]
    DataSource(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl DealscopeError {
    /// Whether this error means the request itself cannot be answered,
    /// as opposed to an infrastructure failure worth retrying.
    #[must_use]
    pub const fn is_domain_violation(&self) -> bool {
        matches!(
            self,
            Self::DiscountRateNotAboveGrowth { .. } | Self::NoComparables { .. }
        )
    }
}

/// A specialized Result type for dealscope operations.
pub type Result<T> = std::result::Result<T, DealscopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DealscopeError::NoComparables {
            target: "SPOT".to_string(),
        };
        assert_eq!(err.to_string(), "No usable comparable companies for SPOT");

        let err = DealscopeError::InvalidInput("horizon must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid input: horizon must be positive");
    }

    #[test]
    fn test_domain_violation_classification() {
        let err = DealscopeError::DiscountRateNotAboveGrowth {
            wacc: 0.02,
            terminal_growth: 0.03,
        };
        assert!(err.is_domain_violation());
        assert!(err.to_string().contains("0.02"));

        let err = DealscopeError::DataSource("store offline".to_string());
        assert!(!err.is_domain_violation());
    }
}
