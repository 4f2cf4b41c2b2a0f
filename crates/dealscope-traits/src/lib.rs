#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dealscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Shared kernel for the dealscope valuation engine.
//!
//! This crate provides the data model read by every engine component
//! (statements, companies, market snapshots), the canonical metric alias
//! table used to read loosely typed line items, statistics helpers, the
//! error type, and the read-only collaborator traits through which callers
//! supply data.

/// The version of the dealscope-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod market;
pub mod metrics;
pub mod source;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{DealscopeError, Result};
pub use market::MarketData;
pub use metrics::{Extraction, Metric, SkippedField};
pub use source::{FinancialHistory, MarketDataSource};
pub use types::{
    Company, CompanyId, Date, FinancialStatement, LineItemValue, MarketSnapshot,
    ReportingPeriod, StatementKey, StatementType,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
