#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dealscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # dealscope
//!
//! Deal sourcing and valuation engine.
//!
//! dealscope is an umbrella crate that re-exports the dealscope sub-crates
//! and adds the pieces that span them: an [`EngineConfig`] aggregating every
//! component's configuration, and a [`DealAnalyzer`] that runs a full
//! analysis of one acquirer/target pair.
//!
//! ## Quick Start
//!
//! ```
//! use dealscope::prelude::*;
//!
//! # fn main() -> dealscope::Result<()> {
//! let acquirer = Company::new("acq", "ACQ", "Acquirer")
//!     .with_sector("Technology")
//!     .with_market_cap(1_000.0);
//! let candidates = vec![
//!     Company::new("a", "A", "Alpha").with_sector("Technology").with_market_cap(300.0),
//!     Company::new("b", "B", "Beta").with_sector("Energy").with_market_cap(40.0),
//! ];
//! let statements = vec![
//!     FinancialStatement::annual_income("a", 2022)
//!         .with_item("Revenue", 500.0)
//!         .with_item("Operating Income", 60.0),
//!     FinancialStatement::annual_income("a", 2023)
//!         .with_item("Revenue", 560.0)
//!         .with_item("Operating Income", 70.0),
//! ];
//!
//! // Rank the universe, then value the best candidate
//! let ranked = rank_candidates(&acquirer, &candidates, &statements, 5);
//! let best = &ranked[0].candidate;
//! let dcf = DcfModel::default().run(&statements.statements(&best.id)?, 0.05, 0.10, Some(0.02))?;
//! assert!(dcf.enterprise_value > 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Data model, metric aliases, errors and collaborator traits
//! - [`valuation`] - Normalization, DCF, confidence, comps, WACC, ensemble
//! - [`pairing`] - Compatibility scoring and candidate ranking
//!
//! ## Pipeline
//!
//! 1. **Normalize** annual income statements into per-year FCF inputs
//! 2. **Estimate** a base FCF profile and **project** it over the horizon
//! 3. **Value** the projection and build the sensitivity grid
//! 4. **Score** how much the DCF can be trusted
//! 5. **Cross-check** with median peer multiples and blend the methods
//!
//! The engine never performs I/O. Statements and market data reach it
//! through [`FinancialHistory`] and [`MarketDataSource`].

/// Version information for the dealscope crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod analysis;
mod config;

pub use analysis::{DealAnalysis, DealAnalyzer};
pub use config::{ConfigError, EngineConfig};

// ============================================================================
// Core Types
// ============================================================================

/// Data model and collaborator traits.
///
/// - [`FinancialHistory`] - Supplies a company's statements
/// - [`MarketDataSource`] - Supplies point-in-time market data
/// - [`Metric`](dealscope_traits::Metric) - Canonical line items and their aliases
pub mod traits {
    pub use dealscope_traits::*;
}

pub use dealscope_traits::{
    Company, DealscopeError, FinancialHistory, FinancialStatement, MarketData,
    MarketDataSource, MarketSnapshot, Result,
};

// ============================================================================
// Valuation
// ============================================================================

/// Valuation methods.
///
/// ## DCF
///
/// ```text
/// EV = Σ FCF_t / (1 + wacc)^t + FCF_n (1 + g) / (wacc − g) / (1 + wacc)^n
/// ```
///
/// Defined only when `wacc > g`; otherwise the valuation fails with
/// [`DealscopeError::DiscountRateNotAboveGrowth`].
///
/// ## Comparable multiples
///
/// Median EV/Revenue and EV/EBITDA of same-sector peers within a market cap
/// band, applied to the target and blended 40/60. Fails with
/// [`DealscopeError::NoComparables`] when no peer is usable.
pub mod valuation {
    pub use dealscope_valuation::*;
}

pub use dealscope_valuation::{
    CompsResult, ConfidenceBreakdown, DcfModel, DcfResult, EnsembleValuation, SensitivityGrid,
    value_comps,
};

// ============================================================================
// Pairing
// ============================================================================

/// Acquirer/target compatibility.
///
/// Four sub-scores weighted `{size: 0.4, sector: 0.25, growth_synergy: 0.2,
/// market_position: 0.15}` into a `[0, 100]` score. Ranking scores the
/// universe in parallel and sorts with a stable, descending order.
pub mod pairing {
    pub use dealscope_pairing::*;
}

pub use dealscope_pairing::{
    CompatibilityScore, DealPair, PairScorer, RankedCandidate, rank_candidates, score_pair,
};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```
/// use dealscope::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Company, CompatibilityScore, DcfModel, DealAnalyzer, DealscopeError, EngineConfig,
        FinancialHistory, FinancialStatement, MarketDataSource, MarketSnapshot, Result,
        rank_candidates, score_pair, value_comps,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_re_exports() {
        fn _accept_history(_history: &dyn FinancialHistory) {}
        fn _accept_market(_market: &dyn MarketDataSource) {}
        fn _accept_scorer(_scorer: &dyn PairScorer) {}
    }

    #[test]
    fn test_error_types() {
        let _result: Result<()> = Ok(());
        let error = DealscopeError::NoComparables {
            target: "TGT".to_string(),
        };
        assert!(error.is_domain_violation());
    }
}
