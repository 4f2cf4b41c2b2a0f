//! Valuation engine for dealscope.
//!
//! This crate turns a company's financial statements into enterprise value
//! estimates with explicit confidence:
//! - Normalization: annual income statements to per-year FCF inputs
//! - DCF: base FCF profile, projection, discounting, sensitivity grid
//! - Confidence: four-factor reliability score of a DCF
//! - Comps: median peer EV/Revenue and EV/EBITDA multiples
//! - WACC: CAPM discount rate and R²-adjusted beta
//! - Ensemble: weighted blend of method estimates
//!
//! Every function is pure and synchronous. Sparse history degrades to
//! zero-valued or low-confidence output; only requests that cannot be
//! answered (a discount rate not above terminal growth, no usable peers)
//! fail.
//!
//! # Example
//!
//! ```
//! use dealscope_traits::FinancialStatement;
//! use dealscope_valuation::dcf::{estimate_base_fcf, project, value_dcf};
//! use dealscope_valuation::normalize::normalize;
//!
//! let statements = vec![
//!     FinancialStatement::annual_income("acme", 2023)
//!         .with_item("Revenue", 1_000.0)
//!         .with_item("Operating Income", 120.0),
//! ];
//! let base = estimate_base_fcf(&normalize(&statements));
//! let projection = project(&base, 0.05, 5).unwrap();
//! let result = value_dcf(&projection, 0.10, 0.02).unwrap();
//! assert!(result.enterprise_value > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod comps;
pub mod confidence;
pub mod dcf;
pub mod ensemble;
pub mod normalize;
pub mod registry;
pub mod wacc;

// Re-export key types
pub use comps::{CompsConfig, CompsResult, CompsValuator, PeerMultiple, value_comps};
pub use confidence::{
    CompletenessReport, ConfidenceBreakdown, ConfidenceSubMetrics, ConfidenceWeights,
    assess_data_completeness, score_dcf_confidence, score_normalized_confidence,
};
pub use dcf::{
    BaseFcfProfile, DcfConfig, DcfModel, DcfResult, Projection, ProjectionConfig,
    SensitivityConfig, SensitivityGrid, TerminalGrowth, estimate_base_fcf, project,
    sensitivity_grid, value_dcf,
};
pub use ensemble::{EnsembleValuation, EnsembleWeights, MethodEstimate, blend};
pub use normalize::{Normalization, NormalizedYear, normalize, normalize_with_report};
pub use registry::{MethodInfo, ValuationMethod};
pub use wacc::{WaccInputs, beta_from_prices, estimate_beta, estimate_wacc, simple_returns};
