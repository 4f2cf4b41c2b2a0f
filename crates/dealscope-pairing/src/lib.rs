//! Acquirer/target compatibility scoring for dealscope.
//!
//! A pair is scored from four sub-scores combined with fixed weights into a
//! `[0, 100]` compatibility score:
//!
//! - **size**: piecewise fit of the target/acquirer market cap ratio
//! - **sector**: fixed lookup of sector and industry relationships
//! - **growth synergy**: the target's revenue CAGR and latest growth
//! - **market position**: distance of the relative size from 30%
//!
//! Ranking scores a candidate universe in parallel with [`rayon`], memoizing
//! each company's history in a [`HistoryCache`] for the run, then sorts the
//! results deterministically.
//!
//! # Examples
//!
//! ```
//! use dealscope_pairing::{rank_candidates, score_pair};
//! use dealscope_traits::{Company, FinancialStatement};
//!
//! let acquirer = Company::new("acq", "ACQ", "Acquirer")
//!     .with_sector("Technology")
//!     .with_market_cap(1_000.0);
//! let target = Company::new("tgt", "TGT", "Target")
//!     .with_sector("Communications")
//!     .with_market_cap(250.0);
//! let history = vec![
//!     FinancialStatement::annual_income("tgt", 2022).with_item("Revenue", 100.0),
//!     FinancialStatement::annual_income("tgt", 2023).with_item("Revenue", 120.0),
//! ];
//!
//! let (score, subscores) = score_pair(&acquirer, &target, &history).unwrap();
//! assert!(score > 0.0);
//! assert_eq!(subscores["sector"], 0.3);
//!
//! let ranked = rank_candidates(&acquirer, &[target], &history, 5);
//! assert_eq!(ranked.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cache;
pub mod growth;
pub mod rank;
pub mod scorer;
pub mod sector;
pub mod size;
pub mod weighted;

// Re-export key types
pub use cache::{CompanyHistory, HistoryCache};
pub use growth::{GrowthMetrics, growth_synergy_score};
pub use rank::{RankedCandidate, rank_candidates, rank_with, rank_with_cache};
pub use scorer::{CompatibilityScore, DealPair, PairScorer};
pub use sector::{are_adjacent, are_complementary, sector_score};
pub use size::{market_position_score, relative_size, size_score};
pub use weighted::{CompatibilityWeights, WeightedPairScorer, score_pair};
