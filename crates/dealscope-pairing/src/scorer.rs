//! Core trait and records for pair scoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dealscope_traits::{Company, CompanyId, Result};

use crate::cache::HistoryCache;

/// Subscore key of the size fit.
pub const SIZE: &str = "size";
/// Subscore key of the sector fit.
pub const SECTOR: &str = "sector";
/// Subscore key of the growth synergy.
pub const GROWTH_SYNERGY: &str = "growth_synergy";
/// Subscore key of the market position.
pub const MARKET_POSITION: &str = "market_position";
/// Subscore key of the target's clamped revenue CAGR.
pub const TARGET_CAGR: &str = "target_cagr";
/// Subscore key of the target's clamped latest revenue growth.
pub const TARGET_RECENT_GROWTH: &str = "target_recent_growth";

/// Compatibility of one acquirer/target pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    /// Acquirer company id.
    pub acquirer_id: CompanyId,
    /// Target company id.
    pub target_id: CompanyId,
    /// Weighted score in `[0, 100]`.
    pub score: f64,
    /// Named sub-scores and diagnostics.
    pub subscores: BTreeMap<String, f64>,
}

impl CompatibilityScore {
    /// Look up a subscore by key.
    #[must_use]
    pub fn subscore(&self, key: &str) -> Option<f64> {
        self.subscores.get(key).copied()
    }

    /// Convert into the record the persistence layer upserts.
    #[must_use]
    pub fn into_deal_pair(self) -> DealPair {
        DealPair {
            acquirer_id: self.acquirer_id,
            target_id: self.target_id,
            compatibility_score: self.score,
            metadata: self.subscores,
        }
    }
}

/// Persisted form of a compatibility score.
///
/// `(acquirer_id, target_id)` is unique; re-scoring a pair overwrites the
/// stored record rather than adding one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealPair {
    /// Acquirer company id.
    pub acquirer_id: CompanyId,
    /// Target company id.
    pub target_id: CompanyId,
    /// Score in `[0, 100]`.
    pub compatibility_score: f64,
    /// Subscores stored alongside the score.
    pub metadata: BTreeMap<String, f64>,
}

impl DealPair {
    /// Upsert key of the record.
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.acquirer_id, &self.target_id)
    }
}

/// Scores how well a target fits an acquirer.
///
/// Implementors must be thread-safe (Send + Sync) because candidate ranking
/// scores a universe in parallel, and deterministic: the same inputs must
/// yield the same score bit-for-bit.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use dealscope_pairing::{CompatibilityScore, HistoryCache, PairScorer};
/// use dealscope_traits::{Company, Result};
///
/// struct SameSector;
///
/// impl PairScorer for SameSector {
///     fn score_pair(
///         &self,
///         acquirer: &Company,
///         target: &Company,
///         _history: &HistoryCache<'_>,
///     ) -> Result<CompatibilityScore> {
///         let score = if acquirer.sector == target.sector { 100.0 } else { 0.0 };
///         Ok(CompatibilityScore {
///             acquirer_id: acquirer.id.clone(),
///             target_id: target.id.clone(),
///             score,
///             subscores: BTreeMap::new(),
///         })
///     }
///
///     fn name(&self) -> &str {
///         "same_sector"
///     }
/// }
/// ```
pub trait PairScorer: Send + Sync {
    /// Score `target` as an acquisition by `acquirer`.
    ///
    /// # Errors
    ///
    /// Returns an error when the data needed for the score cannot be read.
    fn score_pair(
        &self,
        acquirer: &Company,
        target: &Company,
        history: &HistoryCache<'_>,
    ) -> Result<CompatibilityScore>;

    /// Name of this scoring strategy.
    fn name(&self) -> &str;
}
