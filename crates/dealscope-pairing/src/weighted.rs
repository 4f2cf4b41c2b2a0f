//! Fixed-weight compatibility scoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dealscope_traits::{Company, DealscopeError, FinancialHistory, Result};

use crate::cache::HistoryCache;
use crate::growth::growth_synergy_score;
use crate::scorer::{
    CompatibilityScore, GROWTH_SYNERGY, MARKET_POSITION, PairScorer, SECTOR, SIZE, TARGET_CAGR,
    TARGET_RECENT_GROWTH,
};
use crate::sector::sector_score;
use crate::size::{market_position_score, size_score};

/// Weights of the four compatibility sub-scores.
///
/// Weights are divided by their total before use, so only their proportions
/// matter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilityWeights {
    /// Size fit weight (default: 0.40)
    pub size: f64,
    /// Sector fit weight (default: 0.25)
    pub sector: f64,
    /// Growth synergy weight (default: 0.20)
    pub growth_synergy: f64,
    /// Market position weight (default: 0.15)
    pub market_position: f64,
}

impl CompatibilityWeights {
    /// The default weights.
    pub const FIXED: Self = Self {
        size: 0.40,
        sector: 0.25,
        growth_synergy: 0.20,
        market_position: 0.15,
    };

    /// Sum of the weights.
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.size + self.sector + self.growth_synergy + self.market_position
    }

    fn validate(&self) -> Result<f64> {
        let weights = [self.size, self.sector, self.growth_synergy, self.market_position];
        let total = self.total();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || total <= 0.0 {
            return Err(DealscopeError::InvalidInput(format!(
                "compatibility weights must be non-negative with a positive total: {self:?}"
            )));
        }
        Ok(total)
    }
}

impl Default for CompatibilityWeights {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Scores pairs as a weighted sum of size, sector, growth synergy and
/// market position, scaled to `[0, 100]`.
///
/// Only the target's history is read; the acquirer contributes its market
/// cap, sector and industry.
///
/// # Examples
///
/// ```
/// use dealscope_pairing::{HistoryCache, PairScorer, WeightedPairScorer};
/// use dealscope_traits::{Company, FinancialStatement};
///
/// let acquirer = Company::new("acq", "ACQ", "Acquirer").with_sector("Technology").with_market_cap(100.0);
/// let target = Company::new("tgt", "TGT", "Target").with_sector("Technology").with_market_cap(30.0);
/// let history: Vec<FinancialStatement> = Vec::new();
///
/// let scorer = WeightedPairScorer::default();
/// let cache = HistoryCache::new(&history);
/// let score = scorer.score_pair(&acquirer, &target, &cache).unwrap();
/// assert!(score.score > 0.0 && score.score <= 100.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WeightedPairScorer {
    weights: CompatibilityWeights,
}

impl WeightedPairScorer {
    /// Create a scorer with the given weights.
    #[must_use]
    pub const fn new(weights: CompatibilityWeights) -> Self {
        Self { weights }
    }

    /// Get the weights.
    #[must_use]
    pub const fn config(&self) -> &CompatibilityWeights {
        &self.weights
    }
}

impl PairScorer for WeightedPairScorer {
    fn score_pair(
        &self,
        acquirer: &Company,
        target: &Company,
        history: &HistoryCache<'_>,
    ) -> Result<CompatibilityScore> {
        let total = self.weights.validate()?;
        let growth = history.get(&target.id)?.growth;

        let acquirer_cap = acquirer.positive_market_cap().unwrap_or(0.0);
        let target_cap = target.positive_market_cap().unwrap_or(0.0);

        let size = size_score(acquirer_cap, target_cap);
        let sector = sector_score(
            acquirer.sector.as_deref(),
            target.sector.as_deref(),
            acquirer.industry.as_deref(),
            target.industry.as_deref(),
        );
        let synergy = growth_synergy_score(growth.revenue_cagr, growth.revenue_growth);
        let position = market_position_score(acquirer_cap, target_cap);

        let w = &self.weights;
        let weighted = (w.size * size
            + w.sector * sector
            + w.growth_synergy * synergy
            + w.market_position * position)
            / total;
        let score = (weighted * 100.0).clamp(0.0, 100.0);

        let subscores = BTreeMap::from([
            (SIZE.to_string(), size),
            (SECTOR.to_string(), sector),
            (GROWTH_SYNERGY.to_string(), synergy),
            (MARKET_POSITION.to_string(), position),
            (TARGET_CAGR.to_string(), growth.revenue_cagr),
            (TARGET_RECENT_GROWTH.to_string(), growth.revenue_growth),
        ]);

        Ok(CompatibilityScore {
            acquirer_id: acquirer.id.clone(),
            target_id: target.id.clone(),
            score,
            subscores,
        })
    }

    fn name(&self) -> &str {
        "weighted"
    }
}

/// Score one pair with the default weights.
///
/// Returns the score in `[0, 100]` and the named subscores.
///
/// # Errors
///
/// Propagates a failure of `history` to return the target's statements.
pub fn score_pair(
    acquirer: &Company,
    target: &Company,
    history: &dyn FinancialHistory,
) -> Result<(f64, BTreeMap<String, f64>)> {
    let cache = HistoryCache::new(history);
    let result = WeightedPairScorer::default().score_pair(acquirer, target, &cache)?;
    Ok((result.score, result.subscores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dealscope_traits::FinancialStatement;

    fn company(id: &str, sector: &str, industry: &str, cap: f64) -> Company {
        Company::new(id, id.to_uppercase(), id)
            .with_sector(sector)
            .with_industry(industry)
            .with_market_cap(cap)
    }

    fn no_history() -> Vec<FinancialStatement> {
        Vec::new()
    }

    fn growing_target() -> Vec<FinancialStatement> {
        vec![
            FinancialStatement::annual_income("tgt", 2021).with_item("Revenue", 100.0),
            FinancialStatement::annual_income("tgt", 2022).with_item("Revenue", 110.0),
            FinancialStatement::annual_income("tgt", 2023).with_item("Revenue", 121.0),
        ]
    }

    #[test]
    fn test_perfect_fit_without_growth() {
        let acquirer = company("acq", "Technology", "Software", 100.0);
        let target = company("tgt", "Technology", "Software", 30.0);
        let (score, subscores) = score_pair(&acquirer, &target, &no_history()).unwrap();

        // size 1, sector 1, synergy 0, position 1
        assert_relative_eq!(score, 80.0, epsilon = 1e-9);
        assert_relative_eq!(subscores[SIZE], 1.0);
        assert_relative_eq!(subscores[SECTOR], 1.0);
        assert_relative_eq!(subscores[GROWTH_SYNERGY], 0.0);
        assert_relative_eq!(subscores[MARKET_POSITION], 1.0);
    }

    #[test]
    fn test_growth_synergy_contributes() {
        let acquirer = company("acq", "Technology", "Software", 100.0);
        let target = company("tgt", "Technology", "Software", 30.0);
        let (score, subscores) = score_pair(&acquirer, &target, &growing_target()).unwrap();

        assert_relative_eq!(subscores[TARGET_CAGR], 0.1, epsilon = 1e-12);
        assert_relative_eq!(subscores[TARGET_RECENT_GROWTH], 0.1, epsilon = 1e-12);
        assert_relative_eq!(subscores[GROWTH_SYNERGY], 0.1, epsilon = 1e-12);
        assert_relative_eq!(score, 82.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_caps_and_sector() {
        let acquirer = Company::new("acq", "ACQ", "Acquirer");
        let target = Company::new("tgt", "TGT", "Target");
        let (score, _) = score_pair(&acquirer, &target, &no_history()).unwrap();
        assert_relative_eq!(score, 0.0);
    }

    #[test]
    fn test_idempotent() {
        let acquirer = company("acq", "Technology", "Hardware", 100.0);
        let target = company("tgt", "Technology", "Semiconductors", 8.0);
        let history = growing_target();
        let (first, _) = score_pair(&acquirer, &target, &history).unwrap();
        let (second, _) = score_pair(&acquirer, &target, &history).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_custom_weights_are_normalized() {
        let acquirer = company("acq", "Technology", "Software", 100.0);
        let target = company("tgt", "Technology", "Software", 30.0);
        let history: Vec<FinancialStatement> = Vec::new();
        let cache = HistoryCache::new(&history);

        let sector_only = WeightedPairScorer::new(CompatibilityWeights {
            size: 0.0,
            sector: 2.0,
            growth_synergy: 0.0,
            market_position: 0.0,
        });
        let result = sector_only.score_pair(&acquirer, &target, &cache).unwrap();
        assert_relative_eq!(result.score, 100.0);

        let invalid = WeightedPairScorer::new(CompatibilityWeights {
            size: -1.0,
            ..CompatibilityWeights::FIXED
        });
        assert!(invalid.score_pair(&acquirer, &target, &cache).is_err());
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert_relative_eq!(CompatibilityWeights::default().total(), 1.0, epsilon = 1e-12);
    }
}
