//! Candidate ranking over a target universe.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use dealscope_traits::{Company, FinancialHistory};

use crate::cache::HistoryCache;
use crate::scorer::{CompatibilityScore, PairScorer};
use crate::weighted::WeightedPairScorer;

/// A candidate together with its compatibility score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// The candidate target.
    pub candidate: Company,
    /// Its score against the acquirer.
    pub compatibility: CompatibilityScore,
}

impl RankedCandidate {
    /// Score in `[0, 100]`.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.compatibility.score
    }
}

/// Rank `candidates` for `acquirer` with the default weighted scorer.
///
/// Builds a fresh [`HistoryCache`] for the run. See [`rank_with`].
///
/// # Example
///
/// ```
/// use dealscope_pairing::rank_candidates;
/// use dealscope_traits::{Company, FinancialStatement};
///
/// let acquirer = Company::new("acq", "ACQ", "Acquirer").with_sector("Energy").with_market_cap(100.0);
/// let candidates = vec![
///     Company::new("a", "A", "Small").with_sector("Energy").with_market_cap(2.0),
///     Company::new("b", "B", "Ideal").with_sector("Energy").with_market_cap(30.0),
/// ];
/// let history: Vec<FinancialStatement> = Vec::new();
///
/// let ranked = rank_candidates(&acquirer, &candidates, &history, 10);
/// assert_eq!(ranked[0].candidate.id, "b");
/// ```
#[must_use]
pub fn rank_candidates(
    acquirer: &Company,
    candidates: &[Company],
    history: &dyn FinancialHistory,
    top_k: usize,
) -> Vec<RankedCandidate> {
    let cache = HistoryCache::new(history);
    rank_with_cache(acquirer, candidates, &cache, top_k)
}

/// Rank with the default weighted scorer over a caller-owned cache.
#[must_use]
pub fn rank_with_cache(
    acquirer: &Company,
    candidates: &[Company],
    cache: &HistoryCache<'_>,
    top_k: usize,
) -> Vec<RankedCandidate> {
    rank_with(&WeightedPairScorer::default(), acquirer, candidates, cache, top_k)
}

/// Score every candidate in parallel and return the best `top_k`.
///
/// The result is sorted by descending score. Ties keep the order of
/// `candidates` (stable sort), so the ranking does not depend on the
/// thread schedule. The acquirer itself is skipped when it appears among
/// the candidates. A candidate whose scoring fails is logged and left out;
/// it never aborts the batch.
///
/// # Arguments
///
/// * `scorer` - Scoring strategy
/// * `acquirer` - The acquiring company
/// * `candidates` - Target universe, in its natural order
/// * `cache` - History cache shared by every scoring task
/// * `top_k` - Maximum number of results
#[must_use]
pub fn rank_with(
    scorer: &dyn PairScorer,
    acquirer: &Company,
    candidates: &[Company],
    cache: &HistoryCache<'_>,
    top_k: usize,
) -> Vec<RankedCandidate> {
    // par_iter().filter_map().collect() keeps input order
    let mut ranked: Vec<RankedCandidate> = candidates
        .par_iter()
        .filter(|candidate| candidate.id != acquirer.id)
        .filter_map(|candidate| match scorer.score_pair(acquirer, candidate, cache) {
            Ok(compatibility) if compatibility.score.is_finite() => Some(RankedCandidate {
                candidate: candidate.clone(),
                compatibility,
            }),
            Ok(compatibility) => {
                tracing::warn!(
                    acquirer = %acquirer.id,
                    candidate = %candidate.id,
                    score = compatibility.score,
                    "non-finite compatibility score, excluding candidate"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    acquirer = %acquirer.id,
                    candidate = %candidate.id,
                    error = %e,
                    "failed to score candidate, excluding it"
                );
                None
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
    ranked.truncate(top_k);

    tracing::debug!(
        acquirer = %acquirer.id,
        scorer = scorer.name(),
        candidates = candidates.len(),
        returned = ranked.len(),
        cached = cache.len(),
        "ranked candidates"
    );

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealscope_traits::{DealscopeError, FinancialStatement, Result};

    fn candidate(id: &str, cap: f64) -> Company {
        Company::new(id, id.to_uppercase(), id)
            .with_sector("Technology")
            .with_industry("Software")
            .with_market_cap(cap)
    }

    fn acquirer() -> Company {
        candidate("acq", 100.0)
    }

    fn universe() -> Vec<Company> {
        vec![
            candidate("tiny", 1.0),
            candidate("ideal", 30.0),
            candidate("edge", 7.5),
            candidate("twin", 30.0),
            candidate("huge", 500.0),
            candidate("large", 60.0),
        ]
    }

    struct FailingFor(&'static str);

    impl FinancialHistory for FailingFor {
        fn statements(&self, company_id: &str) -> Result<Vec<FinancialStatement>> {
            if company_id == self.0 {
                Err(DealscopeError::DataSource(format!("store offline for {company_id}")))
            } else {
                Ok(Vec::new())
            }
        }
    }

    fn ids(ranked: &[RankedCandidate]) -> Vec<&str> {
        ranked.iter().map(|r| r.candidate.id.as_str()).collect()
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let history: Vec<FinancialStatement> = Vec::new();
        let ranked = rank_candidates(&acquirer(), &universe(), &history, 10);

        assert_eq!(ranked.len(), 6);
        assert!(ranked.windows(2).all(|w| w[0].score() >= w[1].score()));
        // equal scores keep input order
        assert_eq!(&ids(&ranked)[..2], &["ideal", "twin"]);
        assert_eq!(ranked[0].score().to_bits(), ranked[1].score().to_bits());
    }

    #[test]
    fn test_top_k_is_prefix() {
        let history: Vec<FinancialStatement> = Vec::new();
        let all = rank_candidates(&acquirer(), &universe(), &history, usize::MAX);
        let top = rank_candidates(&acquirer(), &universe(), &history, 3);
        assert_eq!(top.len(), 3);
        assert_eq!(ids(&top), ids(&all)[..3].to_vec());
        assert!(rank_candidates(&acquirer(), &universe(), &history, 0).is_empty());
    }

    #[test]
    fn test_skips_acquirer() {
        let history: Vec<FinancialStatement> = Vec::new();
        let mut candidates = universe();
        candidates.push(acquirer());
        let ranked = rank_candidates(&acquirer(), &candidates, &history, 10);
        assert!(!ids(&ranked).contains(&"acq"));
    }

    #[test]
    fn test_failure_excludes_candidate() {
        let ranked = rank_candidates(&acquirer(), &universe(), &FailingFor("ideal"), 10);
        assert_eq!(ranked.len(), 5);
        assert!(!ids(&ranked).contains(&"ideal"));
        assert_eq!(ranked[0].candidate.id, "twin");
    }

    #[test]
    fn test_idempotent() {
        let history: Vec<FinancialStatement> = Vec::new();
        let first = rank_candidates(&acquirer(), &universe(), &history, 10);
        let second = rank_candidates(&acquirer(), &universe(), &history, 10);
        assert_eq!(ids(&first), ids(&second));
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.score().to_bits(), b.score().to_bits());
        }
    }

    #[test]
    fn test_shared_cache() {
        let history = vec![
            FinancialStatement::annual_income("ideal", 2022).with_item("Revenue", 100.0),
            FinancialStatement::annual_income("ideal", 2023).with_item("Revenue", 150.0),
        ];
        let cache = HistoryCache::new(&history);
        let ranked = rank_with_cache(&acquirer(), &universe(), &cache, 10);
        assert_eq!(cache.len(), 6);
        assert_eq!(ranked[0].candidate.id, "ideal");
        assert!(ranked[0].score() > ranked[1].score());
    }
}
