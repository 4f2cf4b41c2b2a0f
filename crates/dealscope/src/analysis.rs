//! Full analysis of one acquirer/target pair.

use serde::{Deserialize, Serialize};

use dealscope_pairing::{CompatibilityScore, HistoryCache, PairScorer, WeightedPairScorer};
use dealscope_traits::{Company, DealscopeError, FinancialHistory, MarketDataSource, Result};
use dealscope_valuation::{
    CompsResult, CompsValuator, DcfModel, DcfResult, EnsembleValuation, MethodEstimate, blend,
};

use crate::config::EngineConfig;

/// Everything computed for one deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealAnalysis {
    /// Acquirer/target compatibility.
    pub compatibility: CompatibilityScore,
    /// Discount rate the DCF was run at.
    pub discount_rate: f64,
    /// DCF valuation of the target, with confidence and sensitivity grid.
    pub dcf: DcfResult,
    /// Comparable multiples valuation, when peers were usable.
    pub comps: Option<CompsResult>,
    /// Why comps are missing, when they are.
    pub comps_unavailable: Option<String>,
    /// Blend of every available method.
    pub ensemble: EnsembleValuation,
}

impl DealAnalysis {
    /// Blended enterprise value of the target.
    #[must_use]
    pub const fn enterprise_value(&self) -> f64 {
        self.ensemble.enterprise_value
    }
}

/// Assembles pair scoring, DCF, comps and the ensemble blend for a deal.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use dealscope::{DealAnalyzer, EngineConfig};
/// use dealscope_traits::{Company, FinancialStatement, MarketSnapshot};
///
/// let acquirer = Company::new("acq", "ACQ", "Acquirer").with_sector("Technology").with_market_cap(1_000.0);
/// let target = Company::new("tgt", "TGT", "Target").with_sector("Technology").with_market_cap(200.0);
/// let statements = vec![
///     FinancialStatement::annual_income("tgt", 2023)
///         .with_item("Revenue", 100.0)
///         .with_item("Operating Income", 15.0),
/// ];
/// let market: HashMap<String, MarketSnapshot> = HashMap::new();
///
/// let analysis = DealAnalyzer::new(EngineConfig::default())
///     .analyze(&acquirer, &target, &[], &statements, &market)
///     .unwrap();
/// assert!(analysis.comps.is_none());
/// assert!(analysis.enterprise_value() > 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DealAnalyzer {
    config: EngineConfig,
}

impl DealAnalyzer {
    /// Create an analyzer with the given configuration.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a deal from the engine's own methods.
    ///
    /// # Errors
    ///
    /// See [`DealAnalyzer::analyze_with_precedent`].
    pub fn analyze(
        &self,
        acquirer: &Company,
        target: &Company,
        peers: &[Company],
        history: &dyn FinancialHistory,
        market: &dyn MarketDataSource,
    ) -> Result<DealAnalysis> {
        self.analyze_with_precedent(acquirer, target, peers, history, market, None)
    }

    /// Analyze a deal, blending in a precedent transactions estimate when
    /// the caller has one.
    ///
    /// A target without usable comparables is not an error: the reason is
    /// recorded in [`DealAnalysis::comps_unavailable`] and the ensemble is
    /// built from the remaining methods.
    ///
    /// # Errors
    ///
    /// Returns [`DealscopeError::DiscountRateNotAboveGrowth`] when the
    /// configured rates make the DCF undefined, and propagates data source
    /// failures.
    pub fn analyze_with_precedent(
        &self,
        acquirer: &Company,
        target: &Company,
        peers: &[Company],
        history: &dyn FinancialHistory,
        market: &dyn MarketDataSource,
        precedent: Option<MethodEstimate>,
    ) -> Result<DealAnalysis> {
        let cache = HistoryCache::new(history);
        let compatibility = WeightedPairScorer::new(self.config.compatibility)
            .score_pair(acquirer, target, &cache)?;

        let discount_rate = self.config.discount_rate_for(&target.ticker, market);
        let target_history = cache.get(&target.id)?;
        let dcf = DcfModel::new(self.config.dcf).run(
            &target_history.statements,
            self.config.growth_rate,
            discount_rate,
            self.config.terminal_growth,
        )?;

        let (comps, comps_unavailable) =
            match CompsValuator::new(self.config.comps).value(target, peers, history, market) {
                Ok(result) => (Some(result), None),
                Err(
                    e @ (DealscopeError::NoComparables { .. } | DealscopeError::InsufficientData(_)),
                ) => {
                    tracing::info!(target = %target.ticker, reason = %e, "comps unavailable");
                    (None, Some(e.to_string()))
                }
                Err(e) => return Err(e),
            };

        let mut estimates = vec![MethodEstimate::from(&dcf)];
        if let Some(result) = &comps {
            estimates.push(MethodEstimate::from(result));
        }
        estimates.extend(precedent);
        let ensemble = blend(&estimates, &self.config.ensemble)?;

        tracing::debug!(
            acquirer = %acquirer.id,
            target = %target.id,
            compatibility = compatibility.score,
            enterprise_value = ensemble.enterprise_value,
            "deal analysis complete"
        );

        Ok(DealAnalysis {
            compatibility,
            discount_rate,
            dcf,
            comps,
            comps_unavailable,
            ensemble,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dealscope_traits::types::Date;
    use dealscope_traits::{FinancialStatement, MarketData, MarketSnapshot};
    use dealscope_valuation::ValuationMethod;
    use std::collections::HashMap;

    fn company(id: &str, cap: f64) -> Company {
        Company::new(id, id.to_uppercase(), id)
            .with_sector("Technology")
            .with_industry("Software")
            .with_market_cap(cap)
    }

    fn income(id: &str, year: i32, revenue: f64, ebitda: f64) -> FinancialStatement {
        FinancialStatement::annual_income(id, year)
            .with_item("Revenue", revenue)
            .with_item("Operating Income", ebitda * 0.8)
            .with_item("EBITDA", ebitda)
    }

    fn snapshot(ticker: &str, ev: f64) -> MarketSnapshot {
        MarketSnapshot {
            ticker: ticker.to_string(),
            enterprise_value: Some(ev),
            ..MarketSnapshot::default()
        }
    }

    fn fixture() -> (Vec<FinancialStatement>, HashMap<String, MarketSnapshot>) {
        let statements = vec![
            income("tgt", 2022, 90.0, 18.0),
            income("tgt", 2023, 100.0, 20.0),
            income("p1", 2023, 200.0, 40.0),
            income("p2", 2023, 150.0, 25.0),
        ];
        let market = HashMap::from([
            ("P1".to_string(), snapshot("P1", 600.0)),
            ("P2".to_string(), snapshot("P2", 450.0)),
        ]);
        (statements, market)
    }

    #[test]
    fn test_full_analysis() {
        let (statements, market) = fixture();
        let analyzer = DealAnalyzer::new(EngineConfig {
            discount_rate: Some(0.10),
            ..EngineConfig::default()
        });
        let analysis = analyzer
            .analyze(
                &company("acq", 1_000.0),
                &company("tgt", 200.0),
                &[company("p1", 300.0), company("p2", 250.0)],
                &statements,
                &market,
            )
            .unwrap();

        assert_relative_eq!(analysis.discount_rate, 0.10);
        assert!(analysis.dcf.enterprise_value > 0.0);
        assert!(analysis.dcf.sensitivity_grid.is_some());
        let comps = analysis.comps.as_ref().unwrap();
        assert_eq!(comps.peer_count, 2);
        assert!(analysis.comps_unavailable.is_none());
        assert_eq!(analysis.ensemble.components.len(), 2);
        assert!(analysis.enterprise_value() > 0.0);
        assert!(analysis.compatibility.score > 0.0);
    }

    #[test]
    fn test_no_comparables_is_recorded() {
        let (statements, market) = fixture();
        let analysis = DealAnalyzer::default()
            .analyze(
                &company("acq", 1_000.0),
                &company("tgt", 200.0),
                &[],
                &statements,
                &market,
            )
            .unwrap();

        assert!(analysis.comps.is_none());
        let reason = analysis.comps_unavailable.as_ref().unwrap();
        assert!(reason.contains("TGT"));
        assert_eq!(analysis.ensemble.components.len(), 1);
        assert_relative_eq!(analysis.enterprise_value(), analysis.dcf.enterprise_value);
    }

    #[test]
    fn test_precedent_is_blended() {
        let (statements, market) = fixture();
        let precedent = MethodEstimate::new(ValuationMethod::Precedent, 500.0, 0.5);
        let analysis = DealAnalyzer::default()
            .analyze_with_precedent(
                &company("acq", 1_000.0),
                &company("tgt", 200.0),
                &[],
                &statements,
                &market,
                Some(precedent),
            )
            .unwrap();

        // dcf 0.4 and precedent 0.2 renormalize to 2/3 and 1/3
        let expected = analysis.dcf.enterprise_value * 2.0 / 3.0 + 500.0 / 3.0;
        assert_relative_eq!(analysis.enterprise_value(), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_domain_violation_propagates() {
        let (statements, market) = fixture();
        let analyzer = DealAnalyzer::new(EngineConfig {
            discount_rate: Some(0.02),
            terminal_growth: Some(0.03),
            ..EngineConfig::default()
        });
        let err = analyzer
            .analyze(
                &company("acq", 1_000.0),
                &company("tgt", 200.0),
                &[],
                &statements,
                &market,
            )
            .unwrap_err();
        assert!(err.is_domain_violation());
    }

    #[test]
    fn test_discount_rate_from_price_history() {
        let (statements, _) = fixture();
        let index_returns = [0.01, -0.015, 0.02, 0.005, -0.01, 0.012];
        let mut snapshots = Vec::new();
        for (ticker, scale) in [("SPY", 1.0), ("TGT", 1.5)] {
            let mut price = 20.0;
            for (day, r) in (1..).zip(std::iter::once(0.0).chain(index_returns)) {
                price *= 1.0 + scale * r;
                snapshots.push(MarketSnapshot {
                    ticker: ticker.to_string(),
                    as_of: Date::from_ymd_opt(2024, 2, day),
                    price: Some(price),
                    ..MarketSnapshot::default()
                });
            }
        }
        let market = MarketData::from_snapshots(&snapshots).unwrap();

        let analysis = DealAnalyzer::default()
            .analyze(
                &company("acq", 1_000.0),
                &company("tgt", 200.0),
                &[],
                &statements,
                &market,
            )
            .unwrap();

        // beta 1.5: 0.7 × (0.04 + 1.5 × 0.06) + 0.3 × 0.06 × 0.75
        assert_relative_eq!(analysis.discount_rate, 0.1045, epsilon = 1e-9);
        assert_relative_eq!(analysis.dcf.assumptions.wacc, analysis.discount_rate);
    }
}
