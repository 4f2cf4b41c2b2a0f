//! Comparable company multiples valuation.
//!
//! Peers are filtered to the target's sector and a market capitalization
//! band around the target. For every peer with a usable enterprise value
//! and a latest annual income statement carrying positive revenue and
//! EBITDA, `EV/Revenue` and `EV/EBITDA` are computed. The medians of both
//! multiples are applied to the target's own fundamentals and blended.

use serde::{Deserialize, Serialize};

use dealscope_traits::stats::median;
use dealscope_traits::{
    Company, DealscopeError, Extraction, FinancialHistory, MarketDataSource, Metric, Result,
};

use crate::normalize::recent_income_statements;

/// Configuration for the comparable multiples valuator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompsConfig {
    /// Smallest peer market cap as a multiple of the target's (default: 0.3)
    pub min_cap_ratio: f64,

    /// Largest peer market cap as a multiple of the target's (default: 3.0)
    pub max_cap_ratio: f64,

    /// Weight of the EV/Revenue implied value (default: 0.4)
    pub revenue_weight: f64,

    /// Weight of the EV/EBITDA implied value (default: 0.6)
    pub ebitda_weight: f64,

    /// Usable peers needed for full confidence (default: 5)
    pub full_confidence_peers: usize,
}

impl Default for CompsConfig {
    fn default() -> Self {
        Self {
            min_cap_ratio: 0.3,
            max_cap_ratio: 3.0,
            revenue_weight: 0.4,
            ebitda_weight: 0.6,
            full_confidence_peers: 5,
        }
    }
}

/// Trading multiples of one usable peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerMultiple {
    /// Peer company id.
    pub company_id: String,
    /// Peer ticker.
    pub ticker: String,
    /// Peer enterprise value from market data.
    pub enterprise_value: f64,
    /// Latest annual revenue.
    pub revenue: f64,
    /// Latest annual EBITDA.
    pub ebitda: f64,
    /// `enterprise_value / revenue`.
    pub ev_revenue: f64,
    /// `enterprise_value / ebitda`.
    pub ev_ebitda: f64,
}

/// Output of a comparable multiples valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompsResult {
    /// Blended implied enterprise value.
    pub enterprise_value: f64,
    /// `min(1, peer_count / 5)`.
    pub confidence: f64,
    /// Per-peer multiples, in peer input order.
    pub multiples_used: Vec<PeerMultiple>,
    /// Target revenue times the median EV/Revenue.
    pub implied_ev_revenue: f64,
    /// Target EBITDA times the median EV/EBITDA; absent when target EBITDA
    /// is not positive.
    pub implied_ev_ebitda: Option<f64>,
    /// Median EV/Revenue across usable peers.
    pub median_ev_revenue: f64,
    /// Median EV/EBITDA across usable peers.
    pub median_ev_ebitda: f64,
    /// Number of usable peers.
    pub peer_count: usize,
}

/// Comparable multiples valuator.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use dealscope_traits::{Company, FinancialStatement, MarketSnapshot};
/// use dealscope_valuation::comps::CompsValuator;
///
/// let target = Company::new("t", "TGT", "Target").with_sector("Technology").with_market_cap(100.0);
/// let peer = Company::new("p", "PEER", "Peer").with_sector("Technology").with_market_cap(120.0);
/// let statements = vec![
///     FinancialStatement::annual_income("t", 2023).with_item("Revenue", 50.0).with_item("EBITDA", 10.0),
///     FinancialStatement::annual_income("p", 2023).with_item("Revenue", 60.0).with_item("EBITDA", 12.0),
/// ];
/// let mut market = HashMap::new();
/// market.insert(
///     "PEER".to_string(),
///     MarketSnapshot { ticker: "PEER".into(), enterprise_value: Some(180.0), ..Default::default() },
/// );
///
/// let result = CompsValuator::default()
///     .value(&target, &[peer], &statements, &market)
///     .unwrap();
/// assert_eq!(result.peer_count, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompsValuator {
    config: CompsConfig,
}

impl CompsValuator {
    /// Create a valuator with the given configuration.
    #[must_use]
    pub const fn new(config: CompsConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CompsConfig {
        &self.config
    }

    /// Whether `peer` passes the sector and market cap filters for `target`.
    ///
    /// `target_cap` of `None` disables the size band.
    #[must_use]
    pub fn is_comparable(
        &self,
        target: &Company,
        target_cap: Option<f64>,
        peer: &Company,
        peer_cap: Option<f64>,
    ) -> bool {
        if peer.id == target.id || !same_sector(target.sector.as_deref(), peer.sector.as_deref()) {
            return false;
        }
        match (target_cap, peer_cap) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(t), Some(p)) => {
                p >= self.config.min_cap_ratio * t && p <= self.config.max_cap_ratio * t
            }
        }
    }

    /// Value `target` from the trading multiples of `peers`.
    ///
    /// A peer whose market data or statements cannot be read is skipped
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`DealscopeError::NoComparables`] when no peer is usable and
    /// [`DealscopeError::InsufficientData`] when the target has no positive
    /// revenue to apply the multiples to.
    pub fn value(
        &self,
        target: &Company,
        peers: &[Company],
        history: &dyn FinancialHistory,
        market: &dyn MarketDataSource,
    ) -> Result<CompsResult> {
        let target_cap = target
            .positive_market_cap()
            .or_else(|| snapshot_cap(market, &target.ticker));

        let multiples_used: Vec<PeerMultiple> = peers
            .iter()
            .filter_map(|peer| {
                let peer_cap = peer
                    .positive_market_cap()
                    .or_else(|| snapshot_cap(market, &peer.ticker));
                if !self.is_comparable(target, target_cap, peer, peer_cap) {
                    return None;
                }
                peer_multiple(peer, history, market)
            })
            .collect();

        if multiples_used.is_empty() {
            return Err(DealscopeError::NoComparables {
                target: target.ticker.clone(),
            });
        }

        let (target_revenue, target_ebitda) = latest_fundamentals(history, &target.id)?;
        let target_revenue = target_revenue.filter(|r| *r > 0.0).ok_or_else(|| {
            DealscopeError::InsufficientData(format!(
                "{} has no positive revenue to apply multiples to",
                target.ticker
            ))
        })?;

        let revenue_multiples: Vec<f64> = multiples_used.iter().map(|m| m.ev_revenue).collect();
        let ebitda_multiples: Vec<f64> = multiples_used.iter().map(|m| m.ev_ebitda).collect();
        let median_ev_revenue = median(&revenue_multiples).unwrap_or(0.0);
        let median_ev_ebitda = median(&ebitda_multiples).unwrap_or(0.0);

        let implied_ev_revenue = target_revenue * median_ev_revenue;
        let implied_ev_ebitda = target_ebitda
            .filter(|e| *e > 0.0)
            .map(|e| e * median_ev_ebitda);

        let enterprise_value = implied_ev_ebitda.map_or(implied_ev_revenue, |ebitda_implied| {
            self.config.revenue_weight * implied_ev_revenue
                + self.config.ebitda_weight * ebitda_implied
        });

        let peer_count = multiples_used.len();
        let confidence =
            (peer_count as f64 / self.config.full_confidence_peers.max(1) as f64).min(1.0);

        tracing::debug!(
            target = target.ticker.as_str(),
            peer_count,
            median_ev_revenue,
            median_ev_ebitda,
            "comparable multiples valuation"
        );

        Ok(CompsResult {
            enterprise_value,
            confidence,
            multiples_used,
            implied_ev_revenue,
            implied_ev_ebitda,
            median_ev_revenue,
            median_ev_ebitda,
            peer_count,
        })
    }
}

/// Value `target` from `peers` with the default configuration.
///
/// # Errors
///
/// See [`CompsValuator::value`].
pub fn value_comps(
    target: &Company,
    peers: &[Company],
    history: &dyn FinancialHistory,
    market: &dyn MarketDataSource,
) -> Result<CompsResult> {
    CompsValuator::default().value(target, peers, history, market)
}

fn same_sector(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
        _ => false,
    }
}

/// Market cap from the latest snapshot; a failed lookup counts as unknown.
fn snapshot_cap(market: &dyn MarketDataSource, ticker: &str) -> Option<f64> {
    let snapshot = match market.snapshot(ticker) {
        Ok(snapshot) => snapshot?,
        Err(err) => {
            tracing::warn!(ticker, %err, "market cap lookup failed");
            return None;
        }
    };
    snapshot.market_cap.filter(|c| c.is_finite() && *c > 0.0)
}

/// Revenue and EBITDA of the most recent annual income statement.
fn latest_fundamentals(
    history: &dyn FinancialHistory,
    company_id: &str,
) -> Result<(Option<f64>, Option<f64>)> {
    let statements = history.statements(company_id)?;
    Ok(recent_income_statements(&statements)
        .first()
        .map(|s| {
            let extraction = Extraction::from_statement(s);
            (extraction.get(Metric::Revenue), extraction.ebitda())
        })
        .unwrap_or((None, None)))
}

fn peer_multiple(
    peer: &Company,
    history: &dyn FinancialHistory,
    market: &dyn MarketDataSource,
) -> Option<PeerMultiple> {
    let snapshot = match market.snapshot(&peer.ticker) {
        Ok(snapshot) => snapshot?,
        Err(err) => {
            tracing::warn!(peer = peer.ticker.as_str(), %err, "market data lookup failed");
            return None;
        }
    };
    let enterprise_value = snapshot.usable_enterprise_value()?;

    let (revenue, ebitda) = match latest_fundamentals(history, &peer.id) {
        Ok(fundamentals) => fundamentals,
        Err(err) => {
            tracing::warn!(peer = peer.ticker.as_str(), %err, "statement lookup failed");
            return None;
        }
    };
    let revenue = revenue.filter(|r| *r > 0.0)?;
    let ebitda = ebitda.filter(|e| *e > 0.0)?;

    Some(PeerMultiple {
        company_id: peer.id.clone(),
        ticker: peer.ticker.clone(),
        enterprise_value,
        revenue,
        ebitda,
        ev_revenue: enterprise_value / revenue,
        ev_ebitda: enterprise_value / ebitda,
    })
}
