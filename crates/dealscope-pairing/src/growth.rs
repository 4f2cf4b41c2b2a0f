//! Growth and profitability metrics of a company's history.

use serde::{Deserialize, Serialize};

use dealscope_traits::metrics::{annual_series, annual_series_with};
use dealscope_traits::stats::{cagr, clamp_growth};
use dealscope_traits::{Extraction, FinancialStatement, Metric};

/// Growth and margin figures read from annual income statements.
///
/// Every growth and CAGR field is clamped into `[-0.5, 1.0]`. With fewer
/// than two annual years every field is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    /// Latest year-over-year revenue growth.
    pub revenue_growth: f64,
    /// Revenue CAGR from the first to the latest year.
    pub revenue_cagr: f64,
    /// EBITDA over revenue in the latest revenue year.
    pub ebitda_margin: f64,
    /// Latest year-over-year EBITDA growth.
    pub ebitda_growth: f64,
    /// Net income over revenue in the latest year with both.
    pub net_margin: f64,
    /// Net margin change from first to last, divided by years observed.
    pub margin_trend: f64,
}

impl GrowthMetrics {
    /// Compute metrics from a company's statements.
    #[must_use]
    pub fn from_statements(statements: &[FinancialStatement]) -> Self {
        let revenue = annual_series(statements, Metric::Revenue);
        if revenue.len() < 2 {
            return Self::default();
        }

        let mut metrics = Self::default();
        let (first_year, first_rev) = revenue[0];
        let prev_rev = revenue[revenue.len() - 2].1;
        let (last_year, last_rev) = revenue[revenue.len() - 1];

        if prev_rev > 0.0 {
            metrics.revenue_growth = clamp_growth(last_rev / prev_rev - 1.0);
        }
        metrics.revenue_cagr = cagr(first_rev, last_rev, last_year - first_year).map_or(0.0, clamp_growth);

        let ebitda = annual_series_with(statements, Extraction::ebitda);
        metrics.ebitda_margin = ebitda
            .iter()
            .find(|(y, _)| *y == last_year)
            .filter(|_| last_rev > 0.0)
            .map_or(0.0, |(_, e)| e / last_rev);
        if ebitda.len() >= 2 {
            let prev = ebitda[ebitda.len() - 2].1;
            let last = ebitda[ebitda.len() - 1].1;
            if prev > 0.0 {
                metrics.ebitda_growth = clamp_growth(last / prev - 1.0);
            }
        }

        let net_income = annual_series(statements, Metric::NetIncome);
        let margins: Vec<f64> = revenue
            .iter()
            .filter(|(_, rev)| *rev > 0.0)
            .filter_map(|(year, rev)| {
                net_income
                    .iter()
                    .find(|(y, _)| y == year)
                    .map(|(_, ni)| ni / rev)
            })
            .collect();
        if margins.len() >= 2 {
            metrics.net_margin = margins[margins.len() - 1];
            metrics.margin_trend = (margins[margins.len() - 1] - margins[0]) / margins.len() as f64;
        }

        metrics
    }
}

/// Growth synergy in `[0, 1]`: `0.7 × CAGR + 0.3 × recent growth`.
///
/// Both inputs are clamped into `[-0.5, 1.0]` before combining.
#[must_use]
pub fn growth_synergy_score(target_cagr: f64, target_recent_growth: f64) -> f64 {
    let combined = 0.7 * clamp_growth(target_cagr) + 0.3 * clamp_growth(target_recent_growth);
    combined.clamp(0.0, 1.0)
}
