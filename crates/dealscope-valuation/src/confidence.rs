//! DCF confidence scoring.
//!
//! Scores how far a DCF built from a set of statements can be trusted,
//! independent of the valuation numbers. Four sub-scores are combined
//! with fixed weights:
//!
//! | Sub-score | Weight | Built from |
//! |---|---|---|
//! | Data quality | 0.30 | completeness, historical depth, reporting consistency |
//! | Stability | 0.25 | base FCF stability, operating margin stability |
//! | Growth credibility | 0.25 | deviation from historical CAGR, growth vs. WACC |
//! | Risk assessment | 0.20 | WACC reasonableness, business stability |
//!
//! Every intermediate is clamped into `[0, 1]`; no input makes scoring fail.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use dealscope_traits::metrics::annual_series;
use dealscope_traits::stats::{cagr, clamp_growth, clamp_unit, stability};
use dealscope_traits::{Extraction, FinancialStatement, Metric};

use crate::dcf::estimate_base_fcf;
use crate::normalize::{Normalization, normalize_with_report};

/// Years of history needed for full depth and completeness credit.
pub const FULL_HISTORY_YEARS: f64 = 5.0;

/// Discount rate at which WACC reasonableness peaks.
pub const REFERENCE_WACC: f64 = 0.115;

/// Smallest denominator used when comparing growth to historical CAGR.
const MIN_CAGR_SCALE: f64 = 0.05;

/// Share of WACC above which a growth assumption is penalized.
const GROWTH_WACC_TOLERANCE: f64 = 0.8;

/// Weights of the four confidence sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    /// Weight of data quality.
    pub data_quality: f64,
    /// Weight of stability.
    pub stability: f64,
    /// Weight of growth credibility.
    pub growth_credibility: f64,
    /// Weight of risk assessment.
    pub risk_assessment: f64,
}

impl ConfidenceWeights {
    /// The fixed weighting used by [`score_dcf_confidence`].
    pub const FIXED: Self = Self {
        data_quality: 0.30,
        stability: 0.25,
        growth_credibility: 0.25,
        risk_assessment: 0.20,
    };

    /// Sum of the weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.data_quality + self.stability + self.growth_credibility + self.risk_assessment
    }
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Presence of the free cash flow inputs across a statement set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// `min(1, years / 5) × present_fields / 5`.
    pub score: f64,
    /// Distinct fiscal years on file.
    pub years_available: usize,
    /// Free cash flow inputs found in no statement.
    pub missing_fields: Vec<Metric>,
}

/// Intermediate measures behind the four sub-scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSubMetrics {
    /// Completeness score of the free cash flow inputs.
    pub completeness: f64,
    /// `min(1, distinct_years / 5)`.
    pub historical_depth: f64,
    /// Mean share of core metrics present per statement.
    pub reporting_consistency: f64,
    /// Stability of normalized free cash flow.
    pub fcf_stability: f64,
    /// Stability of operating margins across years with revenue.
    pub margin_stability: f64,
    /// Historical revenue CAGR, clamped to `[-0.5, 1.0]`.
    pub historical_cagr: f64,
    /// Closeness of the assumed growth to historical CAGR.
    pub growth_deviation: f64,
    /// Penalty-adjusted ratio of growth to discount rate.
    pub growth_reasonableness: f64,
    /// Closeness of the discount rate to 11.5%.
    pub wacc_reasonableness: f64,
    /// Operating margin scaled by FCF stability, capped at one.
    pub business_stability: f64,
}

/// Confidence sub-scores and their weighted total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// Data quality sub-score.
    pub data_quality: f64,
    /// Stability sub-score.
    pub stability: f64,
    /// Growth credibility sub-score.
    pub growth_credibility: f64,
    /// Risk assessment sub-score.
    pub risk_assessment: f64,
    /// Weighted sum of the four sub-scores.
    pub overall_confidence: f64,
    /// Measures the sub-scores were built from.
    pub sub_metrics: ConfidenceSubMetrics,
    /// Free cash flow inputs missing from every statement.
    pub missing_fields: Vec<Metric>,
    /// Number of line items that could not be parsed.
    pub skipped_fields: usize,
}

/// Check which free cash flow inputs a statement set carries.
#[must_use]
pub fn assess_data_completeness(statements: &[FinancialStatement]) -> CompletenessReport {
    if statements.is_empty() {
        return CompletenessReport {
            score: 0.0,
            years_available: 0,
            missing_fields: Metric::FCF_INPUTS.to_vec(),
        };
    }

    let extractions: Vec<Extraction> = statements.iter().map(Extraction::from_statement).collect();
    let missing_fields: Vec<Metric> = Metric::FCF_INPUTS
        .into_iter()
        .filter(|m| !extractions.iter().any(|e| e.contains(*m)))
        .collect();

    let years_available = distinct_years(statements);
    let present = (Metric::FCF_INPUTS.len() - missing_fields.len()) as f64;
    let score = (years_available as f64 / FULL_HISTORY_YEARS).min(1.0)
        * (present / Metric::FCF_INPUTS.len() as f64);

    CompletenessReport {
        score: clamp_unit(score),
        years_available,
        missing_fields,
    }
}

/// Score the reliability of a DCF built from `statements`.
///
/// # Arguments
///
/// * `statements` - Every statement on file for the company
/// * `growth_rate` - Growth rate the DCF assumes
/// * `wacc` - Discount rate the DCF uses
///
/// # Example
///
/// ```
/// use dealscope_valuation::confidence::score_dcf_confidence;
///
/// let empty = score_dcf_confidence(&[], 0.05, 0.10);
/// assert!((0.0..=1.0).contains(&empty.overall_confidence));
/// ```
#[must_use]
pub fn score_dcf_confidence(
    statements: &[FinancialStatement],
    growth_rate: f64,
    wacc: f64,
) -> ConfidenceBreakdown {
    score_normalized_confidence(statements, &normalize_with_report(statements), growth_rate, wacc)
}

/// [`score_dcf_confidence`] reusing a normalization of the same statements.
#[must_use]
pub fn score_normalized_confidence(
    statements: &[FinancialStatement],
    normalization: &Normalization,
    growth_rate: f64,
    wacc: f64,
) -> ConfidenceBreakdown {
    let completeness = assess_data_completeness(statements);
    let historical_depth = clamp_unit(distinct_years(statements) as f64 / FULL_HISTORY_YEARS);
    let reporting_consistency = reporting_consistency(statements);
    let data_quality =
        clamp_unit(0.4 * completeness.score + 0.3 * historical_depth + 0.3 * reporting_consistency);

    let base = estimate_base_fcf(&normalization.years);
    let fcf_stability = clamp_unit(base.stability_score);
    let margin_stability = margin_stability(statements);
    let stability_score = clamp_unit(0.5 * fcf_stability + 0.5 * margin_stability);

    let historical_cagr = historical_cagr(statements);
    let growth_deviation = clamp_unit(
        1.0 - ((growth_rate - historical_cagr).abs() / historical_cagr.abs().max(MIN_CAGR_SCALE))
            .min(1.0),
    );
    let growth_wacc_ratio = if wacc > 0.0 { growth_rate / wacc } else { 0.0 };
    let growth_reasonableness =
        clamp_unit(1.0 - (growth_wacc_ratio - GROWTH_WACC_TOLERANCE).clamp(0.0, 1.0));
    let growth_credibility = clamp_unit(0.5 * growth_deviation + 0.5 * growth_reasonableness);

    let wacc_reasonableness =
        clamp_unit(1.0 - ((wacc - REFERENCE_WACC).abs() / REFERENCE_WACC).min(1.0));
    let business_stability = clamp_unit(base.ebit_margin * (1.0 + base.stability_score));
    let risk_assessment = clamp_unit(0.5 * wacc_reasonableness + 0.5 * business_stability);

    let weights = ConfidenceWeights::FIXED;
    let overall_confidence = clamp_unit(
        weights.data_quality * data_quality
            + weights.stability * stability_score
            + weights.growth_credibility * growth_credibility
            + weights.risk_assessment * risk_assessment,
    );

    let skipped_fields = statements
        .iter()
        .map(|s| Extraction::from_statement(s).skipped.len())
        .sum();

    ConfidenceBreakdown {
        data_quality,
        stability: stability_score,
        growth_credibility,
        risk_assessment,
        overall_confidence,
        sub_metrics: ConfidenceSubMetrics {
            completeness: completeness.score,
            historical_depth,
            reporting_consistency,
            fcf_stability,
            margin_stability,
            historical_cagr,
            growth_deviation,
            growth_reasonableness,
            wacc_reasonableness,
            business_stability,
        },
        missing_fields: completeness.missing_fields,
        skipped_fields,
    }
}

fn distinct_years(statements: &[FinancialStatement]) -> usize {
    statements
        .iter()
        .map(|s| s.fiscal_year)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Mean share of [`Metric::REPORTING_CORE`] present per statement.
fn reporting_consistency(statements: &[FinancialStatement]) -> f64 {
    if statements.is_empty() {
        return 0.0;
    }
    let core = Metric::REPORTING_CORE.len() as f64;
    let total: f64 = statements
        .iter()
        .map(|s| {
            let extraction = Extraction::from_statement(s);
            Metric::REPORTING_CORE
                .iter()
                .filter(|m| extraction.contains(**m))
                .count() as f64
                / core
        })
        .sum();
    clamp_unit(total / statements.len() as f64)
}

/// Stability of operating margin over annual years with positive revenue.
fn margin_stability(statements: &[FinancialStatement]) -> f64 {
    let operating = annual_series(statements, Metric::OperatingIncome);
    let margins: Vec<f64> = annual_series(statements, Metric::Revenue)
        .into_iter()
        .filter(|(_, revenue)| *revenue > 0.0)
        .map(|(year, revenue)| {
            let ebit = operating
                .iter()
                .find(|(y, _)| *y == year)
                .map_or(0.0, |(_, v)| *v);
            ebit / revenue
        })
        .collect();
    stability(&margins)
}

/// Revenue CAGR between the first and last annual years with revenue.
fn historical_cagr(statements: &[FinancialStatement]) -> f64 {
    let revenues: Vec<(i32, f64)> = annual_series(statements, Metric::Revenue)
        .into_iter()
        .filter(|(_, revenue)| *revenue > 0.0)
        .collect();
    let (Some(first), Some(last)) = (revenues.first(), revenues.last()) else {
        return 0.0;
    };
    cagr(first.1, last.1, last.0 - first.0).map_or(0.0, clamp_growth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn statement(year: i32, revenue: f64, ebit: f64) -> FinancialStatement {
        FinancialStatement::annual_income("t", year)
            .with_item("Revenue", revenue)
            .with_item("Operating Income", ebit)
            .with_item("Depreciation & Amortization", revenue * 0.03)
            .with_item("Capital Expenditure", -revenue * 0.04)
            .with_item("Change in Working Capital", revenue * 0.01)
            .with_item("Net Income", ebit * 0.7)
            .with_item("Operating Cash Flow", ebit * 0.9)
    }

    fn history() -> Vec<FinancialStatement> {
        vec![
            statement(2023, 10_000.0, 1_500.0),
            statement(2022, 9_000.0, 1_300.0),
            statement(2021, 8_000.0, 1_150.0),
        ]
    }

    fn assert_in_unit(breakdown: &ConfidenceBreakdown) {
        for value in [
            breakdown.data_quality,
            breakdown.stability,
            breakdown.growth_credibility,
            breakdown.risk_assessment,
            breakdown.overall_confidence,
        ] {
            assert!((0.0..=1.0).contains(&value), "{value} outside [0, 1]");
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert_relative_eq!(ConfidenceWeights::FIXED.total(), 1.0);
        assert_eq!(ConfidenceWeights::default(), ConfidenceWeights::FIXED);
    }

    #[test]
    fn test_completeness() {
        let report = assess_data_completeness(&history());
        assert_eq!(report.years_available, 3);
        assert!(report.missing_fields.is_empty());
        assert_relative_eq!(report.score, 0.6);

        let sparse = vec![FinancialStatement::annual_income("t", 2023).with_item("Revenue", 5.0)];
        let report = assess_data_completeness(&sparse);
        assert_eq!(report.missing_fields.len(), 4);
        assert_relative_eq!(report.score, 0.2 * 0.2);
    }

    #[test]
    fn test_completeness_empty() {
        let report = assess_data_completeness(&[]);
        assert_relative_eq!(report.score, 0.0);
        assert_eq!(report.missing_fields, Metric::FCF_INPUTS.to_vec());
    }

    #[test]
    fn test_overall_is_weighted_sum() {
        let b = score_dcf_confidence(&history(), 0.05, 0.10);
        assert_in_unit(&b);
        assert_relative_eq!(
            b.overall_confidence,
            0.30 * b.data_quality + 0.25 * b.stability + 0.25 * b.growth_credibility + 0.20 * b.risk_assessment,
            epsilon = 1e-12
        );
        assert!(b.overall_confidence > 0.0 && b.overall_confidence < 1.0);
    }

    #[test]
    fn test_reused_normalization_matches() {
        let statements = history();
        let normalization = normalize_with_report(&statements);
        assert_eq!(
            score_normalized_confidence(&statements, &normalization, 0.05, 0.10),
            score_dcf_confidence(&statements, 0.05, 0.10)
        );
    }

    #[test]
    fn test_sub_metrics() {
        let b = score_dcf_confidence(&history(), 0.05, 0.10);
        let m = b.sub_metrics;
        assert_relative_eq!(m.historical_depth, 0.6);
        assert_relative_eq!(m.reporting_consistency, 1.0);
        // (10000 / 8000)^(1/2) - 1
        assert_relative_eq!(m.historical_cagr, 1.25_f64.sqrt() - 1.0, epsilon = 1e-12);
        assert_relative_eq!(m.growth_reasonableness, 1.0);
        assert_relative_eq!(m.wacc_reasonableness, 1.0 - 0.015 / 0.115, epsilon = 1e-12);
        assert!(m.margin_stability > 0.9);
    }

    #[test]
    fn test_empty_history_stays_in_range() {
        let b = score_dcf_confidence(&[], 0.05, 0.10);
        assert_in_unit(&b);
        assert_relative_eq!(b.data_quality, 0.0);
        assert_relative_eq!(b.stability, 0.0);
        assert_eq!(b.missing_fields.len(), 5);
    }

    #[test]
    fn test_extreme_inputs_are_clamped() {
        let spiky = vec![
            statement(2023, 1e12, 9e11),
            statement(2022, 1.0, -5e5),
            FinancialStatement::annual_income("t", 2021).with_item("Revenue", "n/a"),
        ];
        for (g, w) in [(5.0, 0.01), (-3.0, 2.0), (0.05, -0.2), (f64::NAN, 0.1), (0.05, 0.0)] {
            assert_in_unit(&score_dcf_confidence(&spiky, g, w));
        }
        let b = score_dcf_confidence(&spiky, 0.05, 0.1);
        assert_relative_eq!(b.sub_metrics.historical_cagr, 1.0);
        assert_eq!(b.skipped_fields, 1);
    }

    #[test]
    fn test_growth_above_wacc_penalized() {
        let moderate = score_dcf_confidence(&history(), 0.06, 0.10);
        let aggressive = score_dcf_confidence(&history(), 0.15, 0.10);
        assert!(aggressive.sub_metrics.growth_reasonableness < moderate.sub_metrics.growth_reasonableness);
        assert!(aggressive.growth_credibility < moderate.growth_credibility);
    }
}
