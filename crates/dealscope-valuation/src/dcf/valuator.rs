//! Discounting of projected flows to an enterprise value.

use serde::{Deserialize, Serialize};

use dealscope_traits::{DealscopeError, Result, SkippedField};

use super::projection::{GrowthAssumptions, Projection};
use super::sensitivity::SensitivityGrid;
use crate::confidence::ConfidenceBreakdown;

/// Where a DCF result came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Valuation method name.
    pub method: String,
    /// Fiscal years the base profile was built from, most recent first.
    pub statement_years: Vec<i32>,
    /// Line items dropped during extraction.
    pub skipped_fields: Vec<SkippedField>,
}

/// Rates the terminal value and discounting used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    /// Discount rate.
    pub wacc: f64,
    /// Perpetuity growth rate of the terminal value.
    pub terminal_growth: f64,
    /// Growth assumptions of the underlying projection.
    pub growth: GrowthAssumptions,
}

/// Output of a discounted cash flow valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    /// Present value of projected flows plus the discounted terminal value.
    pub enterprise_value: f64,
    /// Undiscounted terminal value at the end of the horizon.
    pub terminal_value: f64,
    /// Terminal value discounted to today.
    pub pv_terminal_value: f64,
    /// Discount factor per projected year.
    pub discount_factors: Vec<f64>,
    /// Projected free cash flows, year 1 first.
    pub projected_fcfs: Vec<f64>,
    /// Rates and growth assumptions.
    pub assumptions: DcfAssumptions,
    /// Enterprise value over growth and discount rate perturbations.
    pub sensitivity_grid: Option<SensitivityGrid>,
    /// Overall confidence in `[0, 1]`; `0` until scored.
    pub confidence: f64,
    /// Confidence sub-scores, when scored.
    pub confidence_breakdown: Option<ConfidenceBreakdown>,
    /// Inputs the valuation was derived from.
    pub provenance: Provenance,
}

impl DcfResult {
    /// Attach a confidence breakdown and copy its overall score.
    #[must_use]
    pub fn with_confidence(mut self, breakdown: ConfidenceBreakdown) -> Self {
        self.confidence = breakdown.overall_confidence;
        self.confidence_breakdown = Some(breakdown);
        self
    }

    /// Attach a sensitivity grid.
    #[must_use]
    pub fn with_sensitivity(mut self, grid: SensitivityGrid) -> Self {
        self.sensitivity_grid = Some(grid);
        self
    }

    /// Share of enterprise value contributed by the terminal value.
    #[must_use]
    pub fn terminal_share(&self) -> f64 {
        if self.enterprise_value > 0.0 {
            self.pv_terminal_value / self.enterprise_value
        } else {
            0.0
        }
    }
}

/// Enterprise value of a flow series, without the result record.
///
/// # Errors
///
/// Same conditions as [`value_dcf`].
pub fn discounted_value(fcfs: &[f64], wacc: f64, terminal_growth: f64) -> Result<f64> {
    check_rates(fcfs, wacc, terminal_growth)?;
    let (pv_flows, _, pv_terminal, _) = discount(fcfs, wacc, terminal_growth);
    Ok(pv_flows + pv_terminal)
}

/// Value a projection with a perpetuity-growth terminal value.
///
/// `EV = Σ fcf_i × (1 + wacc)^-i + TV × (1 + wacc)^-N` where
/// `TV = fcf_N × (1 + g) / (wacc − g)`.
///
/// # Arguments
///
/// * `projection` - Output of [`super::project`]
/// * `wacc` - Discount rate
/// * `terminal_growth` - Perpetuity growth rate
///
/// # Errors
///
/// Returns [`DealscopeError::DiscountRateNotAboveGrowth`] when
/// `wacc <= terminal_growth`, and [`DealscopeError::InvalidInput`] for an
/// empty projection, non-finite rates or `wacc <= -1`.
///
/// # Example
///
/// ```
/// use dealscope_valuation::dcf::{project, value_dcf, BaseFcfProfile};
///
/// let projection = project(&BaseFcfProfile::from_base_fcf(100.0), 0.05, 5).unwrap();
/// let result = value_dcf(&projection, 0.10, 0.02).unwrap();
/// assert!(result.enterprise_value > 0.0);
///
/// assert!(value_dcf(&projection, 0.02, 0.02).is_err());
/// ```
pub fn value_dcf(projection: &Projection, wacc: f64, terminal_growth: f64) -> Result<DcfResult> {
    let fcfs = &projection.projected_fcfs;
    check_rates(fcfs, wacc, terminal_growth)?;

    let (pv_flows, terminal_value, pv_terminal_value, discount_factors) =
        discount(fcfs, wacc, terminal_growth);

    Ok(DcfResult {
        enterprise_value: pv_flows + pv_terminal_value,
        terminal_value,
        pv_terminal_value,
        discount_factors,
        projected_fcfs: fcfs.clone(),
        assumptions: DcfAssumptions {
            wacc,
            terminal_growth,
            growth: projection.growth_assumptions,
        },
        sensitivity_grid: None,
        confidence: 0.0,
        confidence_breakdown: None,
        provenance: Provenance {
            method: "dcf".to_string(),
            ..Provenance::default()
        },
    })
}

fn check_rates(fcfs: &[f64], wacc: f64, terminal_growth: f64) -> Result<()> {
    if fcfs.is_empty() {
        return Err(DealscopeError::InvalidInput(
            "cannot value an empty projection".to_string(),
        ));
    }
    if !wacc.is_finite() || !terminal_growth.is_finite() {
        return Err(DealscopeError::InvalidInput(format!(
            "rates must be finite, got wacc {wacc} and terminal growth {terminal_growth}"
        )));
    }
    if wacc <= terminal_growth {
        return Err(DealscopeError::DiscountRateNotAboveGrowth {
            wacc,
            terminal_growth,
        });
    }
    if wacc <= -1.0 {
        return Err(DealscopeError::InvalidInput(format!(
            "discount rate must exceed -100%, got {wacc}"
        )));
    }
    Ok(())
}

/// Returns `(pv of flows, terminal value, pv of terminal value, discount factors)`.
fn discount(fcfs: &[f64], wacc: f64, terminal_growth: f64) -> (f64, f64, f64, Vec<f64>) {
    let discount_factors: Vec<f64> = (1..=fcfs.len())
        .map(|i| (1.0 + wacc).powi(-(i as i32)))
        .collect();
    let pv_flows: f64 = fcfs
        .iter()
        .zip(&discount_factors)
        .map(|(fcf, df)| fcf * df)
        .sum();

    let last_fcf = fcfs[fcfs.len() - 1];
    let last_df = discount_factors[discount_factors.len() - 1];
    let terminal_value = last_fcf * (1.0 + terminal_growth) / (wacc - terminal_growth);

    (pv_flows, terminal_value, terminal_value * last_df, discount_factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcf::{project, BaseFcfProfile};
    use approx::assert_relative_eq;

    fn flat_projection(fcf: f64, years: usize) -> Projection {
        let mut projection = project(&BaseFcfProfile::from_base_fcf(fcf), 0.0, years).unwrap();
        projection.projected_fcfs = vec![fcf; years];
        projection
    }

    #[test]
    fn test_single_year_value() {
        let result = value_dcf(&flat_projection(100.0, 1), 0.10, 0.0).unwrap();
        assert_relative_eq!(result.discount_factors[0], 1.0 / 1.1, epsilon = 1e-12);
        assert_relative_eq!(result.terminal_value, 1000.0, epsilon = 1e-9);
        // 100/1.1 + 1000/1.1
        assert_relative_eq!(result.enterprise_value, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_discount_factors() {
        let result = value_dcf(&flat_projection(50.0, 3), 0.05, 0.01).unwrap();
        assert_eq!(result.discount_factors.len(), 3);
        assert_relative_eq!(result.discount_factors[2], 1.05_f64.powi(-3));
        assert_relative_eq!(
            result.pv_terminal_value,
            result.terminal_value * result.discount_factors[2]
        );
        assert!(result.terminal_share() > 0.5);
    }

    #[test]
    fn test_rejects_wacc_not_above_growth() {
        let projection = flat_projection(100.0, 5);
        for (wacc, tg) in [(0.02, 0.02), (0.01, 0.03)] {
            let err = value_dcf(&projection, wacc, tg).unwrap_err();
            assert!(matches!(err, DealscopeError::DiscountRateNotAboveGrowth { .. }));
            assert!(err.is_domain_violation());
        }
    }

    #[test]
    fn test_rejects_invalid_input() {
        let mut empty = flat_projection(100.0, 1);
        empty.projected_fcfs.clear();
        assert!(matches!(
            value_dcf(&empty, 0.1, 0.02),
            Err(DealscopeError::InvalidInput(_))
        ));
        assert!(matches!(
            value_dcf(&flat_projection(1.0, 2), f64::NAN, 0.02),
            Err(DealscopeError::InvalidInput(_))
        ));
        assert!(matches!(
            value_dcf(&flat_projection(1.0, 2), -1.0, -2.0),
            Err(DealscopeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let projection = project(&BaseFcfProfile::from_base_fcf(123.4), 0.07, 5).unwrap();
        let a = value_dcf(&projection, 0.095, 0.025).unwrap();
        let b = value_dcf(&projection, 0.095, 0.025).unwrap();
        assert_eq!(a.enterprise_value.to_bits(), b.enterprise_value.to_bits());
        assert_relative_eq!(
            discounted_value(&projection.projected_fcfs, 0.095, 0.025).unwrap(),
            a.enterprise_value
        );
    }

    #[test]
    fn test_unscored_defaults() {
        let result = value_dcf(&flat_projection(10.0, 2), 0.1, 0.02).unwrap();
        assert_relative_eq!(result.confidence, 0.0);
        assert!(result.confidence_breakdown.is_none());
        assert!(result.sensitivity_grid.is_none());
        assert_eq!(result.provenance.method, "dcf");
    }
}
