//! Base free cash flow profile.

use serde::{Deserialize, Serialize};

use dealscope_traits::stats::{mean, stability};

use crate::normalize::NormalizedYear;

/// Flat statutory tax rate applied to EBIT. Not company-specific.
pub const STATUTORY_TAX_RATE: f64 = 0.25;

/// Averaged free cash flow profile of a company's recent history.
///
/// Margins and ratios are computed from the multi-year averages
/// (`avg_ebit / avg_revenue`), not as averages of yearly ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseFcfProfile {
    /// Average unlevered free cash flow, floored at zero.
    pub base_fcf: f64,
    /// Operating margin.
    pub ebit_margin: f64,
    /// Capital expenditure as a share of revenue.
    pub capex_ratio: f64,
    /// Free cash flow as a share of revenue. May be negative.
    pub fcf_margin: f64,
    /// `1` for constant flows, falling toward `0` as FCF dispersion grows.
    pub stability_score: f64,
    /// Number of normalized years averaged.
    pub years_used: usize,
}

impl BaseFcfProfile {
    /// A profile with only a base free cash flow, used for what-if runs.
    #[must_use]
    pub const fn from_base_fcf(base_fcf: f64) -> Self {
        Self {
            base_fcf,
            ebit_margin: 0.0,
            capex_ratio: 0.0,
            fcf_margin: 0.0,
            stability_score: 0.0,
            years_used: 0,
        }
    }

    /// Whether the profile was built from at least one year of data.
    #[must_use]
    pub const fn has_history(&self) -> bool {
        self.years_used > 0
    }
}

/// Average normalized years into a base profile.
///
/// With no years every field is zero. A negative average FCF reports as a
/// zero `base_fcf` while `fcf_margin` keeps the sign.
///
/// # Example
///
/// ```
/// use dealscope_valuation::dcf::estimate_base_fcf;
///
/// let profile = estimate_base_fcf(&[]);
/// assert_eq!(profile.base_fcf, 0.0);
/// assert_eq!(profile.stability_score, 0.0);
/// ```
#[must_use]
pub fn estimate_base_fcf(years: &[NormalizedYear]) -> BaseFcfProfile {
    if years.is_empty() {
        return BaseFcfProfile::default();
    }

    let fcfs: Vec<f64> = years
        .iter()
        .map(|y| y.unlevered_fcf(STATUTORY_TAX_RATE))
        .collect();
    let avg_revenue = mean(&years.iter().map(|y| y.revenue).collect::<Vec<_>>());
    let avg_ebit = mean(&years.iter().map(|y| y.ebit).collect::<Vec<_>>());
    let avg_capex = mean(&years.iter().map(|y| y.capex).collect::<Vec<_>>());
    let avg_fcf = mean(&fcfs);

    // Normalized years always carry positive revenue.
    let ratio = |value: f64| if avg_revenue > 0.0 { value / avg_revenue } else { 0.0 };

    BaseFcfProfile {
        base_fcf: avg_fcf.max(0.0),
        ebit_margin: ratio(avg_ebit),
        capex_ratio: ratio(avg_capex),
        fcf_margin: ratio(avg_fcf),
        stability_score: stability(&fcfs),
        years_used: years.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn year(fiscal_year: i32, revenue: f64, ebit: f64) -> NormalizedYear {
        NormalizedYear {
            fiscal_year,
            revenue,
            ebit,
            depreciation: 10.0,
            capex: 20.0,
            net_working_capital_change: 0.0,
        }
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        assert_eq!(estimate_base_fcf(&[]), BaseFcfProfile::default());
        assert!(!BaseFcfProfile::default().has_history());
    }

    #[test]
    fn test_constant_flows_are_fully_stable() {
        let years = vec![year(2023, 1000.0, 100.0), year(2022, 1000.0, 100.0)];
        let profile = estimate_base_fcf(&years);
        // 100 * 0.75 + 10 - 20
        assert_relative_eq!(profile.base_fcf, 65.0);
        assert_relative_eq!(profile.ebit_margin, 0.1);
        assert_relative_eq!(profile.capex_ratio, 0.02);
        assert_relative_eq!(profile.fcf_margin, 0.065);
        assert_relative_eq!(profile.stability_score, 1.0);
        assert_eq!(profile.years_used, 2);
    }

    #[test]
    fn test_single_year_has_zero_stability() {
        let profile = estimate_base_fcf(&[year(2023, 1000.0, 100.0)]);
        assert_relative_eq!(profile.stability_score, 0.0);
        assert!(profile.base_fcf > 0.0);
    }

    #[test]
    fn test_margins_are_ratio_of_averages() {
        let years = vec![year(2023, 3000.0, 300.0), year(2022, 1000.0, 0.0)];
        let profile = estimate_base_fcf(&years);
        // avg ebit 150 / avg revenue 2000
        assert_relative_eq!(profile.ebit_margin, 0.075);
    }

    #[test]
    fn test_negative_fcf_floors_at_zero() {
        let years = vec![year(2023, 1000.0, -200.0), year(2022, 1000.0, -100.0)];
        let profile = estimate_base_fcf(&years);
        assert_relative_eq!(profile.base_fcf, 0.0);
        assert!(profile.fcf_margin < 0.0);
        assert!((0.0..=1.0).contains(&profile.stability_score));
    }

    #[test]
    fn test_volatile_flows_degrade_stability() {
        let years = vec![
            year(2023, 1000.0, 400.0),
            year(2022, 1000.0, 20.0),
            year(2021, 1000.0, 100.0),
        ];
        let profile = estimate_base_fcf(&years);
        assert!(profile.stability_score < 0.5);
        assert!(profile.stability_score >= 0.0);
    }
}
