//! Cash flow projection.
//!
//! Extends a [`BaseFcfProfile`] forward over a horizon. Growth is damped by
//! the profile's stability and decays 2% per year. Margin expands in steps
//! over the first three years. Capex runs 20% above baseline in years 1-2.

use serde::{Deserialize, Serialize};

use dealscope_traits::{DealscopeError, Result};

use super::base_fcf::BaseFcfProfile;

/// Default projection horizon in years.
pub const DEFAULT_HORIZON: usize = 5;

/// Ceiling on the per-year margin expansion step.
const MAX_MARGIN_STEP: f64 = 0.02;

/// Share of the nominal growth rate allowed to flow into margin expansion.
const MARGIN_STEP_PER_GROWTH: f64 = 0.15;

/// Years over which margin expansion phases in.
const MARGIN_PHASE_YEARS: usize = 3;

/// Years with elevated capital expenditure.
const CAPEX_CYCLE_YEARS: usize = 2;

/// Capex multiplier during the elevated years.
const CAPEX_CYCLE_UPLIFT: f64 = 1.2;

/// Annual decay of the compounding growth rate.
const GROWTH_DECAY: f64 = 0.02;

/// How the terminal growth rate of a projection is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "rate")]
pub enum TerminalGrowth {
    /// Half of the initial effective growth.
    #[default]
    Derived,
    /// A rate supplied by the caller.
    Fixed(f64),
}

impl TerminalGrowth {
    /// Resolve against the initial effective growth of a projection.
    #[must_use]
    pub const fn resolve(&self, effective_growth: f64) -> f64 {
        match self {
            Self::Derived => effective_growth * 0.5,
            Self::Fixed(rate) => *rate,
        }
    }
}

/// Configuration for the cash flow projector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Projection horizon in years (default: 5)
    pub years: usize,

    /// Terminal growth policy (default: half of effective growth)
    pub terminal_growth: TerminalGrowth,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            years: DEFAULT_HORIZON,
            terminal_growth: TerminalGrowth::Derived,
        }
    }
}

impl ProjectionConfig {
    /// Same horizon with a caller-supplied terminal growth rate.
    #[must_use]
    pub const fn with_terminal_growth(mut self, rate: f64) -> Self {
        self.terminal_growth = TerminalGrowth::Fixed(rate);
        self
    }
}

/// The growth assumptions a projection was built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthAssumptions {
    /// Growth rate requested by the caller.
    pub nominal_growth: f64,
    /// Nominal growth damped by historical stability.
    pub initial_growth: f64,
    /// Growth rate used for the terminal value.
    pub terminal_growth: f64,
    /// Per-year margin expansion step.
    pub margin_expansion: f64,
    /// Projection horizon.
    pub years: usize,
}

/// Projected free cash flows and the trajectories behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Free cash flow per year, year 1 first. Never negative.
    pub projected_fcfs: Vec<f64>,
    /// EBIT margin per year.
    pub margin_trend: Vec<f64>,
    /// Capex ratio per year.
    pub capex_forecast: Vec<f64>,
    /// Assumption record.
    pub growth_assumptions: GrowthAssumptions,
}

impl Projection {
    /// Projection horizon.
    #[must_use]
    pub fn years(&self) -> usize {
        self.projected_fcfs.len()
    }

    /// Final projected free cash flow, if any.
    #[must_use]
    pub fn last_fcf(&self) -> Option<f64> {
        self.projected_fcfs.last().copied()
    }
}

/// Project with the default terminal growth policy.
///
/// # Arguments
///
/// * `base` - Profile from [`super::estimate_base_fcf`]
/// * `growth_rate` - Nominal annual growth rate
/// * `years` - Horizon in years
///
/// # Errors
///
/// Returns [`DealscopeError::InvalidInput`] for a zero horizon or a
/// non-finite growth rate.
///
/// # Example
///
/// ```
/// use dealscope_valuation::dcf::{project, BaseFcfProfile};
///
/// let base = BaseFcfProfile::from_base_fcf(100.0);
/// let projection = project(&base, 0.05, 5).unwrap();
/// assert_eq!(projection.projected_fcfs.len(), 5);
/// ```
pub fn project(base: &BaseFcfProfile, growth_rate: f64, years: usize) -> Result<Projection> {
    project_with(
        base,
        growth_rate,
        &ProjectionConfig {
            years,
            ..ProjectionConfig::default()
        },
    )
}

/// Project under an explicit configuration.
///
/// # Errors
///
/// Returns [`DealscopeError::InvalidInput`] for a zero horizon or a
/// non-finite growth rate.
pub fn project_with(
    base: &BaseFcfProfile,
    growth_rate: f64,
    config: &ProjectionConfig,
) -> Result<Projection> {
    if config.years == 0 {
        return Err(DealscopeError::InvalidInput(
            "projection horizon must be at least one year".to_string(),
        ));
    }
    if !growth_rate.is_finite() {
        return Err(DealscopeError::InvalidInput(format!(
            "growth rate must be finite, got {growth_rate}"
        )));
    }

    let effective_growth = growth_rate * (0.7 + 0.3 * base.stability_score);
    let margin_expansion = if base.ebit_margin > 0.0 {
        MAX_MARGIN_STEP.min(growth_rate * MARGIN_STEP_PER_GROWTH)
    } else {
        0.0
    };

    let mut projected_fcfs = Vec::with_capacity(config.years);
    let mut margin_trend = Vec::with_capacity(config.years);
    let mut capex_forecast = Vec::with_capacity(config.years);

    for year in 1..=config.years {
        let t = year as f64;
        let year_growth = effective_growth * (1.0 - GROWTH_DECAY * t);
        let grown = base.base_fcf * (1.0 + year_growth).powi(year as i32);

        let year_margin = base.ebit_margin + margin_expansion * year.min(MARGIN_PHASE_YEARS) as f64;
        let year_capex = if year <= CAPEX_CYCLE_YEARS {
            base.capex_ratio * CAPEX_CYCLE_UPLIFT
        } else {
            base.capex_ratio
        };

        let fcf = grown
            * (1.0 + (year_margin - base.ebit_margin))
            * (1.0 - (year_capex - base.capex_ratio));

        projected_fcfs.push(fcf.max(0.0));
        margin_trend.push(year_margin);
        capex_forecast.push(year_capex);
    }

    Ok(Projection {
        projected_fcfs,
        margin_trend,
        capex_forecast,
        growth_assumptions: GrowthAssumptions {
            nominal_growth: growth_rate,
            initial_growth: effective_growth,
            terminal_growth: config.terminal_growth.resolve(effective_growth),
            margin_expansion,
            years: config.years,
        },
    })
}
