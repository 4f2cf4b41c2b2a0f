//! Sensitivity of enterprise value to growth and discount rate.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use dealscope_traits::stats::round1;
use dealscope_traits::{DealscopeError, Result};

use super::base_fcf::BaseFcfProfile;
use super::projection::{ProjectionConfig, project_with};
use super::valuator::discounted_value;

/// Perturbation offsets applied to both axes, in units of the delta.
const OFFSETS: [f64; 5] = [-2.0, -1.0, 0.0, 1.0, 2.0];

/// Index of the unperturbed row and column.
pub const CENTER: usize = 2;

/// Step sizes of the sensitivity grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    /// Growth rate step (default: 0.01)
    pub growth_delta: f64,

    /// Discount rate step (default: 0.01)
    pub wacc_delta: f64,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            growth_delta: 0.01,
            wacc_delta: 0.01,
        }
    }
}

/// 5×5 enterprise values over growth (rows) and discount rate (columns).
///
/// Values are rounded to one decimal. A cell whose discount rate does not
/// exceed its terminal growth is `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    /// Growth rate of each row.
    pub growth_rates: Vec<f64>,
    /// Discount rate of each column.
    pub wacc_rates: Vec<f64>,
    /// Enterprise values, `values[[row, col]]`.
    pub values: Array2<f64>,
}

impl SensitivityGrid {
    /// The unperturbed cell.
    #[must_use]
    pub fn center(&self) -> f64 {
        self.values[[CENTER, CENTER]]
    }

    /// Value at a growth row and discount rate column.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get([row, col]).copied()
    }

    /// Rows as nested vectors, for plain serialization.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.outer_iter().map(|row| row.to_vec()).collect()
    }
}

/// Grid with a fixed terminal growth rate.
///
/// # Arguments
///
/// * `base` - Base free cash flow profile
/// * `growth_rate` - Unperturbed growth rate
/// * `wacc` - Unperturbed discount rate
/// * `terminal_growth` - Terminal growth applied to every cell
/// * `growth_delta` - Row step
/// * `wacc_delta` - Column step
///
/// # Errors
///
/// Returns [`DealscopeError::DiscountRateNotAboveGrowth`] when the base case
/// itself is invalid.
pub fn sensitivity_grid(
    base: &BaseFcfProfile,
    growth_rate: f64,
    wacc: f64,
    terminal_growth: f64,
    growth_delta: f64,
    wacc_delta: f64,
) -> Result<SensitivityGrid> {
    sensitivity_grid_with(
        base,
        growth_rate,
        wacc,
        &SensitivityConfig {
            growth_delta,
            wacc_delta,
        },
        &ProjectionConfig::default().with_terminal_growth(terminal_growth),
    )
}

/// Grid that re-runs projection and valuation with the base case's horizon
/// and terminal growth policy at every cell.
///
/// # Errors
///
/// Returns [`DealscopeError::DiscountRateNotAboveGrowth`] when the base case
/// is invalid, and [`DealscopeError::InvalidInput`] for non-finite deltas or
/// a projection the base case cannot build.
pub fn sensitivity_grid_with(
    base: &BaseFcfProfile,
    growth_rate: f64,
    wacc: f64,
    sensitivity: &SensitivityConfig,
    projection: &ProjectionConfig,
) -> Result<SensitivityGrid> {
    if !sensitivity.growth_delta.is_finite() || !sensitivity.wacc_delta.is_finite() {
        return Err(DealscopeError::InvalidInput(
            "sensitivity deltas must be finite".to_string(),
        ));
    }

    let base_case = project_with(base, growth_rate, projection)?;
    discounted_value(
        &base_case.projected_fcfs,
        wacc,
        base_case.growth_assumptions.terminal_growth,
    )?;

    let growth_rates: Vec<f64> = OFFSETS
        .iter()
        .map(|o| growth_rate + o * sensitivity.growth_delta)
        .collect();
    let wacc_rates: Vec<f64> = OFFSETS
        .iter()
        .map(|o| wacc + o * sensitivity.wacc_delta)
        .collect();

    let mut values = Array2::from_elem((OFFSETS.len(), OFFSETS.len()), f64::NAN);
    for (row, g) in growth_rates.iter().enumerate() {
        let cell_projection = project_with(base, *g, projection)?;
        let tg = cell_projection.growth_assumptions.terminal_growth;
        for (col, w) in wacc_rates.iter().enumerate() {
            match discounted_value(&cell_projection.projected_fcfs, *w, tg) {
                Ok(ev) => values[[row, col]] = round1(ev),
                Err(err) => {
                    tracing::debug!(growth = g, wacc = w, %err, "sensitivity cell undefined");
                }
            }
        }
    }

    Ok(SensitivityGrid {
        growth_rates,
        wacc_rates,
        values,
    })
}
