//! End-to-end DCF run over a company's statements.

use serde::{Deserialize, Serialize};

use dealscope_traits::{FinancialStatement, Result};

use super::base_fcf::estimate_base_fcf;
use super::projection::{ProjectionConfig, project_with};
use super::sensitivity::{SensitivityConfig, sensitivity_grid_with};
use super::valuator::{DcfResult, value_dcf};
use crate::confidence::score_normalized_confidence;
use crate::normalize::normalize_with_report;

/// Configuration for a full DCF run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcfConfig {
    /// Horizon and terminal growth policy.
    pub projection: ProjectionConfig,

    /// Sensitivity grid steps.
    pub sensitivity: SensitivityConfig,

    /// Whether to build the sensitivity grid (default: true)
    pub include_sensitivity: bool,
}

impl Default for DcfConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionConfig::default(),
            sensitivity: SensitivityConfig::default(),
            include_sensitivity: true,
        }
    }
}

/// Runs normalization, projection, valuation, sensitivity and confidence
/// scoring for one company.
///
/// # Example
///
/// ```
/// use dealscope_traits::FinancialStatement;
/// use dealscope_valuation::dcf::DcfModel;
///
/// let statements = vec![
///     FinancialStatement::annual_income("acme", 2023)
///         .with_item("Revenue", 1_000.0)
///         .with_item("Operating Income", 150.0),
/// ];
/// let result = DcfModel::default().run(&statements, 0.05, 0.10, Some(0.02)).unwrap();
/// assert!(result.enterprise_value > 0.0);
/// assert!(result.sensitivity_grid.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DcfModel {
    config: DcfConfig,
}

impl DcfModel {
    /// Create a model with the given configuration.
    #[must_use]
    pub const fn new(config: DcfConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &DcfConfig {
        &self.config
    }

    /// Value a company from its statements.
    ///
    /// # Arguments
    ///
    /// * `statements` - Every statement on file for the company
    /// * `growth_rate` - Nominal annual growth rate
    /// * `wacc` - Discount rate
    /// * `terminal_growth` - Overrides the configured terminal growth policy
    ///
    /// # Errors
    ///
    /// Returns [`dealscope_traits::DealscopeError::DiscountRateNotAboveGrowth`]
    /// when the discount rate does not exceed the resolved terminal growth,
    /// and [`dealscope_traits::DealscopeError::InvalidInput`] for non-finite
    /// rates or a zero horizon. Sparse history is not an error.
    pub fn run(
        &self,
        statements: &[FinancialStatement],
        growth_rate: f64,
        wacc: f64,
        terminal_growth: Option<f64>,
    ) -> Result<DcfResult> {
        let projection_config = terminal_growth.map_or(self.config.projection, |tg| {
            self.config.projection.with_terminal_growth(tg)
        });

        let normalization = normalize_with_report(statements);
        let base = estimate_base_fcf(&normalization.years);
        let projection = project_with(&base, growth_rate, &projection_config)?;
        let tg = projection.growth_assumptions.terminal_growth;

        let mut result = value_dcf(&projection, wacc, tg)?;
        if self.config.include_sensitivity {
            let grid = sensitivity_grid_with(
                &base,
                growth_rate,
                wacc,
                &self.config.sensitivity,
                &projection_config,
            )?;
            result = result.with_sensitivity(grid);
        }
        result = result.with_confidence(score_normalized_confidence(
            statements,
            &normalization,
            growth_rate,
            wacc,
        ));

        result.provenance.statement_years =
            normalization.years.iter().map(|y| y.fiscal_year).collect();
        result.provenance.skipped_fields = normalization.skipped_fields;

        tracing::debug!(
            years = base.years_used,
            base_fcf = base.base_fcf,
            enterprise_value = result.enterprise_value,
            confidence = result.confidence,
            "dcf valuation complete"
        );

        Ok(result)
    }
}
