//! Statement normalization.
//!
//! Turns raw income statements into a stable per-year set of the line items
//! the free cash flow build needs. A year whose revenue is not positive is
//! dropped silently: that is a data-quality gate, not an error.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use dealscope_traits::{Extraction, FinancialStatement, Metric, SkippedField};

/// Number of most recent fiscal years the normalizer reads.
pub const MAX_NORMALIZED_YEARS: usize = 3;

/// Line items of one fiscal year, read from an income statement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedYear {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Revenue, always positive.
    pub revenue: f64,
    /// Operating income.
    pub ebit: f64,
    /// Depreciation and amortization.
    pub depreciation: f64,
    /// Capital expenditure, sign-normalized to positive.
    pub capex: f64,
    /// Change in net working capital.
    pub net_working_capital_change: f64,
}

impl NormalizedYear {
    /// Unlevered free cash flow: `EBIT × (1 − tax) + D&A − CapEx − ΔNWC`.
    #[must_use]
    pub fn unlevered_fcf(&self, tax_rate: f64) -> f64 {
        self.ebit * (1.0 - tax_rate) + self.depreciation - self.capex - self.net_working_capital_change
    }

    /// Operating margin.
    #[must_use]
    pub fn ebit_margin(&self) -> f64 {
        self.ebit / self.revenue
    }

    /// Capital expenditure as a share of revenue.
    #[must_use]
    pub fn capex_ratio(&self) -> f64 {
        self.capex / self.revenue
    }
}

/// Normalized years plus what was left out along the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    /// Included years, most recent first.
    pub years: Vec<NormalizedYear>,
    /// Years read but dropped for non-positive or missing revenue.
    pub dropped_years: Vec<i32>,
    /// Line items that matched a metric but could not be parsed.
    pub skipped_fields: Vec<SkippedField>,
}

/// The most recent annual income statements of one company, newest first.
///
/// Statements sharing a [`FinancialStatement::key`] count once; the first
/// one listed wins.
#[must_use]
pub fn recent_income_statements(statements: &[FinancialStatement]) -> Vec<&FinancialStatement> {
    let mut income: Vec<&FinancialStatement> =
        statements.iter().filter(|s| s.is_annual_income()).collect();
    income.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year));
    let mut seen = HashSet::new();
    income.retain(|s| seen.insert(s.key()));
    income.truncate(MAX_NORMALIZED_YEARS);
    income
}

/// Normalize statements and report dropped years and skipped fields.
#[must_use]
pub fn normalize_with_report(statements: &[FinancialStatement]) -> Normalization {
    let mut normalization = Normalization::default();

    for statement in recent_income_statements(statements) {
        let extraction = Extraction::from_statement(statement);
        normalization.skipped_fields.extend(extraction.skipped.iter().cloned());

        let revenue = extraction.get_or_zero(Metric::Revenue);
        if revenue <= 0.0 {
            tracing::debug!(
                company_id = statement.company_id.as_str(),
                fiscal_year = statement.fiscal_year,
                "dropping statement without positive revenue"
            );
            normalization.dropped_years.push(statement.fiscal_year);
            continue;
        }

        normalization.years.push(NormalizedYear {
            fiscal_year: statement.fiscal_year,
            revenue,
            ebit: extraction.get_or_zero(Metric::OperatingIncome),
            depreciation: extraction.get_or_zero(Metric::DepreciationAmortization),
            capex: extraction.get_or_zero(Metric::CapitalExpenditure).abs(),
            net_working_capital_change: extraction.get_or_zero(Metric::ChangeInWorkingCapital),
        });
    }

    normalization
}

/// Normalize the three most recent annual income statements.
///
/// Output is most recent first and may be empty.
#[must_use]
pub fn normalize(statements: &[FinancialStatement]) -> Vec<NormalizedYear> {
    normalize_with_report(statements).years
}
