//! Canonical financial metrics and best-effort line-item extraction.
//!
//! Providers name the same line item differently (`"Revenue"`,
//! `"revenue"`, `"Total Revenue"`, `"totalRevenue"`). Each [`Metric`]
//! carries a fixed list of accepted spellings; a source key matches when it
//! equals one of them after lower-casing and dropping every
//! non-alphanumeric character.
//!
//! Extraction never fails. A value that cannot be coerced to a number is
//! skipped and recorded in [`Extraction::skipped`] so that downstream
//! scoring can see what was dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::FinancialStatement;

/// A canonical line item the engine knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Total revenue.
    Revenue,
    /// Operating income (EBIT).
    OperatingIncome,
    /// Depreciation and amortization.
    DepreciationAmortization,
    /// Capital expenditure. Sign varies by provider.
    CapitalExpenditure,
    /// Change in net working capital.
    ChangeInWorkingCapital,
    /// Net income.
    NetIncome,
    /// Cash flow from operations.
    OperatingCashFlow,
    /// Earnings before interest, taxes, depreciation and amortization.
    Ebitda,
}

impl Metric {
    /// Every metric, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Revenue,
        Self::OperatingIncome,
        Self::DepreciationAmortization,
        Self::CapitalExpenditure,
        Self::ChangeInWorkingCapital,
        Self::NetIncome,
        Self::OperatingCashFlow,
        Self::Ebitda,
    ];

    /// The five inputs of the unlevered free cash flow build.
    pub const FCF_INPUTS: [Self; 5] = [
        Self::Revenue,
        Self::OperatingIncome,
        Self::DepreciationAmortization,
        Self::CapitalExpenditure,
        Self::ChangeInWorkingCapital,
    ];

    /// Metrics a consistently reported income statement should carry.
    pub const REPORTING_CORE: [Self; 4] = [
        Self::Revenue,
        Self::OperatingIncome,
        Self::NetIncome,
        Self::OperatingCashFlow,
    ];

    /// Human-readable name, also the preferred source spelling.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::OperatingIncome => "Operating Income",
            Self::DepreciationAmortization => "Depreciation & Amortization",
            Self::CapitalExpenditure => "Capital Expenditure",
            Self::ChangeInWorkingCapital => "Change in Working Capital",
            Self::NetIncome => "Net Income",
            Self::OperatingCashFlow => "Operating Cash Flow",
            Self::Ebitda => "EBITDA",
        }
    }

    /// Accepted source spellings in normalized form, highest priority first.
    #[must_use]
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Revenue => &[
                "revenue",
                "totalrevenue",
                "revenues",
                "netsales",
                "sales",
            ],
            Self::OperatingIncome => &["operatingincome", "ebit", "operatingprofit"],
            Self::DepreciationAmortization => &[
                "depreciationamortization",
                "depreciationandamortization",
                "depreciation",
            ],
            Self::CapitalExpenditure => &[
                "capitalexpenditure",
                "capitalexpenditures",
                "capex",
            ],
            Self::ChangeInWorkingCapital => &[
                "changeinworkingcapital",
                "workingcapitalchange",
                "changeinnetworkingcapital",
            ],
            Self::NetIncome => &["netincome", "netearnings"],
            Self::OperatingCashFlow => &[
                "operatingcashflow",
                "cashflowfromoperations",
                "netcashprovidedbyoperatingactivities",
            ],
            Self::Ebitda => &["ebitda"],
        }
    }
}

/// Normalize a provider key for alias comparison.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A line item that matched a metric but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedField {
    /// Metric the key was matched to.
    pub metric: Metric,
    /// Key as it appeared in the statement.
    pub source_key: String,
    /// Fiscal year of the statement.
    pub fiscal_year: i32,
}

/// Result of reading canonical metrics out of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    values: BTreeMap<Metric, f64>,
    /// Fields that matched an alias but held an unparseable value.
    pub skipped: Vec<SkippedField>,
}

impl Extraction {
    /// Read every known metric from a statement.
    ///
    /// For each metric, aliases are tried in priority order; the first key
    /// whose value parses wins. Keys whose value does not parse are recorded
    /// as skipped.
    #[must_use]
    pub fn from_statement(statement: &FinancialStatement) -> Self {
        let normalized: Vec<(String, &String)> = statement
            .line_items
            .keys()
            .map(|k| (normalize_key(k), k))
            .collect();

        let mut extraction = Self::default();
        for metric in Metric::ALL {
            for alias in metric.aliases() {
                let Some((_, source_key)) =
                    normalized.iter().find(|(n, _)| n.as_str() == *alias)
                else {
                    continue;
                };
                match statement.line_items[*source_key].as_f64() {
                    Some(value) => {
                        extraction.values.insert(metric, value);
                        break;
                    }
                    None => {
                        tracing::debug!(
                            key = source_key.as_str(),
                            fiscal_year = statement.fiscal_year,
                            "skipping unparseable line item"
                        );
                        extraction.skipped.push(SkippedField {
                            metric,
                            source_key: (*source_key).clone(),
                            fiscal_year: statement.fiscal_year,
                        });
                    }
                }
            }
        }
        extraction
    }

    /// Value of a metric if present and parseable.
    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    /// Value of a metric, or zero when absent.
    #[must_use]
    pub fn get_or_zero(&self, metric: Metric) -> f64 {
        self.get(metric).unwrap_or(0.0)
    }

    /// Whether a metric was found.
    #[must_use]
    pub fn contains(&self, metric: Metric) -> bool {
        self.values.contains_key(&metric)
    }

    /// EBITDA as reported, else operating income plus D&A when both exist.
    #[must_use]
    pub fn ebitda(&self) -> Option<f64> {
        self.get(Metric::Ebitda).or_else(|| {
            Some(self.get(Metric::OperatingIncome)? + self.get(Metric::DepreciationAmortization)?)
        })
    }
}

/// Yearly values of `metric` from annual income statements, oldest first.
///
/// One value per fiscal year: when a year is reported twice, the first
/// statement in input order wins. Years where the metric is absent or
/// unparseable are left out.
#[must_use]
pub fn annual_series(statements: &[FinancialStatement], metric: Metric) -> Vec<(i32, f64)> {
    annual_series_with(statements, |extraction| extraction.get(metric))
}

/// Like [`annual_series`], reading each year through `read`.
#[must_use]
pub fn annual_series_with<F>(statements: &[FinancialStatement], read: F) -> Vec<(i32, f64)>
where
    F: Fn(&Extraction) -> Option<f64>,
{
    let mut series: Vec<(i32, f64)> = Vec::new();
    let mut seen: Vec<i32> = Vec::new();
    for statement in statements.iter().filter(|s| s.is_annual_income()) {
        if seen.contains(&statement.fiscal_year) {
            continue;
        }
        seen.push(statement.fiscal_year);
        if let Some(value) = read(&Extraction::from_statement(statement)) {
            series.push((statement.fiscal_year, value));
        }
    }
    series.sort_by_key(|(year, _)| *year);
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LineItemValue, ReportingPeriod, StatementType};

    #[test]
    fn test_annual_series() {
        let statements = vec![
            FinancialStatement::annual_income("c1", 2023).with_item("Revenue", 12.0),
            FinancialStatement::annual_income("c1", 2021).with_item("revenue", 10.0),
            FinancialStatement::annual_income("c1", 2023).with_item("Revenue", 99.0),
            FinancialStatement::annual_income("c1", 2022),
            FinancialStatement::new("c1", StatementType::Income, ReportingPeriod::Quarterly, 2022)
                .with_item("Revenue", 3.0),
            FinancialStatement::new("c1", StatementType::Balance, ReportingPeriod::Annual, 2022)
                .with_item("Revenue", 7.0),
        ];
        assert_eq!(
            annual_series(&statements, Metric::Revenue),
            vec![(2021, 10.0), (2023, 12.0)]
        );
    }

    #[test]
    fn test_annual_series_with_ebitda_fallback() {
        let statements = vec![
            FinancialStatement::annual_income("c1", 2022)
                .with_item("Operating Income", 8.0)
                .with_item("Depreciation", 2.0),
            FinancialStatement::annual_income("c1", 2023).with_item("EBITDA", 12.0),
        ];
        assert_eq!(
            annual_series_with(&statements, Extraction::ebitda),
            vec![(2022, 10.0), (2023, 12.0)]
        );
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Total Revenue"), "totalrevenue");
        assert_eq!(normalize_key("Depreciation & Amortization"), "depreciationamortization");
        assert_eq!(normalize_key("change_in_working_capital"), "changeinworkingcapital");
    }

    #[test]
    fn test_alias_resolution() {
        let statement = FinancialStatement::annual_income("c1", 2023)
            .with_item("Total Revenue", 500.0)
            .with_item("operating_income", 50.0)
            .with_item("depreciationAndAmortization", 10.0)
            .with_item("EBITDA", 61.0);
        let extraction = Extraction::from_statement(&statement);

        assert_eq!(extraction.get(Metric::Revenue), Some(500.0));
        assert_eq!(extraction.get(Metric::OperatingIncome), Some(50.0));
        assert_eq!(extraction.get(Metric::DepreciationAmortization), Some(10.0));
        assert_eq!(extraction.get(Metric::Ebitda), Some(61.0));
        assert_eq!(extraction.get(Metric::NetIncome), None);
        assert_eq!(extraction.get_or_zero(Metric::CapitalExpenditure), 0.0);
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_alias_priority() {
        let statement = FinancialStatement::annual_income("c1", 2023)
            .with_item("Sales", 1.0)
            .with_item("Revenue", 2.0);
        let extraction = Extraction::from_statement(&statement);
        assert_eq!(extraction.get(Metric::Revenue), Some(2.0));
    }

    #[test]
    fn test_unparseable_fields_are_skipped() {
        let statement = FinancialStatement::annual_income("c1", 2021)
            .with_item("Revenue", "not reported")
            .with_item("Total Revenue", "1,000")
            .with_item("Net Income", LineItemValue::Missing);
        let extraction = Extraction::from_statement(&statement);

        assert_eq!(extraction.get(Metric::Revenue), Some(1000.0));
        assert_eq!(extraction.skipped.len(), 2);
        assert_eq!(extraction.skipped[0].metric, Metric::Revenue);
        assert_eq!(extraction.skipped[0].source_key, "Revenue");
        assert_eq!(extraction.skipped[1].metric, Metric::NetIncome);
        assert!(!extraction.contains(Metric::NetIncome));
    }

    #[test]
    fn test_ebitda_fallback() {
        let statement = FinancialStatement::annual_income("c1", 2021)
            .with_item("Operating Income", 80.0)
            .with_item("Depreciation", 20.0);
        assert_eq!(Extraction::from_statement(&statement).ebitda(), Some(100.0));

        let partial = FinancialStatement::annual_income("c1", 2021).with_item("Operating Income", 80.0);
        assert_eq!(Extraction::from_statement(&partial).ebitda(), None);
    }

    #[test]
    fn test_alias_tables_are_normalized() {
        for metric in Metric::ALL {
            for alias in metric.aliases() {
                assert_eq!(&normalize_key(alias), alias, "{metric:?} alias {alias}");
            }
            assert!(metric.aliases().contains(&normalize_key(metric.label()).as_str()));
        }
    }
}
