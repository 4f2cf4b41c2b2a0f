//! Core data model shared across the dealscope crates.
//!
//! These records are produced by the ingestion pipeline and read by the
//! engine. Nothing here is mutated after construction.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DealscopeError, Result};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// Identifier of a company in the persistence store.
pub type CompanyId = String;

/// Kind of financial statement a record was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementType {
    /// Income statement.
    #[serde(alias = "income_statement")]
    Income,
    /// Balance sheet.
    #[serde(alias = "balance_sheet")]
    Balance,
    /// Cash flow statement.
    #[serde(alias = "cash_flow")]
    Cashflow,
}

impl StatementType {
    /// The canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Balance => "balance",
            Self::Cashflow => "cashflow",
        }
    }
}

impl FromStr for StatementType {
    type Err = DealscopeError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        if lower.starts_with("income") {
            Ok(Self::Income)
        } else if lower.starts_with("balance") {
            Ok(Self::Balance)
        } else if lower.starts_with("cash") {
            Ok(Self::Cashflow)
        } else {
            Err(DealscopeError::InvalidInput(format!(
                "Unknown statement type: {s}"
            )))
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting period of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingPeriod {
    /// Annual reports (10-K filings).
    #[default]
    Annual,
    /// Quarterly reports (10-Q filings).
    #[serde(alias = "quarter")]
    Quarterly,
}

/// A raw line-item value as ingested.
///
/// Providers are loosely typed: a value may arrive as a number, as text
/// such as `"1,200"` or `"(300)"`, or as null. Parsing happens once during
/// extraction; see [`LineItemValue::as_f64`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineItemValue {
    /// A numeric value.
    Number(f64),
    /// A textual value that may or may not parse as a number.
    Text(String),
    /// An explicit null.
    Missing,
}

impl LineItemValue {
    /// Coerce the value to a finite number.
    ///
    /// Accepts thousands separators, a leading currency sign, and accounting
    /// parentheses for negatives. Returns `None` for anything else,
    /// including non-finite numbers.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => v.is_finite().then_some(*v),
            Self::Text(raw) => {
                let trimmed = raw.trim();
                let (negative, body) = match trimmed
                    .strip_prefix('(')
                    .and_then(|s| s.strip_suffix(')'))
                {
                    Some(inner) => (true, inner),
                    None => (false, trimmed),
                };
                let cleaned: String = body
                    .chars()
                    .filter(|c| !matches!(c, ',' | '$' | ' ' | '_'))
                    .collect();
                let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
                Some(if negative { -value } else { value })
            }
            Self::Missing => None,
        }
    }
}

impl From<f64> for LineItemValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for LineItemValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A financial statement for one company and one reporting period.
///
/// Uniquely identified by [`FinancialStatement::key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    /// Owning company.
    pub company_id: CompanyId,
    /// Statement kind.
    pub statement_type: StatementType,
    /// Reporting period.
    #[serde(default)]
    pub period: ReportingPeriod,
    /// Fiscal year the statement covers.
    pub fiscal_year: i32,
    /// Fiscal quarter for quarterly statements.
    #[serde(default)]
    pub fiscal_quarter: Option<u8>,
    /// Line items keyed by the provider's field name.
    #[serde(default)]
    pub line_items: BTreeMap<String, LineItemValue>,
}

/// Unique key of a statement: company, type, period, year, quarter.
pub type StatementKey = (CompanyId, StatementType, ReportingPeriod, i32, Option<u8>);

impl FinancialStatement {
    /// Create an empty statement.
    #[must_use]
    pub fn new(
        company_id: impl Into<CompanyId>,
        statement_type: StatementType,
        period: ReportingPeriod,
        fiscal_year: i32,
    ) -> Self {
        Self {
            company_id: company_id.into(),
            statement_type,
            period,
            fiscal_year,
            fiscal_quarter: None,
            line_items: BTreeMap::new(),
        }
    }

    /// Create an empty annual income statement.
    #[must_use]
    pub fn annual_income(company_id: impl Into<CompanyId>, fiscal_year: i32) -> Self {
        Self::new(
            company_id,
            StatementType::Income,
            ReportingPeriod::Annual,
            fiscal_year,
        )
    }

    /// Add a line item, returning the statement.
    #[must_use]
    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<LineItemValue>) -> Self {
        self.line_items.insert(key.into(), value.into());
        self
    }

    /// Set the fiscal quarter, returning the statement.
    #[must_use]
    pub const fn with_quarter(mut self, quarter: u8) -> Self {
        self.fiscal_quarter = Some(quarter);
        self
    }

    /// The identity of this statement.
    #[must_use]
    pub fn key(&self) -> StatementKey {
        (
            self.company_id.clone(),
            self.statement_type,
            self.period,
            self.fiscal_year,
            self.fiscal_quarter,
        )
    }

    /// Whether this is an annual income statement.
    #[must_use]
    pub fn is_annual_income(&self) -> bool {
        self.statement_type == StatementType::Income && self.period == ReportingPeriod::Annual
    }
}

/// A company as known to the persistence store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Store identifier.
    pub id: CompanyId,
    /// Ticker symbol.
    pub ticker: String,
    /// Display name.
    pub name: String,
    /// Sector classification.
    #[serde(default)]
    pub sector: Option<String>,
    /// Industry classification within the sector.
    #[serde(default)]
    pub industry: Option<String>,
    /// Market capitalization in reporting currency.
    #[serde(default)]
    pub market_cap: Option<f64>,
}

impl Company {
    /// Create a company without classification or size data.
    #[must_use]
    pub fn new(
        id: impl Into<CompanyId>,
        ticker: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            ticker: ticker.into(),
            name: name.into(),
            sector: None,
            industry: None,
            market_cap: None,
        }
    }

    /// Set the sector, returning the company.
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Set the industry, returning the company.
    #[must_use]
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Set the market capitalization, returning the company.
    #[must_use]
    pub const fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    /// Market capitalization if it is known, finite and positive.
    #[must_use]
    pub fn positive_market_cap(&self) -> Option<f64> {
        self.market_cap.filter(|c| c.is_finite() && *c > 0.0)
    }
}

/// Point-in-time market data for one ticker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Ticker symbol.
    pub ticker: String,
    /// Date the snapshot was taken.
    #[serde(default)]
    pub as_of: Option<Date>,
    /// Last close price.
    #[serde(default)]
    pub price: Option<f64>,
    /// Last session volume.
    #[serde(default)]
    pub volume: Option<f64>,
    /// Market capitalization.
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Enterprise value.
    #[serde(default)]
    pub enterprise_value: Option<f64>,
}

impl MarketSnapshot {
    /// Enterprise value if it is known, finite and positive.
    #[must_use]
    pub fn usable_enterprise_value(&self) -> Option<f64> {
        self.enterprise_value.filter(|v| v.is_finite() && *v > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_parsing() {
        assert_eq!(LineItemValue::Number(12.5).as_f64(), Some(12.5));
        assert_eq!(LineItemValue::from("1,200").as_f64(), Some(1200.0));
        assert_eq!(LineItemValue::from("(300)").as_f64(), Some(-300.0));
        assert_eq!(LineItemValue::from("$ 4.5").as_f64(), Some(4.5));
        assert_eq!(LineItemValue::from("n/a").as_f64(), None);
        assert_eq!(LineItemValue::Number(f64::NAN).as_f64(), None);
        assert_eq!(LineItemValue::Missing.as_f64(), None);
    }

    #[test]
    fn test_line_item_deserialize_untagged() {
        let items: BTreeMap<String, LineItemValue> =
            serde_json::from_str(r#"{"Revenue": 10.0, "EBITDA": "2,000", "Other": null}"#)
                .unwrap();
        assert_eq!(items["Revenue"], LineItemValue::Number(10.0));
        assert_eq!(items["EBITDA"], LineItemValue::Text("2,000".to_string()));
        assert_eq!(items["Other"], LineItemValue::Missing);
    }

    #[test]
    fn test_statement_type_parsing() {
        assert_eq!("Income Statement".parse::<StatementType>().unwrap(), StatementType::Income);
        assert_eq!("cash_flow".parse::<StatementType>().unwrap(), StatementType::Cashflow);
        assert!("ratios".parse::<StatementType>().is_err());

        let parsed: StatementType = serde_json::from_str(r#""income_statement""#).unwrap();
        assert_eq!(parsed, StatementType::Income);
    }

    #[test]
    fn test_statement_key_and_builder() {
        let statement = FinancialStatement::annual_income("c1", 2023)
            .with_item("Revenue", 100.0)
            .with_quarter(4);
        assert!(statement.is_annual_income());
        assert_eq!(
            statement.key(),
            (
                "c1".to_string(),
                StatementType::Income,
                ReportingPeriod::Annual,
                2023,
                Some(4)
            )
        );
    }

    #[test]
    fn test_statement_deserialize_defaults() {
        let statement: FinancialStatement = serde_json::from_str(
            r#"{"company_id": "c1", "statement_type": "income", "fiscal_year": 2022}"#,
        )
        .unwrap();
        assert_eq!(statement.period, ReportingPeriod::Annual);
        assert!(statement.line_items.is_empty());
        assert!(statement.fiscal_quarter.is_none());
    }

    #[test]
    fn test_company_market_cap() {
        let company = Company::new("c1", "AAPL", "Apple Inc").with_market_cap(2.5e12);
        assert_eq!(company.positive_market_cap(), Some(2.5e12));

        let unknown = Company::new("c2", "XYZ", "Unknown Corp");
        assert_eq!(unknown.positive_market_cap(), None);

        let negative = Company::new("c3", "NEG", "Negative").with_market_cap(-1.0);
        assert_eq!(negative.positive_market_cap(), None);
    }

    #[test]
    fn test_snapshot_enterprise_value() {
        let snapshot = MarketSnapshot {
            ticker: "MSFT".to_string(),
            enterprise_value: Some(0.0),
            ..Default::default()
        };
        assert_eq!(snapshot.usable_enterprise_value(), None);
    }
}
