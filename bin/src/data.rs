//! Dataset loading for the dealscope CLI.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::Deserialize;

use dealscope::{Company, FinancialStatement, MarketData, MarketSnapshot};

/// Local dataset the CLI operates on.
///
/// ```json
/// { "companies": [...], "statements": [...], "market": [...] }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Dataset {
    pub(crate) companies: Vec<Company>,
    pub(crate) statements: Vec<FinancialStatement>,
    pub(crate) market: Vec<MarketSnapshot>,
}

impl Dataset {
    /// Read a dataset from a JSON file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid dataset {}", path.display()))
    }

    /// Parse a dataset from JSON text.
    pub(crate) fn from_json(json: &str) -> Result<Self> {
        let mut dataset: Self = serde_json::from_str(json)?;
        dataset.fill_market_caps();
        Ok(dataset)
    }

    /// Give companies without a market cap the one of their latest snapshot.
    fn fill_market_caps(&mut self) {
        for company in &mut self.companies {
            if company.positive_market_cap().is_some() {
                continue;
            }
            company.market_cap = self
                .market
                .iter()
                .filter(|s| s.ticker.eq_ignore_ascii_case(&company.ticker))
                .filter(|s| s.market_cap.is_some())
                .max_by_key(|s| s.as_of)
                .and_then(|s| s.market_cap)
                .or(company.market_cap);
        }
    }

    /// Find a company by id or ticker (case-insensitive).
    pub(crate) fn company(&self, key: &str) -> Result<&Company> {
        self.companies
            .iter()
            .find(|c| c.id == key)
            .or_else(|| {
                self.companies
                    .iter()
                    .find(|c| c.ticker.eq_ignore_ascii_case(key))
            })
            .ok_or_else(|| anyhow!("Unknown company: {key}"))
    }

    /// Resolve a list of keys, or every company except `exclude` when empty.
    pub(crate) fn companies_or_all(&self, keys: &[String], exclude: &str) -> Result<Vec<Company>> {
        if keys.is_empty() {
            return Ok(self
                .companies
                .iter()
                .filter(|c| c.id != exclude)
                .cloned()
                .collect());
        }
        keys.iter()
            .map(|key| self.company(key).cloned())
            .collect()
    }

    /// Columnar market data, optionally pinned to a date.
    pub(crate) fn market_data(&self, as_of: Option<NaiveDate>) -> Result<MarketData> {
        let market = MarketData::from_snapshots(&self.market)?;
        Ok(match as_of {
            Some(date) => market.with_as_of(date),
            None => market,
        })
    }
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {date_str}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use dealscope::MarketDataSource;

    const DATASET: &str = r#"{
        "companies": [
            { "id": "acq", "ticker": "ACQ", "name": "Acquirer", "sector": "Technology", "market_cap": 1000.0 },
            { "id": "tgt", "ticker": "TGT", "name": "Target", "sector": "Technology" }
        ],
        "statements": [],
        "market": [
            { "ticker": "TGT", "as_of": "2023-12-29", "market_cap": 250.0, "enterprise_value": 300.0 },
            { "ticker": "TGT", "as_of": "2024-06-28", "market_cap": 280.0, "enterprise_value": 320.0 }
        ]
    }"#;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("invalid").is_err());
    }

    #[test]
    fn test_lookup_and_market_cap_fill() {
        let dataset = Dataset::from_json(DATASET).unwrap();
        assert_eq!(dataset.company("tgt").unwrap().market_cap, Some(280.0));
        assert_eq!(dataset.company("acq").unwrap().name, "Acquirer");
        assert!(dataset.company("nope").is_err());

        let others = dataset.companies_or_all(&[], "acq").unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].id, "tgt");
    }

    #[test]
    fn test_market_data_as_of() {
        let dataset = Dataset::from_json(DATASET).unwrap();
        let latest = dataset.market_data(None).unwrap();
        let snapshot = latest.snapshot("TGT").unwrap().unwrap();
        assert_eq!(snapshot.enterprise_value, Some(320.0));

        let pinned = dataset
            .market_data(Some(parse_date("2024-01-31").unwrap()))
            .unwrap();
        let snapshot = pinned.snapshot("TGT").unwrap().unwrap();
        assert_eq!(snapshot.enterprise_value, Some(300.0));
    }
}
