//! Read-only collaborator interfaces.
//!
//! The engine never performs I/O. Statements and market data are fetched by
//! the caller and exposed through these traits; implementations must be
//! thread-safe (`Send + Sync`) because candidate ranking reads them from a
//! parallel scan.

use std::collections::HashMap;

use crate::types::{CompanyId, FinancialStatement, MarketSnapshot};
use crate::Result;

/// Supplies the financial statements of a company.
///
/// An unknown company is not an error: implementations return an empty
/// history, and the engine degrades to low-confidence output. Errors are
/// reserved for a store that cannot answer at all.
///
/// # Example
///
/// ```
/// use dealscope_traits::{FinancialHistory, FinancialStatement, Result};
///
/// struct Fixed(Vec<FinancialStatement>);
///
/// impl FinancialHistory for Fixed {
///     fn statements(&self, _company_id: &str) -> Result<Vec<FinancialStatement>> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait FinancialHistory: Send + Sync {
    /// All statements on file for a company, in any order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DealscopeError::DataSource`] when the store fails.
    fn statements(&self, company_id: &str) -> Result<Vec<FinancialStatement>>;
}

/// Supplies point-in-time market data per ticker.
///
/// The provider may be unavailable; callers treat both `Ok(None)` and an
/// error as "no usable market data" for that ticker.
pub trait MarketDataSource: Send + Sync {
    /// Latest known snapshot for a ticker.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DealscopeError::DataSource`] when the provider fails.
    fn snapshot(&self, ticker: &str) -> Result<Option<MarketSnapshot>>;

    /// Dated prices for a ticker, oldest first.
    ///
    /// Providers without price history return an empty series, which leaves
    /// beta unestimated.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DealscopeError::DataSource`] when the provider fails.
    fn price_history(&self, _ticker: &str) -> Result<Vec<f64>> {
        Ok(Vec::new())
    }
}

impl FinancialHistory for HashMap<CompanyId, Vec<FinancialStatement>> {
    fn statements(&self, company_id: &str) -> Result<Vec<FinancialStatement>> {
        Ok(self.get(company_id).cloned().unwrap_or_default())
    }
}

impl FinancialHistory for [FinancialStatement] {
    fn statements(&self, company_id: &str) -> Result<Vec<FinancialStatement>> {
        Ok(self
            .iter()
            .filter(|s| s.company_id == company_id)
            .cloned()
            .collect())
    }
}

impl FinancialHistory for Vec<FinancialStatement> {
    fn statements(&self, company_id: &str) -> Result<Vec<FinancialStatement>> {
        self.as_slice().statements(company_id)
    }
}

impl MarketDataSource for HashMap<String, MarketSnapshot> {
    fn snapshot(&self, ticker: &str) -> Result<Option<MarketSnapshot>> {
        Ok(self.get(ticker).cloned())
    }
}

impl<T: FinancialHistory + ?Sized> FinancialHistory for &T {
    fn statements(&self, company_id: &str) -> Result<Vec<FinancialStatement>> {
        (**self).statements(company_id)
    }
}

impl<T: MarketDataSource + ?Sized> MarketDataSource for &T {
    fn snapshot(&self, ticker: &str) -> Result<Option<MarketSnapshot>> {
        (**self).snapshot(ticker)
    }

    fn price_history(&self, ticker: &str) -> Result<Vec<f64>> {
        (**self).price_history(ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_history_filters_by_company() {
        let statements = vec![
            FinancialStatement::annual_income("a", 2022),
            FinancialStatement::annual_income("b", 2022),
            FinancialStatement::annual_income("a", 2023),
        ];
        let history = statements.statements("a").unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|s| s.company_id == "a"));
        assert!(statements.statements("missing").unwrap().is_empty());
    }

    #[test]
    fn test_map_sources() {
        let mut history: HashMap<CompanyId, Vec<FinancialStatement>> = HashMap::new();
        history.insert("a".to_string(), vec![FinancialStatement::annual_income("a", 2023)]);
        assert_eq!(history.statements("a").unwrap().len(), 1);
        assert!(history.statements("b").unwrap().is_empty());

        let mut market: HashMap<String, MarketSnapshot> = HashMap::new();
        market.insert(
            "AAPL".to_string(),
            MarketSnapshot {
                ticker: "AAPL".to_string(),
                enterprise_value: Some(1.0),
                ..Default::default()
            },
        );
        assert!(market.snapshot("AAPL").unwrap().is_some());
        assert!(market.snapshot("MSFT").unwrap().is_none());
        assert!(market.price_history("AAPL").unwrap().is_empty());
    }

    #[test]
    fn test_trait_objects() {
        let statements = vec![FinancialStatement::annual_income("a", 2023)];
        let dynamic: &dyn FinancialHistory = &statements;
        assert_eq!(dynamic.statements("a").unwrap().len(), 1);
    }
}
