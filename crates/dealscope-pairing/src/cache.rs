//! Per-run cache of company histories.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use dealscope_traits::{CompanyId, FinancialHistory, FinancialStatement, Result};

use crate::growth::GrowthMetrics;

/// Statements of one company and the growth metrics derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyHistory {
    /// Every statement on file for the company.
    pub statements: Vec<FinancialStatement>,
    /// Growth metrics computed once per cache fill.
    pub growth: GrowthMetrics,
}

impl CompanyHistory {
    /// Derive metrics from statements.
    #[must_use]
    pub fn new(statements: Vec<FinancialStatement>) -> Self {
        let growth = GrowthMetrics::from_statements(&statements);
        Self { statements, growth }
    }
}

/// Memoizes [`FinancialHistory`] lookups for the duration of a ranking run.
///
/// Statements are immutable inputs, so entries never go stale within a
/// run. When a company's statements are re-ingested between runs, call
/// [`HistoryCache::invalidate`] (or [`HistoryCache::clear`]) before
/// reusing the cache. Failed lookups are not cached.
///
/// The cache is safe to share across the threads of a parallel scan.
pub struct HistoryCache<'a> {
    source: &'a dyn FinancialHistory,
    entries: DashMap<CompanyId, Arc<CompanyHistory>>,
}

impl<'a> HistoryCache<'a> {
    /// Create an empty cache over `source`.
    #[must_use]
    pub fn new(source: &'a dyn FinancialHistory) -> Self {
        Self {
            source,
            entries: DashMap::new(),
        }
    }

    /// History of `company_id`, loading it from the source on first use.
    ///
    /// # Errors
    ///
    /// Propagates the source's error; nothing is cached in that case.
    pub fn get(&self, company_id: &str) -> Result<Arc<CompanyHistory>> {
        if let Some(entry) = self.entries.get(company_id) {
            return Ok(Arc::clone(entry.value()));
        }

        let history = Arc::new(CompanyHistory::new(self.source.statements(company_id)?));
        let entry = self
            .entries
            .entry(company_id.to_string())
            .or_insert(history);
        Ok(Arc::clone(entry.value()))
    }

    /// Drop the cached history of one company.
    ///
    /// Returns whether an entry was present.
    pub fn invalidate(&self, company_id: &str) -> bool {
        self.entries.remove(company_id).is_some()
    }

    /// Drop every cached history.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached companies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for HistoryCache<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryCache")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
