//! Columnar store of point-in-time market snapshots.

use polars::prelude::*;

use crate::source::MarketDataSource;
use crate::types::{Date, MarketSnapshot};
use crate::{DealscopeError, Result};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

/// Container for market snapshots.
///
/// `MarketData` wraps a Polars DataFrame with one row per ticker per
/// observation date. Lookups return the most recent row on or before the
/// pinned as-of date, so the same frame can serve historical analyses.
///
/// # Expected Schema
///
/// - `symbol`: Ticker (string, required)
/// - `date`: Observation date (date, required, nullable)
/// - `price`, `volume`, `market_cap`, `enterprise_value`: `f64`, nullable
///
/// # Example
///
/// ```no_run
/// use dealscope_traits::{MarketData, MarketDataSource, MarketSnapshot};
///
/// let snapshots = vec![MarketSnapshot {
///     ticker: "AAPL".to_string(),
///     enterprise_value: Some(2.6e12),
///     ..Default::default()
/// }];
/// let market = MarketData::from_snapshots(&snapshots).unwrap();
/// let latest = market.snapshot("AAPL").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MarketData {
    /// The underlying DataFrame containing snapshots.
    data: DataFrame,
    /// Lookups ignore rows dated after this day.
    as_of: Option<Date>,
}

impl MarketData {
    /// Columns every market frame must carry.
    pub const REQUIRED_COLUMNS: [&'static str; 2] = ["symbol", "date"];

    /// Optional numeric columns read into [`MarketSnapshot`].
    pub const VALUE_COLUMNS: [&'static str; 4] = ["price", "volume", "market_cap", "enterprise_value"];

    /// Creates a new `MarketData` instance from a DataFrame.
    ///
    /// The frame is trusted to follow the expected schema; use
    /// [`MarketData::try_new`] to validate it.
    pub const fn new(data: DataFrame) -> Self {
        Self { data, as_of: None }
    }

    /// Creates a `MarketData` instance after checking the required columns.
    ///
    /// # Errors
    ///
    /// Returns [`DealscopeError::InvalidInput`] naming the first missing column.
    pub fn try_new(data: DataFrame) -> Result<Self> {
        let market = Self::new(data);
        for col in Self::REQUIRED_COLUMNS {
            if !market.has_column(col) {
                return Err(DealscopeError::InvalidInput(format!(
                    "Missing required column: {col}"
                )));
            }
        }
        Ok(market)
    }

    /// Builds a frame from snapshot records.
    ///
    /// # Errors
    ///
    /// Returns an error if Polars cannot assemble the frame.
    pub fn from_snapshots(snapshots: &[MarketSnapshot]) -> Result<Self> {
        let symbols: Vec<String> = snapshots.iter().map(|s| s.ticker.clone()).collect();
        let dates: Vec<Option<Date>> = snapshots.iter().map(|s| s.as_of).collect();
        let prices: Vec<Option<f64>> = snapshots.iter().map(|s| s.price).collect();
        let volumes: Vec<Option<f64>> = snapshots.iter().map(|s| s.volume).collect();
        let caps: Vec<Option<f64>> = snapshots.iter().map(|s| s.market_cap).collect();
        let evs: Vec<Option<f64>> = snapshots.iter().map(|s| s.enterprise_value).collect();

        let data = df! {
            "symbol" => symbols,
            "date" => dates,
            "price" => prices,
            "volume" => volumes,
            "market_cap" => caps,
            "enterprise_value" => evs,
        }?;

        Ok(Self::new(data))
    }

    /// Pins lookups to rows dated on or before `as_of`.
    #[must_use]
    pub const fn with_as_of(mut self, as_of: Date) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the frame is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Rows of `ticker` with their parsed dates, `None` when there are none.
    fn ticker_rows(&self, ticker: &str) -> Result<Option<(DataFrame, Vec<Option<Date>>)>> {
        if self.is_empty() {
            return Ok(None);
        }

        let mask = self
            .data
            .column("symbol")?
            .as_materialized_series()
            .str()?
            .equal(ticker);
        let rows = self.data.filter(&mask)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let dates: Vec<Option<Date>> = rows
            .column("date")?
            .as_materialized_series()
            .date()?
            .into_iter()
            .map(|d: Option<i32>| d.and_then(|d| Date::from_num_days_from_ce_opt(d + UNIX_EPOCH_CE_DAYS)))
            .collect();

        Ok(Some((rows, dates)))
    }

    /// Most recent snapshot for `ticker` dated on or before `as_of`.
    ///
    /// Undated rows are eligible for any `as_of` but lose to any dated row.
    ///
    /// # Errors
    ///
    /// Returns an error if a column has an unexpected type.
    pub fn snapshot_as_of(&self, ticker: &str, as_of: Option<Date>) -> Result<Option<MarketSnapshot>> {
        let Some((rows, dates)) = self.ticker_rows(ticker)? else {
            return Ok(None);
        };

        let best = dates
            .iter()
            .enumerate()
            .filter(|(_, d)| match (d, as_of) {
                (Some(d), Some(limit)) => *d <= limit,
                _ => true,
            })
            .max_by_key(|(_, d)| **d)
            .map(|(idx, _)| idx);

        let Some(idx) = best else {
            return Ok(None);
        };

        let value = |name: &str| -> Result<Option<f64>> {
            if !rows.get_column_names().iter().any(|c| c.as_str() == name) {
                return Ok(None);
            }
            Ok(rows.column(name)?.as_materialized_series().f64()?.get(idx))
        };

        Ok(Some(MarketSnapshot {
            ticker: ticker.to_string(),
            as_of: dates[idx],
            price: value("price")?,
            volume: value("volume")?,
            market_cap: value("market_cap")?,
            enterprise_value: value("enterprise_value")?,
        }))
    }

    /// Prices of `ticker` dated on or before `as_of`, oldest first.
    ///
    /// Undated rows and rows without a finite price are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if a column has an unexpected type.
    pub fn price_history_as_of(&self, ticker: &str, as_of: Option<Date>) -> Result<Vec<f64>> {
        if !self.has_column("price") {
            return Ok(Vec::new());
        }
        let Some((rows, dates)) = self.ticker_rows(ticker)? else {
            return Ok(Vec::new());
        };

        let prices = rows.column("price")?.as_materialized_series().f64()?;
        let mut dated: Vec<(Date, f64)> = dates
            .into_iter()
            .zip(prices)
            .filter_map(|(date, price)| Some((date?, price?)))
            .filter(|(date, price)| price.is_finite() && as_of.is_none_or(|limit| *date <= limit))
            .collect();
        dated.sort_by_key(|(date, _)| *date);

        Ok(dated.into_iter().map(|(_, price)| price).collect())
    }
}

impl MarketDataSource for MarketData {
    fn snapshot(&self, ticker: &str) -> Result<Option<MarketSnapshot>> {
        self.snapshot_as_of(ticker, self.as_of)
    }

    fn price_history(&self, ticker: &str) -> Result<Vec<f64>> {
        self.price_history_as_of(ticker, self.as_of)
    }
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}
