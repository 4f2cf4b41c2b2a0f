//! Discount rate estimation.
//!
//! Cost of equity follows CAPM (`rf + β × MRP`). Beta is the regression
//! slope of a stock's returns on market returns, shrunk by the regression's
//! R² so that a noisy fit pulls toward zero.

use serde::{Deserialize, Serialize};

use dealscope_traits::stats::mean;
use dealscope_traits::{DealscopeError, MarketDataSource, Result};

/// Discount rate used when no beta can be estimated.
pub const DEFAULT_WACC: f64 = 0.10;

/// Index ticker betas are regressed against.
pub const DEFAULT_BENCHMARK: &str = "SPY";

/// Minimum number of aligned return pairs for a beta estimate.
pub const MIN_BETA_OBSERVATIONS: usize = 2;

/// Capital structure and market assumptions for WACC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaccInputs {
    /// Risk-free rate (default: 0.04)
    pub risk_free_rate: f64,

    /// Equity market risk premium (default: 0.06)
    pub market_risk_premium: f64,

    /// Spread of pre-tax cost of debt over the risk-free rate (default: 0.02)
    pub debt_spread: f64,

    /// Debt share of total capital (default: 0.3)
    pub debt_ratio: f64,

    /// Tax rate for the debt shield (default: 0.25)
    pub tax_rate: f64,

    /// Equity beta (default: 1.0)
    pub beta: f64,
}

impl Default for WaccInputs {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.04,
            market_risk_premium: 0.06,
            debt_spread: 0.02,
            debt_ratio: 0.3,
            tax_rate: 0.25,
            beta: 1.0,
        }
    }
}

impl WaccInputs {
    /// Same assumptions with a different beta.
    #[must_use]
    pub const fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// CAPM cost of equity.
    #[must_use]
    pub fn cost_of_equity(&self) -> f64 {
        self.risk_free_rate + self.beta * self.market_risk_premium
    }

    /// Pre-tax cost of debt.
    #[must_use]
    pub fn cost_of_debt(&self) -> f64 {
        self.risk_free_rate + self.debt_spread
    }
}

/// Weighted average cost of capital.
///
/// # Errors
///
/// Returns [`DealscopeError::InvalidInput`] when the debt ratio is outside
/// `[0, 1]` or any input is not finite.
///
/// # Example
///
/// ```
/// use dealscope_valuation::wacc::{estimate_wacc, WaccInputs};
///
/// // 0.7 × (0.04 + 0.06) + 0.3 × 0.06 × 0.75
/// let wacc = estimate_wacc(&WaccInputs::default()).unwrap();
/// assert!((wacc - 0.0835).abs() < 1e-12);
/// ```
pub fn estimate_wacc(inputs: &WaccInputs) -> Result<f64> {
    let fields = [
        inputs.risk_free_rate,
        inputs.market_risk_premium,
        inputs.debt_spread,
        inputs.debt_ratio,
        inputs.tax_rate,
        inputs.beta,
    ];
    if fields.iter().any(|v| !v.is_finite()) {
        return Err(DealscopeError::InvalidInput(
            "WACC inputs must be finite".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&inputs.debt_ratio) {
        return Err(DealscopeError::InvalidInput(format!(
            "debt ratio must be within [0, 1], got {}",
            inputs.debt_ratio
        )));
    }

    let equity_ratio = 1.0 - inputs.debt_ratio;
    Ok(equity_ratio * inputs.cost_of_equity()
        + inputs.debt_ratio * inputs.cost_of_debt() * (1.0 - inputs.tax_rate))
}

/// WACC from a beta estimate, or [`DEFAULT_WACC`] when there is none.
#[must_use]
pub fn wacc_or_default(beta: Option<f64>, inputs: &WaccInputs) -> f64 {
    beta.and_then(|b| estimate_wacc(&inputs.with_beta(b)).ok())
        .unwrap_or(DEFAULT_WACC)
}

/// Period-over-period simple returns of a price series.
///
/// Pairs with a non-positive or non-finite prior price are skipped.
#[must_use]
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0].is_finite() && w[1].is_finite() && w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// R²-adjusted beta of `stock` returns against `market` returns.
///
/// Series are aligned on their most recent observations. Returns `None`
/// with fewer than [`MIN_BETA_OBSERVATIONS`] pairs or a flat market.
#[must_use]
pub fn estimate_beta(stock: &[f64], market: &[f64]) -> Option<f64> {
    let n = stock.len().min(market.len());
    if n < MIN_BETA_OBSERVATIONS {
        return None;
    }
    let stock = &stock[stock.len() - n..];
    let market = &market[market.len() - n..];

    let mean_stock = mean(stock);
    let mean_market = mean(market);
    let (mut cov, mut var_market, mut var_stock) = (0.0, 0.0, 0.0);
    for (s, m) in stock.iter().zip(market) {
        let ds = s - mean_stock;
        let dm = m - mean_market;
        cov += ds * dm;
        var_market += dm * dm;
        var_stock += ds * ds;
    }
    if var_market <= f64::EPSILON {
        return None;
    }

    let slope = cov / var_market;
    let r_squared = if var_stock > 0.0 {
        (cov * cov) / (var_market * var_stock)
    } else {
        0.0
    };
    let beta = slope * r_squared;
    beta.is_finite().then_some(beta)
}

/// Beta of `ticker` against `benchmark` from the market's price history.
///
/// Returns `Ok(None)` when either series is too short or the benchmark is
/// flat.
///
/// # Errors
///
/// Propagates the market data source's lookup failures.
pub fn beta_from_prices(
    market: &dyn MarketDataSource,
    ticker: &str,
    benchmark: &str,
) -> Result<Option<f64>> {
    let stock = simple_returns(&market.price_history(ticker)?);
    let index = simple_returns(&market.price_history(benchmark)?);
    Ok(estimate_beta(&stock, &index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dealscope_traits::types::Date;
    use dealscope_traits::{MarketData, MarketSnapshot};

    const INDEX_RETURNS: [f64; 8] = [0.01, -0.02, 0.015, 0.03, -0.01, 0.005, -0.025, 0.02];

    /// Daily snapshots compounding `scale` times the index returns.
    fn tracking(ticker: &str, scale: f64) -> Vec<MarketSnapshot> {
        let mut price = 100.0;
        let mut snapshots = Vec::new();
        for (day, r) in std::iter::once(0.0).chain(INDEX_RETURNS).enumerate() {
            price *= 1.0 + scale * r;
            snapshots.push(MarketSnapshot {
                ticker: ticker.to_string(),
                as_of: Date::from_ymd_opt(2024, 3, day as u32 + 1),
                price: Some(price),
                ..MarketSnapshot::default()
            });
        }
        snapshots
    }

    #[test]
    fn test_default_wacc() {
        assert_relative_eq!(estimate_wacc(&WaccInputs::default()).unwrap(), 0.0835, epsilon = 1e-12);
        assert_relative_eq!(WaccInputs::default().cost_of_debt(), 0.06, epsilon = 1e-12);
    }

    #[test]
    fn test_higher_beta_raises_wacc() {
        let low = estimate_wacc(&WaccInputs::default().with_beta(0.8)).unwrap();
        let high = estimate_wacc(&WaccInputs::default().with_beta(1.5)).unwrap();
        assert!(high > low);
        // 0.7 × 0.06 × 0.7
        assert_relative_eq!(high - low, 0.0294, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let bad_ratio = WaccInputs {
            debt_ratio: 1.5,
            ..WaccInputs::default()
        };
        assert!(estimate_wacc(&bad_ratio).is_err());
        assert!(estimate_wacc(&WaccInputs::default().with_beta(f64::NAN)).is_err());
    }

    #[test]
    fn test_simple_returns() {
        let returns = simple_returns(&[100.0, 110.0, 99.0, 0.0, 5.0]);
        assert_eq!(returns.len(), 3);
        assert_relative_eq!(returns[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[1], -0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[2], -1.0);
        assert!(simple_returns(&[1.0]).is_empty());
    }

    #[test]
    fn test_beta_of_perfect_fit() {
        let market = vec![0.01, -0.02, 0.03, 0.005, -0.01];
        let stock: Vec<f64> = market.iter().map(|r| 1.5 * r).collect();
        assert_relative_eq!(estimate_beta(&stock, &market).unwrap(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_beta_shrinks_with_noise() {
        let market = vec![0.01, -0.02, 0.03, 0.005, -0.01, 0.02];
        let noise = [0.02, -0.015, -0.02, 0.01, 0.015, -0.01];
        let stock: Vec<f64> = market.iter().zip(noise).map(|(m, e)| m + e).collect();
        let beta = estimate_beta(&stock, &market).unwrap();
        assert!(beta < 1.0);
    }

    #[test]
    fn test_beta_alignment_and_degenerate_input() {
        assert!(estimate_beta(&[0.01], &[0.02]).is_none());
        assert!(estimate_beta(&[0.01, 0.02, 0.03], &[0.01, 0.01, 0.01]).is_none());

        let market = vec![0.01, -0.02, 0.03];
        let stock = vec![9.0, 0.02, -0.04, 0.06];
        assert_relative_eq!(estimate_beta(&stock, &market).unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_beta_from_prices() {
        let snapshots: Vec<MarketSnapshot> = [("SPY", 1.0), ("HOT", 2.0), ("CALM", 0.5)]
            .into_iter()
            .flat_map(|(ticker, scale)| tracking(ticker, scale))
            .collect();
        let market = MarketData::from_snapshots(&snapshots).unwrap();

        let hot = beta_from_prices(&market, "HOT", DEFAULT_BENCHMARK).unwrap().unwrap();
        let calm = beta_from_prices(&market, "CALM", DEFAULT_BENCHMARK).unwrap().unwrap();
        assert_relative_eq!(hot, 2.0, epsilon = 1e-9);
        assert_relative_eq!(calm, 0.5, epsilon = 1e-9);

        let inputs = WaccInputs::default();
        assert!(wacc_or_default(Some(hot), &inputs) > wacc_or_default(Some(calm), &inputs));
        assert!(beta_from_prices(&market, "NONE", DEFAULT_BENCHMARK).unwrap().is_none());
    }

    #[test]
    fn test_wacc_or_default() {
        assert_relative_eq!(wacc_or_default(None, &WaccInputs::default()), DEFAULT_WACC);
        assert_relative_eq!(
            wacc_or_default(Some(1.0), &WaccInputs::default()),
            0.0835,
            epsilon = 1e-12
        );
    }
}
