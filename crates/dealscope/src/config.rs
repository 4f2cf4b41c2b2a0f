//! Engine-wide configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dealscope_pairing::CompatibilityWeights;
use dealscope_traits::MarketDataSource;
use dealscope_valuation::wacc::{DEFAULT_BENCHMARK, beta_from_prices, wacc_or_default};
use dealscope_valuation::{CompsConfig, DcfConfig, EnsembleWeights, WaccInputs};

/// Errors raised while loading an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`EngineConfig`].
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// A value parsed but is out of range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Aggregated configuration of every engine component.
///
/// Every field has a default, so a JSON file only needs the keys it
/// overrides:
///
/// ```
/// use dealscope::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "growth_rate": 0.04, "comps": { "full_confidence_peers": 3 } }"#).unwrap();
/// assert_eq!(config.growth_rate, 0.04);
/// assert_eq!(config.comps.full_confidence_peers, 3);
/// assert_eq!(config.comps.min_cap_ratio, 0.3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nominal growth rate used for DCF projections (default: 0.05)
    pub growth_rate: f64,

    /// Fixed discount rate; when unset it is derived from `wacc` and `beta`
    /// (default: None)
    pub discount_rate: Option<f64>,

    /// Equity beta used to derive the discount rate; when unset it is
    /// regressed from price history (default: None)
    pub beta: Option<f64>,

    /// Index ticker betas are regressed against (default: "SPY")
    pub benchmark: String,

    /// Terminal growth override for every DCF run (default: None)
    pub terminal_growth: Option<f64>,

    /// Number of candidates returned by ranking (default: 10)
    pub top_k: usize,

    /// DCF horizon, terminal policy and sensitivity steps.
    pub dcf: DcfConfig,

    /// Comparable multiples filters and blend.
    pub comps: CompsConfig,

    /// Compatibility sub-score weights.
    pub compatibility: CompatibilityWeights,

    /// Method weights of the ensemble blend.
    pub ensemble: EnsembleWeights,

    /// CAPM and capital structure assumptions.
    pub wacc: WaccInputs,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            growth_rate: 0.05,
            discount_rate: None,
            beta: None,
            benchmark: DEFAULT_BENCHMARK.to_string(),
            terminal_growth: None,
            top_k: 10,
            dcf: DcfConfig::default(),
            comps: CompsConfig::default(),
            compatibility: CompatibilityWeights::default(),
            ensemble: EnsembleWeights::default(),
            wacc: WaccInputs::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// see [`EngineConfig::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check ranges that deserialization alone cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("growth_rate", Some(self.growth_rate)),
            ("discount_rate", self.discount_rate),
            ("beta", self.beta),
            ("terminal_growth", self.terminal_growth),
        ];
        if let Some((name, value)) = rates
            .iter()
            .find_map(|(name, v)| v.filter(|v| !v.is_finite()).map(|v| (name, v)))
        {
            return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
        }
        if self.dcf.projection.years == 0 {
            return Err(ConfigError::Invalid(
                "dcf.projection.years must be positive".to_string(),
            ));
        }
        if self.comps.min_cap_ratio > self.comps.max_cap_ratio {
            return Err(ConfigError::Invalid(format!(
                "comps.min_cap_ratio {} exceeds comps.max_cap_ratio {}",
                self.comps.min_cap_ratio, self.comps.max_cap_ratio
            )));
        }
        Ok(())
    }

    /// Discount rate for DCF runs on `ticker`.
    ///
    /// The fixed `discount_rate` when set. Otherwise the WACC at the
    /// configured `beta`, or at a beta regressed from `market` prices against
    /// `benchmark`, falling back to the default WACC when neither is known.
    #[must_use]
    pub fn discount_rate_for(&self, ticker: &str, market: &dyn MarketDataSource) -> f64 {
        self.discount_rate.unwrap_or_else(|| {
            let beta = self.beta.or_else(|| self.market_beta(ticker, market));
            wacc_or_default(beta, &self.wacc)
        })
    }

    /// Beta of `ticker` regressed from price history, `None` when the
    /// history is too short or cannot be read.
    #[must_use]
    pub fn market_beta(&self, ticker: &str, market: &dyn MarketDataSource) -> Option<f64> {
        match beta_from_prices(market, ticker, &self.benchmark) {
            Ok(beta) => beta,
            Err(err) => {
                tracing::warn!(
                    ticker,
                    benchmark = self.benchmark.as_str(),
                    %err,
                    "price history lookup failed"
                );
                None
            }
        }
    }
}
