//! Blending of valuation methods into one estimate.

use serde::{Deserialize, Serialize};

use dealscope_traits::stats::clamp_unit;
use dealscope_traits::{DealscopeError, Result};

use crate::comps::CompsResult;
use crate::dcf::DcfResult;
use crate::registry::ValuationMethod;

/// Relative weight of each method in the blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    /// Weight of the DCF estimate (default: 0.4)
    pub dcf: f64,

    /// Weight of the comparable multiples estimate (default: 0.4)
    pub comps: f64,

    /// Weight of the precedent transactions estimate (default: 0.2)
    pub precedent: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            dcf: 0.4,
            comps: 0.4,
            precedent: 0.2,
        }
    }
}

impl EnsembleWeights {
    /// Weight of one method.
    #[must_use]
    pub const fn weight(&self, method: ValuationMethod) -> f64 {
        match method {
            ValuationMethod::Dcf => self.dcf,
            ValuationMethod::Comps => self.comps,
            ValuationMethod::Precedent => self.precedent,
        }
    }
}

/// One method's estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodEstimate {
    /// Method that produced the estimate.
    pub method: ValuationMethod,
    /// Enterprise value.
    pub enterprise_value: f64,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl MethodEstimate {
    /// Create an estimate.
    #[must_use]
    pub const fn new(method: ValuationMethod, enterprise_value: f64, confidence: f64) -> Self {
        Self {
            method,
            enterprise_value,
            confidence,
        }
    }
}

impl From<&DcfResult> for MethodEstimate {
    fn from(result: &DcfResult) -> Self {
        Self::new(ValuationMethod::Dcf, result.enterprise_value, result.confidence)
    }
}

impl From<&CompsResult> for MethodEstimate {
    fn from(result: &CompsResult) -> Self {
        Self::new(ValuationMethod::Comps, result.enterprise_value, result.confidence)
    }
}

/// An estimate with its renormalized weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleComponent {
    /// The estimate.
    pub estimate: MethodEstimate,
    /// Weight after renormalization over the supplied methods.
    pub weight: f64,
}

/// Blended valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleValuation {
    /// Weighted enterprise value.
    pub enterprise_value: f64,
    /// Weighted confidence.
    pub confidence: f64,
    /// Contributing estimates.
    pub components: Vec<EnsembleComponent>,
}

/// Blend method estimates with weights renormalized over those supplied.
///
/// Estimates with a non-finite value or a non-positive weight are ignored.
/// When a method appears twice, the first estimate is used.
///
/// # Errors
///
/// Returns [`DealscopeError::InsufficientData`] when no estimate remains.
///
/// # Example
///
/// ```
/// use dealscope_valuation::ensemble::{blend, EnsembleWeights, MethodEstimate};
/// use dealscope_valuation::ValuationMethod;
///
/// let estimates = [
///     MethodEstimate::new(ValuationMethod::Dcf, 100.0, 0.8),
///     MethodEstimate::new(ValuationMethod::Comps, 200.0, 0.4),
/// ];
/// let blended = blend(&estimates, &EnsembleWeights::default()).unwrap();
/// assert!((blended.enterprise_value - 150.0).abs() < 1e-9);
/// ```
pub fn blend(estimates: &[MethodEstimate], weights: &EnsembleWeights) -> Result<EnsembleValuation> {
    let mut usable: Vec<MethodEstimate> = Vec::with_capacity(estimates.len());
    for estimate in estimates {
        let duplicate = usable.iter().any(|e| e.method == estimate.method);
        if duplicate
            || !estimate.enterprise_value.is_finite()
            || weights.weight(estimate.method) <= 0.0
        {
            continue;
        }
        usable.push(*estimate);
    }

    let total: f64 = usable.iter().map(|e| weights.weight(e.method)).sum();
    if usable.is_empty() || total <= 0.0 || !total.is_finite() {
        return Err(DealscopeError::InsufficientData(
            "no valuation method produced an estimate".to_string(),
        ));
    }

    let components: Vec<EnsembleComponent> = usable
        .into_iter()
        .map(|estimate| EnsembleComponent {
            weight: weights.weight(estimate.method) / total,
            estimate,
        })
        .collect();

    let enterprise_value = components
        .iter()
        .map(|c| c.weight * c.estimate.enterprise_value)
        .sum();
    let confidence = clamp_unit(
        components
            .iter()
            .map(|c| c.weight * clamp_unit(c.estimate.confidence))
            .sum(),
    );

    Ok(EnsembleValuation {
        enterprise_value,
        confidence,
        components,
    })
}
