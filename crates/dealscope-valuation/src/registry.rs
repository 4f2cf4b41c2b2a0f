//! Valuation method registry.
//!
//! Metadata about the valuation methods the engine knows, used by the
//! ensemble blender and for discovery.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A valuation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    /// Discounted cash flow.
    Dcf,
    /// Comparable company trading multiples.
    Comps,
    /// Precedent transaction multiples, supplied by the caller.
    Precedent,
}

impl ValuationMethod {
    /// Every method, in blending order.
    pub const ALL: [Self; 3] = [Self::Dcf, Self::Comps, Self::Precedent];

    /// Short identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dcf => "dcf",
            Self::Comps => "comps",
            Self::Precedent => "precedent",
        }
    }

    /// Get a human-readable description of the method.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Dcf => "Projected free cash flows discounted at WACC with a perpetuity terminal value",
            Self::Comps => "Median peer EV/Revenue and EV/EBITDA applied to target fundamentals",
            Self::Precedent => "Multiples paid in past acquisitions of similar companies",
        }
    }
}

impl fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about a valuation method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInfo {
    /// The method.
    pub method: ValuationMethod,

    /// Human-readable description
    pub description: &'static str,

    /// Whether the engine computes this method itself
    pub computed_by_engine: bool,

    /// Whether the method needs market data
    pub requires_market_data: bool,

    /// Whether the method needs the target's statement history
    pub requires_statements: bool,
}

/// Get information about all valuation methods.
#[must_use]
pub fn available_methods() -> Vec<MethodInfo> {
    vec![
        MethodInfo {
            method: ValuationMethod::Dcf,
            description: ValuationMethod::Dcf.description(),
            computed_by_engine: true,
            requires_market_data: false,
            requires_statements: true,
        },
        MethodInfo {
            method: ValuationMethod::Comps,
            description: ValuationMethod::Comps.description(),
            computed_by_engine: true,
            requires_market_data: true,
            requires_statements: true,
        },
        MethodInfo {
            method: ValuationMethod::Precedent,
            description: ValuationMethod::Precedent.description(),
            computed_by_engine: false,
            requires_market_data: false,
            requires_statements: false,
        },
    ]
}

/// Get methods the engine can compute without caller-supplied estimates.
#[must_use]
pub fn engine_methods() -> Vec<MethodInfo> {
    available_methods()
        .into_iter()
        .filter(|info| info.computed_by_engine)
        .collect()
}

/// Find information about a method by identifier.
#[must_use]
pub fn find_method(name: &str) -> Option<MethodInfo> {
    available_methods()
        .into_iter()
        .find(|info| info.method.as_str().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_methods() {
        let methods = available_methods();
        assert_eq!(methods.len(), ValuationMethod::ALL.len());
        for (info, method) in methods.iter().zip(ValuationMethod::ALL) {
            assert_eq!(info.method, method);
            assert!(!info.description.is_empty());
        }
    }

    #[test]
    fn test_engine_methods() {
        let computed: Vec<ValuationMethod> = engine_methods().iter().map(|i| i.method).collect();
        assert_eq!(computed, vec![ValuationMethod::Dcf, ValuationMethod::Comps]);
    }

    #[test]
    fn test_find_method() {
        assert_eq!(find_method("DCF").map(|i| i.method), Some(ValuationMethod::Dcf));
        assert!(find_method("lbo").is_none());
        assert_eq!(ValuationMethod::Precedent.to_string(), "precedent");
    }
}
