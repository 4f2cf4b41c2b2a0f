//! Statistical helpers shared by the valuation and pairing crates.
//!
//! All functions are total: empty or degenerate input produces a documented
//! neutral value rather than `NaN` or a panic.

/// Lower bound applied to any growth or CAGR figure.
pub const GROWTH_FLOOR: f64 = -0.5;

/// Upper bound applied to any growth or CAGR figure.
pub const GROWTH_CEILING: f64 = 1.0;

/// Arithmetic mean; `0.0` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (N denominator); `0.0` for an empty slice.
#[must_use]
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Stability of a series as `1 - min(1, std / |mean|)`.
///
/// Returns `0.0` with fewer than two observations or a zero mean.
///
/// # Examples
///
/// ```
/// use dealscope_traits::stats::stability;
///
/// assert_eq!(stability(&[5.0, 5.0, 5.0]), 1.0);
/// assert_eq!(stability(&[5.0]), 0.0);
/// ```
#[must_use]
pub fn stability(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    if m == 0.0 {
        return 0.0;
    }
    clamp_unit(1.0 - (population_std(values) / m.abs()).min(1.0))
}

/// Median of the finite values; `None` when there are none.
///
/// Even-length input averages the two middle values.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Clamp into `[0, 1]`, mapping non-finite input to `0.0`.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamp a growth rate into `[-0.5, 1.0]`, mapping `NaN` to `0.0`.
#[must_use]
pub fn clamp_growth(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(GROWTH_FLOOR, GROWTH_CEILING)
    }
}

/// Compound annual growth rate between two positive values `years` apart.
///
/// Returns `None` when either value is non-positive or `years` is not
/// positive. The result is not clamped.
#[must_use]
pub fn cagr(first: f64, last: f64, years: i32) -> Option<f64> {
    if first <= 0.0 || last <= 0.0 || years <= 0 {
        return None;
    }
    Some((last / first).powf(1.0 / f64::from(years)) - 1.0)
}

/// Round to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
