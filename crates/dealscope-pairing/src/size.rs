//! Size-based sub-scores.

/// Below this target/acquirer market cap ratio a target is too small.
pub const ABSOLUTE_MIN_RATIO: f64 = 0.05;

/// Lower edge of the ideal size band.
pub const IDEAL_MIN_RATIO: f64 = 0.10;

/// Upper edge of the ideal size band.
pub const IDEAL_MAX_RATIO: f64 = 0.50;

/// Above this ratio a target is too large to integrate.
pub const ABSOLUTE_MAX_RATIO: f64 = 0.70;

/// Relative size at which market position peaks.
pub const OPTIMAL_RELATIVE_SIZE: f64 = 0.30;

/// Target market cap over acquirer market cap, when both are positive.
#[must_use]
pub fn relative_size(acquirer_cap: f64, target_cap: f64) -> Option<f64> {
    let usable = |c: f64| c.is_finite() && c > 0.0;
    (usable(acquirer_cap) && usable(target_cap)).then(|| target_cap / acquirer_cap)
}

/// Size compatibility in `[0, 1]`.
///
/// `1` in the ideal 10-50% band, `0` below 5% or above 70%, linear in the
/// transition bands. Missing or non-positive caps score `0`.
///
/// # Example
///
/// ```
/// use dealscope_pairing::size_score;
///
/// assert_eq!(size_score(100.0, 30.0), 1.0);
/// assert_eq!(size_score(100.0, 2.0), 0.0);
/// assert_eq!(size_score(100.0, 80.0), 0.0);
/// ```
#[must_use]
pub fn size_score(acquirer_cap: f64, target_cap: f64) -> f64 {
    let Some(ratio) = relative_size(acquirer_cap, target_cap) else {
        return 0.0;
    };

    if !(ABSOLUTE_MIN_RATIO..=ABSOLUTE_MAX_RATIO).contains(&ratio) {
        0.0
    } else if (IDEAL_MIN_RATIO..=IDEAL_MAX_RATIO).contains(&ratio) {
        1.0
    } else if ratio < IDEAL_MIN_RATIO {
        (ratio - ABSOLUTE_MIN_RATIO) / (IDEAL_MIN_RATIO - ABSOLUTE_MIN_RATIO)
    } else {
        1.0 - (ratio - IDEAL_MAX_RATIO) / (ABSOLUTE_MAX_RATIO - IDEAL_MAX_RATIO)
    }
}

/// Market position in `[0, 1]`: `1 − |0.3 − relative_size|`.
///
/// Scored separately from [`size_score`] so callers can weight the two
/// independently. Missing caps score `0`.
#[must_use]
pub fn market_position_score(acquirer_cap: f64, target_cap: f64) -> f64 {
    relative_size(acquirer_cap, target_cap)
        .map_or(0.0, |r| (1.0 - (OPTIMAL_RELATIVE_SIZE - r).abs()).clamp(0.0, 1.0))
}
