//! Sector and industry fit.
//!
//! A fixed lookup table, not a learned similarity:
//!
//! | Relationship | Score |
//! |---|---|
//! | Same sector and industry | 1.0 |
//! | Same sector, complementary industries | 0.8 |
//! | Same sector, industry unknown | 0.7 |
//! | Same sector, unrelated industries | 0.6 |
//! | Adjacent sectors | 0.3 |
//! | Anything else | 0.0 |

/// Sector pairs with acquisition synergies. Matching is symmetric.
const ADJACENT_SECTORS: &[(&str, &str)] = &[
    ("technology", "communications"),
    ("technology", "consumer cyclical"),
    ("healthcare", "technology"),
    ("healthcare", "consumer defensive"),
    ("financial", "technology"),
    ("financial", "real estate"),
    ("consumer cyclical", "consumer defensive"),
    ("industrial", "technology"),
    ("industrial", "materials"),
];

/// Complementary industry pairs within a sector. Matching is symmetric.
const COMPLEMENTARY_INDUSTRIES: &[(&str, &str, &str)] = &[
    ("technology", "software", "hardware"),
    ("technology", "software", "semiconductors"),
    ("technology", "hardware", "semiconductors"),
];

fn canonical(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

fn symmetric(a: &str, b: &str, x: &str, y: &str) -> bool {
    (a == x && b == y) || (a == y && b == x)
}

/// Whether two sectors appear in the adjacency table.
#[must_use]
pub fn are_adjacent(a: &str, b: &str) -> bool {
    let a = a.trim().to_ascii_lowercase();
    let b = b.trim().to_ascii_lowercase();
    ADJACENT_SECTORS
        .iter()
        .any(|(x, y)| symmetric(&a, &b, x, y))
}

/// Whether two industries are complementary within `sector`.
#[must_use]
pub fn are_complementary(sector: &str, a: &str, b: &str) -> bool {
    let sector = sector.trim().to_ascii_lowercase();
    let a = a.trim().to_ascii_lowercase();
    let b = b.trim().to_ascii_lowercase();
    COMPLEMENTARY_INDUSTRIES
        .iter()
        .any(|(s, x, y)| *s == sector && symmetric(&a, &b, x, y))
}

/// Sector and industry compatibility in `[0, 1]`.
///
/// Comparison ignores case and surrounding whitespace. A missing sector on
/// either side scores `0`.
///
/// # Example
///
/// ```
/// use dealscope_pairing::sector_score;
///
/// assert_eq!(sector_score(Some("Technology"), Some("technology"), Some("Software"), Some("Hardware")), 0.8);
/// assert_eq!(sector_score(Some("Technology"), Some("Communications"), None, None), 0.3);
/// ```
#[must_use]
pub fn sector_score(
    acquirer_sector: Option<&str>,
    target_sector: Option<&str>,
    acquirer_industry: Option<&str>,
    target_industry: Option<&str>,
) -> f64 {
    let (Some(acq_sector), Some(tgt_sector)) = (canonical(acquirer_sector), canonical(target_sector))
    else {
        return 0.0;
    };

    if acq_sector != tgt_sector {
        return if are_adjacent(&acq_sector, &tgt_sector) { 0.3 } else { 0.0 };
    }

    match (canonical(acquirer_industry), canonical(target_industry)) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(a), Some(b)) if are_complementary(&acq_sector, &a, &b) => 0.8,
        (Some(_), Some(_)) => 0.6,
        _ => 0.7,
    }
}
