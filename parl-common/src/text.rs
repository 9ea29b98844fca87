//! Text helpers for loosely-typed dataset fields
//!
//! Upstream producers write blanks, `NaN` and the literal strings `"null"` or
//! `"undefined"` where a value is unknown. Everything here treats those
//! uniformly as absent.

use unicode_normalization::UnicodeNormalization;

/// Sentinel spellings of an absent value (compared trimmed and lowercased)
const MISSING_SENTINELS: [&str; 4] = ["", "nan", "null", "undefined"];

/// True when the value is absent, blank or a sentinel.
pub fn is_missing(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(text) => {
            let lowered = text.trim().to_lowercase();
            MISSING_SENTINELS.contains(&lowered.as_str())
        }
    }
}

/// Returns the trimmed value when it is present.
pub fn present(value: Option<&str>) -> Option<&str> {
    if is_missing(value) {
        None
    } else {
        value.map(str::trim)
    }
}

/// First present value of `primary` then `fallback`, trimmed; empty when both are missing.
pub fn pick_value(primary: Option<&str>, fallback: Option<&str>) -> String {
    present(primary)
        .or_else(|| present(fallback))
        .unwrap_or_default()
        .to_string()
}

/// Strips diacritics and lowercases.
///
/// ```
/// use parl_common::text::normalize;
///
/// assert_eq!(normalize("Tête de Liste"), "tete de liste");
/// assert_eq!(normalize("Hérault"), "herault");
/// ```
pub fn normalize(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
}

/// Collapses whitespace runs to a single space and trims.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
