//! Small checks shared by the section validators. Each one appends a
//! message naming the offending key instead of failing fast.

use std::fmt::Display;

/// `value` must lie in `[min, max]`.
pub(crate) fn validate_range<T>(errors: &mut Vec<String>, key: &str, value: T, min: T, max: T)
where
    T: PartialOrd + Display + Copy,
{
    // NaN fails both comparisons, so test containment rather than exclusion
    if !(value >= min && value <= max) {
        errors.push(format!("{key} = {value} is out of range [{min}, {max}]"));
    }
}

/// `value` must be finite and strictly positive.
pub(crate) fn validate_positive(errors: &mut Vec<String>, key: &str, value: f64) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(format!("{key} = {value} must be a positive number"));
    }
}

/// `upper` must be strictly greater than `lower`.
pub(crate) fn validate_ordered(
    errors: &mut Vec<String>,
    (lower_key, lower): (&str, f64),
    (upper_key, upper): (&str, f64),
) {
    if upper <= lower {
        errors.push(format!("{upper_key} = {upper} must exceed {lower_key} = {lower}"));
    }
}

/// An empty value is allowed; anything else must be an http(s) URL.
pub(crate) fn validate_optional_url(errors: &mut Vec<String>, key: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    let scheme_ok = value.starts_with("http://") || value.starts_with("https://");
    let has_host = value
        .split_once("://")
        .map(|(_, rest)| !rest.is_empty())
        .unwrap_or(false);
    if !(scheme_ok && has_host) {
        errors.push(format!("{key} = {value:?} must be an http(s) URL"));
    }
}
