//! Small numeric helpers shared by the parser and the timing model.

/// Rounds to the nearest integer, ties to even.
#[must_use]
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Parses a decimal number, rejecting `NaN` and infinities.
///
/// Surrounding whitespace is ignored.
#[must_use]
pub fn parse_finite(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
