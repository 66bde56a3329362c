//! Decimal rounding for values that are reported or persisted.

/// Round `value` half away from zero to `places` decimal places.
///
/// # Examples
/// ```
/// use chargewise_core::round_dp;
///
/// assert_eq!(round_dp(3.14159, 2), 3.14);
/// assert_eq!(round_dp(2.25, 1), 2.3);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "decimal rounding scales by a power of ten"
)]
pub fn round_dp(value: f64, places: i32) -> f64 {
    let scale = 10_f64.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(845.318_4, 2, 845.32)]
    #[case(3.06, 1, 3.1)]
    #[case(-1.234, 2, -1.23)]
    #[case(7.0, 0, 7.0)]
    #[expect(clippy::float_arithmetic, reason = "tests compare floating point values")]
    fn rounds_to_places(#[case] value: f64, #[case] places: i32, #[case] expected: f64) {
        assert!((round_dp(value, places) - expected).abs() < 1e-9);
    }
}
