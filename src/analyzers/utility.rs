/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Clamps `value` into `[lo, hi]`, mapping NaN to 0.0 first.
pub fn clamp_finite(value: f64, lo: f64, hi: f64) -> f64 {
    let value = if value.is_nan() { 0.0 } else { value };
    value.clamp(lo, hi)
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_values() {
        assert!((mean(&[0.2, 0.4, 0.6]) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_finite() {
        assert_eq!(clamp_finite(f64::NAN, 0.0, 10.0), 0.0);
        assert_eq!(clamp_finite(f64::NAN, -1.0, 1.0), 0.0);
        assert_eq!(clamp_finite(f64::INFINITY, 0.0, 10.0), 10.0);
        assert_eq!(clamp_finite(-3.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp_finite(4.2, 0.0, 10.0), 4.2);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(6.8), 6.8);
        assert_eq!(round2(7.899999), 7.9);
        assert_eq!(round2(8.784), 8.78);
    }
}
