// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Small numeric helpers shared by the report builders.

/// Round half away from zero to `decimals` places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// `numerator / denominator`, `None` for a zero or non-finite denominator
#[must_use]
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator.abs() > f64::EPSILON && denominator.is_finite() {
        Some(numerator / denominator)
    } else {
        None
    }
}

/// Percentage share, `None` for a zero denominator
#[must_use]
pub fn percentage(part: f64, whole: f64) -> Option<f64> {
    ratio(part, whole).map(|share| share * 100.0)
}

#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "population sizes stay far below 2^52"
)]
pub fn as_f64(count: usize) -> f64 {
    count as f64
}

#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / as_f64(values.len()))
    }
}

/// Median of the values, averaging the two middle elements for even counts
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some(f64::midpoint(sorted[mid - 1], sorted[mid]))
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation, 0 for fewer than two values
#[must_use]
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let Some(avg) = mean(values) else {
        return 0.0;
    };
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / as_f64(values.len());
    variance.sqrt()
}

/// Share of `part` in `total` in percent, rounded to `decimals`. 0 for an empty total.
#[must_use]
pub fn share_pct(part: usize, total: usize, decimals: i32) -> f64 {
    percentage(as_f64(part), as_f64(total)).map_or(0.0, |pct| round_to(pct, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_decimals() {
        assert!((round_to(1234.567, 0) - 1235.0).abs() < 1e-9);
        assert!((round_to(12.345_6, 2) - 12.35).abs() < 1e-9);
        assert!((round_to(-0.25, 1) + 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_guards_zero_denominator() {
        assert_eq!(ratio(5.0, 0.0), None);
        assert_eq!(percentage(1.0, 0.0), None);
        assert_eq!(ratio(5.0, 2.0), Some(2.5));
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_std_dev_of_single_value_is_zero() {
        assert!(population_std_dev(&[42.0]).abs() < f64::EPSILON);
        assert!((population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_share_pct_handles_empty_total() {
        assert!(share_pct(0, 0, 1).abs() < f64::EPSILON);
        assert!((share_pct(1, 3, 1) - 33.3).abs() < 1e-9);
    }
}
