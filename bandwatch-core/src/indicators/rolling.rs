//! Trailing-window statistics shared by the indicators.
//!
//! Each window is summed from scratch rather than with a running add/subtract,
//! so a window of exact zeros yields exactly 0.0 with no float residue.

/// Rolling mean over `period` values. `None` until the window is full, or
/// while any value in the window is `None`.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    assert!(period >= 1, "rolling period must be >= 1");
    let n = values.len();
    let mut result = vec![None; n];

    if n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        let sum: Option<f64> = window.iter().copied().sum();
        result[i] = sum.map(|s| s / period as f64);
    }

    result
}

/// Rolling sample standard deviation (divides by `period - 1`).
pub fn rolling_sample_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    assert!(period >= 2, "sample stddev needs a period >= 2");
    let n = values.len();
    let mut result = vec![None; n];

    if n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / (period - 1) as f64;
        result[i] = Some(variance.sqrt());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn mean_warms_up_after_period() {
        let values: Vec<Option<f64>> = [10.0, 11.0, 12.0, 13.0].into_iter().map(Some).collect();
        let result = rolling_mean(&values, 3);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_approx(result[2].unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(result[3].unwrap(), 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn mean_skips_windows_with_gaps() {
        let values = vec![None, Some(1.0), Some(2.0), Some(3.0)];
        let result = rolling_mean(&values, 2);
        assert_eq!(result[1], None);
        assert_approx(result[2].unwrap(), 1.5, DEFAULT_EPSILON);
    }

    #[test]
    fn mean_of_zeros_is_exactly_zero() {
        let values = vec![Some(0.3), Some(0.0), Some(0.0), Some(0.0)];
        let result = rolling_mean(&values, 3);
        assert_eq!(result[3], Some(0.0));
    }

    #[test]
    fn sample_std_matches_hand_computation() {
        // mean(2,4,6) = 4, squared deviations 4+0+4 = 8, /2 = 4, sqrt = 2
        let result = rolling_sample_std(&[2.0, 4.0, 6.0], 3);
        assert_approx(result[2].unwrap(), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn too_few_values() {
        assert!(rolling_sample_std(&[1.0, 2.0], 5).iter().all(Option::is_none));
    }
}
