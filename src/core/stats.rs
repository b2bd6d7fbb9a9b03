//! Descriptive statistics for a single analyte sequence.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary statistics of one sequence.
///
/// Variance is the population variance (divides by N). Quartiles use the
/// nearest-rank position `floor(N * p)` of the sorted samples, without
/// interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

/// Compute summary statistics, or `None` for an empty sequence.
pub fn compute_stats(values: &[f64]) -> Option<StatsSummary> {
    if values.is_empty() {
        return None;
    }

    let sorted = sorted_copy(values);
    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];

    // A zero-spread sequence has exactly zero variance.
    let (mean, variance) = if min == max {
        (min, 0.0)
    } else {
        (values.iter().mean(), values.iter().population_variance())
    };

    let q1 = sorted[nearest_rank(n, 0.25)];
    let q3 = sorted[nearest_rank(n, 0.75)];

    Some(StatsSummary {
        count: n,
        mean,
        median: median_of_sorted(&sorted),
        std_dev: variance.sqrt(),
        variance,
        min,
        max,
        q1,
        q3,
        iqr: q3 - q1,
    })
}

/// Median of an ascending slice: middle element for odd N, mean of the two
/// middle elements for even N. Returns 0 for an empty slice.
pub(crate) fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    if n % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Ascending copy of the samples; the caller's slice is never reordered.
pub(crate) fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Arithmetic mean, 0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Every sample equal to the first. Sums over such a sequence need not
/// cancel exactly, so callers test this instead of a zero spread.
pub(crate) fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|&v| v == values[0])
}

fn nearest_rank(n: usize, p: f64) -> usize {
    ((n as f64 * p).floor() as usize).min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_absent() {
        assert!(compute_stats(&[]).is_none());
    }

    #[test]
    fn test_single_point() {
        let stats = compute_stats(&[42.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.median, 42.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.q1, 42.0);
        assert_eq!(stats.q3, 42.0);
        assert_eq!(stats.iqr, 0.0);
    }

    #[test]
    fn test_population_variance() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = compute_stats(&values).unwrap();
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.variance - 4.0).abs() < 1e-9);
        assert!((stats.std_dev - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_median_even_and_odd() {
        let even = compute_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(even.median, 2.5);

        let odd = compute_stats(&[5.0, 1.0, 3.0]).unwrap();
        assert_eq!(odd.median, 3.0);
    }

    #[test]
    fn test_quartiles_nearest_rank() {
        // n = 10: q1 at index 2, q3 at index 7
        let values: Vec<f64> = (1..=10).rev().map(f64::from).collect();
        let stats = compute_stats(&values).unwrap();
        assert_eq!(stats.q1, 3.0);
        assert_eq!(stats.q3, 8.0);
        assert_eq!(stats.iqr, 5.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 10.0);
    }

    #[test]
    fn test_does_not_mutate_input() {
        let values = vec![3.0, 1.0, 2.0];
        let _ = compute_stats(&values);
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_constant_sequence_has_zero_spread() {
        let values = vec![7.1; 13];
        let stats = compute_stats(&values).unwrap();
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.mean, 7.1);
    }

    #[test]
    fn test_order_invariant_holds() {
        let values = vec![9.0, -3.0, 14.5, 0.0, 2.0, 2.0, 88.0];
        let s = compute_stats(&values).unwrap();
        assert!(s.min <= s.q1 && s.q1 <= s.median && s.median <= s.q3 && s.q3 <= s.max);
    }
}
