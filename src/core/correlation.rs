//! Pearson correlation between analyte sequences.

use crate::core::rounding::round_to;
use crate::core::series::SequenceBundle;
use crate::core::stats::{is_constant, mean};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
    /// Reserved for an analyte paired with itself.
    Perfect,
}

impl CorrelationStrength {
    fn from_coefficient(coefficient: f64) -> Self {
        let magnitude = coefficient.abs();
        if magnitude > 0.7 {
            CorrelationStrength::Strong
        } else if magnitude > 0.4 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Pearson coefficient in [-1, 1]
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
}

impl CorrelationResult {
    /// The diagonal entry of a correlation matrix.
    pub fn perfect() -> Self {
        Self {
            coefficient: 1.0,
            strength: CorrelationStrength::Perfect,
            direction: CorrelationDirection::Positive,
        }
    }

    fn from_coefficient(coefficient: f64) -> Self {
        Self {
            coefficient,
            strength: CorrelationStrength::from_coefficient(coefficient),
            direction: if coefficient >= 0.0 {
                CorrelationDirection::Positive
            } else {
                CorrelationDirection::Negative
            },
        }
    }

    /// Copy with the coefficient rounded to 3 places for display.
    pub fn rounded(&self) -> Self {
        Self {
            coefficient: round_to(self.coefficient, 3),
            ..self.clone()
        }
    }
}

/// Pearson correlation of two equal-length sequences.
///
/// `None` when the lengths differ or either sequence is empty. A constant
/// sequence has no defined correlation; its coefficient is reported as 0.
/// A coefficient of exactly 0 is classified as positive.
pub fn correlate(x: &[f64], y: &[f64]) -> Option<CorrelationResult> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    if is_constant(x) || is_constant(y) {
        return Some(CorrelationResult::from_coefficient(0.0));
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let (numerator, sum_sq_x, sum_sq_y) =
        x.iter()
            .zip(y)
            .fold((0.0, 0.0, 0.0), |(num, sx, sy), (&xi, &yi)| {
                let dx = xi - mean_x;
                let dy = yi - mean_y;
                (num + dx * dy, sx + dx * dx, sy + dy * dy)
            });

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    let coefficient = if denominator > 0.0 {
        (numerator / denominator).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    Some(CorrelationResult::from_coefficient(coefficient))
}

/// Square correlation matrix over the analytes of a bundle, in bundle order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub analytes: Vec<String>,
    /// `cells[i][j]` correlates `analytes[i]` with `analytes[j]`; `None` where
    /// the pair has no defined correlation (length mismatch or empty).
    pub cells: Vec<Vec<Option<CorrelationResult>>>,
}

/// An off-diagonal matrix entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub first: String,
    pub second: String,
    #[serde(flatten)]
    pub result: CorrelationResult,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<&CorrelationResult> {
        let i = self.analytes.iter().position(|n| n == a)?;
        let j = self.analytes.iter().position(|n| n == b)?;
        self.cells[i][j].as_ref()
    }

    /// Build a matrix from a pairwise correlation.
    ///
    /// `pair(i, j)` is called once per unordered pair with `i < j`. The
    /// diagonal is perfect and the lower triangle mirrors the upper one.
    pub fn from_pairs<F>(analytes: Vec<String>, mut pair: F) -> Self
    where
        F: FnMut(usize, usize) -> Option<CorrelationResult>,
    {
        let n = analytes.len();
        let mut cells = vec![vec![None; n]; n];
        for i in 0..n {
            cells[i][i] = Some(CorrelationResult::perfect());
            for j in (i + 1)..n {
                let result = pair(i, j);
                cells[j][i] = result.clone();
                cells[i][j] = result;
            }
        }
        Self { analytes, cells }
    }

    /// Upper-triangle pairs with `|r| > min_abs`, strongest first, at most `limit`.
    pub fn strongest_pairs(&self, min_abs: f64, limit: usize) -> Vec<CorrelationPair> {
        let mut pairs: Vec<CorrelationPair> = Vec::new();
        for (i, first) in self.analytes.iter().enumerate() {
            for (j, second) in self.analytes.iter().enumerate().skip(i + 1) {
                if let Some(result) = &self.cells[i][j] {
                    if result.coefficient.abs() > min_abs {
                        pairs.push(CorrelationPair {
                            first: first.clone(),
                            second: second.clone(),
                            result: result.clone(),
                        });
                    }
                }
            }
        }

        // Stable sort keeps matrix order among equal magnitudes.
        pairs.sort_by(|a, b| {
            b.result
                .coefficient
                .abs()
                .total_cmp(&a.result.coefficient.abs())
        });
        pairs.truncate(limit);
        pairs
    }

    /// Copy with every coefficient rounded for display.
    pub fn rounded(&self) -> Self {
        Self {
            analytes: self.analytes.clone(),
            cells: self
                .cells
                .iter()
                .map(|row| row.iter().map(|c| c.as_ref().map(|r| r.rounded())).collect())
                .collect(),
        }
    }
}

/// Correlate every analyte of the bundle with every other one.
///
/// Sequences are paired by position, so they must already be aligned.
pub fn correlation_matrix(bundle: &SequenceBundle) -> CorrelationMatrix {
    let series: Vec<_> = bundle.iter().collect();
    CorrelationMatrix::from_pairs(
        series.iter().map(|s| s.name.clone()).collect(),
        |i, j| correlate(&series[i].values, &series[j].values),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: f64, step: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| start + step * i as f64).collect()
    }

    #[test]
    fn test_perfect_positive() {
        let a = ramp(1000.0, 10.0, 30);
        let b = ramp(500.0, 5.0, 30);
        let result = correlate(&a, &b).unwrap();
        assert!((result.coefficient - 1.0).abs() < 1e-9);
        assert_eq!(result.strength, CorrelationStrength::Strong);
        assert_eq!(result.direction, CorrelationDirection::Positive);
    }

    #[test]
    fn test_negative() {
        let a = ramp(1000.0, 10.0, 30);
        let b = ramp(2000.0, -3.0, 30);
        let result = correlate(&a, &b).unwrap();
        assert!((result.coefficient + 1.0).abs() < 1e-9);
        assert_eq!(result.direction, CorrelationDirection::Negative);
    }

    #[test]
    fn test_absent_for_mismatch_or_empty() {
        assert!(correlate(&[1.0, 2.0], &[1.0]).is_none());
        assert!(correlate(&[], &[]).is_none());
    }

    #[test]
    fn test_constant_sequence_gives_zero() {
        let a = ramp(1.0, 1.0, 10);
        let b = vec![6.5; 10];
        let result = correlate(&a, &b).unwrap();
        assert_eq!(result.coefficient, 0.0);
        assert_eq!(result.strength, CorrelationStrength::Weak);
        assert_eq!(result.direction, CorrelationDirection::Positive);
    }

    #[test]
    fn test_inexact_constant_gives_zero() {
        let a = ramp(1.0, 1.0, 10);
        for constant in [vec![0.7; 10], vec![0.1; 10]] {
            let result = correlate(&a, &constant).unwrap();
            assert_eq!(result.coefficient, 0.0);
            assert_eq!(result.direction, CorrelationDirection::Positive);

            let reversed = correlate(&constant, &a).unwrap();
            assert_eq!(reversed.coefficient, 0.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let a = vec![1.0, 4.0, 2.0, 8.0, 5.0, 7.0];
        let b = vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0];
        let ab = correlate(&a, &b).unwrap();
        let ba = correlate(&b, &a).unwrap();
        assert_eq!(ab.coefficient, ba.coefficient);
    }

    #[test]
    fn test_moderate_band() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b = vec![2.0, 1.0, 4.0, 3.0, 3.0];
        let result = correlate(&a, &b).unwrap();
        // r = 4 / sqrt(52)
        assert!((result.coefficient - 4.0 / 52f64.sqrt()).abs() < 1e-9);
        assert_eq!(result.strength, CorrelationStrength::Moderate);
    }

    #[test]
    fn test_matrix_diagonal_and_order() {
        let bundle = SequenceBundle::new()
            .with("serotonin", ramp(1000.0, 10.0, 30))
            .unwrap()
            .with("dopamine", ramp(500.0, 5.0, 30))
            .unwrap()
            .with("gaba", ramp(2000.0, -3.0, 30))
            .unwrap()
            .with("ph", vec![6.5; 12])
            .unwrap();
        let matrix = correlation_matrix(&bundle);

        assert_eq!(matrix.analytes, vec!["serotonin", "dopamine", "gaba", "ph"]);
        for name in &matrix.analytes {
            let diag = matrix.get(name, name).unwrap();
            assert_eq!(diag.coefficient, 1.0);
            assert_eq!(diag.strength, CorrelationStrength::Perfect);
        }
        assert!(matrix.get("serotonin", "ph").is_none());

        let sd = matrix.get("serotonin", "dopamine").unwrap().coefficient;
        let ds = matrix.get("dopamine", "serotonin").unwrap().coefficient;
        assert_eq!(sd, ds);
    }

    #[test]
    fn test_from_pairs_visits_upper_triangle() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut visited = Vec::new();
        let matrix = CorrelationMatrix::from_pairs(names, |i, j| {
            visited.push((i, j));
            (j - i == 1).then(|| CorrelationResult::from_coefficient(-0.5))
        });

        assert_eq!(visited, vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(matrix.get("b", "a").unwrap().coefficient, -0.5);
        assert!(matrix.get("a", "c").is_none());
        assert!(matrix.get("c", "a").is_none());
        assert_eq!(matrix.get("c", "c").unwrap().strength, CorrelationStrength::Perfect);
    }

    #[test]
    fn test_strongest_pairs() {
        let bundle = SequenceBundle::new()
            .with("a", vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .with("b", vec![2.0, 1.0, 4.0, 3.0, 3.0])
            .unwrap()
            .with("c", vec![5.0, 4.0, 3.0, 2.0, 1.0])
            .unwrap();
        let pairs = correlation_matrix(&bundle).strongest_pairs(0.3, 5);

        assert_eq!(pairs.len(), 3);
        assert_eq!((pairs[0].first.as_str(), pairs[0].second.as_str()), ("a", "c"));
        assert!(pairs[0].result.coefficient < 0.0);
        assert!(pairs
            .windows(2)
            .all(|w| w[0].result.coefficient.abs() >= w[1].result.coefficient.abs()));

        let limited = correlation_matrix(&bundle).strongest_pairs(0.3, 1);
        assert_eq!(limited.len(), 1);
    }
}
