//! Recurring sub-sequence search.
//!
//! Every window is correlated against every later non-overlapping window,
//! which costs O(N² · L). This is a batch operation: callers must pass an
//! upper bound on the sequence length they are prepared to scan.

use crate::core::correlation::correlate;
use crate::error::{check_threshold, check_window, AnalyticsError, Result};
use serde::{Deserialize, Serialize};

/// Default upper bound on the scanned sequence length.
pub const DEFAULT_MAX_PATTERN_SCAN: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatch {
    /// Start of the reference window
    pub original_index: usize,
    /// Start of the matching window
    pub match_index: usize,
    pub correlation: f64,
    pub length: usize,
}

/// Find pairs of windows of `length` samples whose Pearson correlation
/// magnitude is at least `threshold`.
///
/// Empty when the sequence holds fewer than two windows. Fails with
/// [`AnalyticsError::SequenceTooLong`] when the sequence exceeds `max_len`.
pub fn find_similar_patterns(
    values: &[f64],
    length: usize,
    threshold: f64,
    max_len: usize,
) -> Result<Vec<PatternMatch>> {
    check_window("pattern length", length)?;
    check_threshold("pattern similarity", threshold)?;
    if values.len() > max_len {
        return Err(AnalyticsError::SequenceTooLong {
            len: values.len(),
            max: max_len,
        });
    }

    if values.len() / 2 < length {
        return Ok(Vec::new());
    }

    let last_start = values.len() - length;
    let mut matches = Vec::new();
    for i in 0..=last_start {
        let pattern = &values[i..i + length];
        for j in (i + length)..=last_start {
            let candidate = &values[j..j + length];
            if let Some(result) = correlate(pattern, candidate) {
                if result.coefficient.abs() >= threshold {
                    matches.push(PatternMatch {
                        original_index: i,
                        match_index: j,
                        correlation: result.coefficient,
                        length,
                    });
                }
            }
        }
    }

    tracing::debug!("Found {} similar pattern pairs", matches.len());
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_shape_is_found() {
        let shape = [1.0, 5.0, 2.0, 8.0];
        let mut values = shape.to_vec();
        values.extend_from_slice(&[3.0, 3.0]);
        values.extend(shape.iter().map(|v| v * 2.0 + 10.0));

        let matches = find_similar_patterns(&values, 4, 0.99, 100).unwrap();
        let hit = matches
            .iter()
            .find(|m| m.original_index == 0 && m.match_index == 6)
            .unwrap();
        assert!((hit.correlation - 1.0).abs() < 1e-9);
        assert_eq!(hit.length, 4);
        assert!(matches.iter().all(|m| m.match_index >= m.original_index + 4));
    }

    #[test]
    fn test_too_short_is_empty() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(find_similar_patterns(&values, 3, 0.8, 100).unwrap().is_empty());
        assert!(find_similar_patterns(&values, usize::MAX, 0.8, 100)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_length_guard() {
        let values = vec![0.0; 50];
        let err = find_similar_patterns(&values, 5, 0.8, 20).unwrap_err();
        assert_eq!(err, AnalyticsError::SequenceTooLong { len: 50, max: 20 });
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(find_similar_patterns(&[1.0; 10], 0, 0.8, 100).is_err());
        assert!(find_similar_patterns(&[1.0; 10], 2, -0.8, 100).is_err());
    }
}
