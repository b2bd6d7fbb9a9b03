//! CUSUM change-point detection.

use crate::core::rounding::round_to;
use crate::core::stats::compute_stats;
use crate::error::{check_threshold, Result};
use serde::{Deserialize, Serialize};

/// Default cumulative-sum threshold.
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 5.0;

/// Sequences shorter than this are not examined.
pub const MIN_CHANGE_POINT_SAMPLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePoint {
    pub index: usize,
    /// Accumulated standardized deviation at the moment of detection
    pub cumulative_sum: f64,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
}

impl ChangePoint {
    /// Copy with the cumulative sum rounded to 2 places for display.
    pub fn rounded(&self) -> Self {
        Self {
            cumulative_sum: round_to(self.cumulative_sum, 2),
            ..self.clone()
        }
    }
}

/// Detect shifts in level with a resetting CUSUM.
///
/// Each sample is standardized against the whole-sequence mean and standard
/// deviation and added to a running sum. When the sum's magnitude exceeds
/// `threshold`, a change point is emitted at that index and the sum restarts
/// from zero, so several independent shifts can be reported.
///
/// Empty for fewer than ten samples or a zero standard deviation.
pub fn detect_change_points(values: &[f64], threshold: f64) -> Result<Vec<ChangePoint>> {
    check_threshold("change-point", threshold)?;

    if values.len() < MIN_CHANGE_POINT_SAMPLES {
        return Ok(Vec::new());
    }
    let stats = match compute_stats(values) {
        Some(stats) if stats.std_dev > 0.0 => stats,
        _ => return Ok(Vec::new()),
    };

    let mut cumulative_sum = 0.0;
    let mut points = Vec::new();
    for (index, &value) in values.iter().enumerate() {
        cumulative_sum += (value - stats.mean) / stats.std_dev;
        if cumulative_sum.abs() > threshold {
            points.push(ChangePoint {
                index,
                cumulative_sum,
                change_type: if cumulative_sum > 0.0 {
                    ChangeType::Increase
                } else {
                    ChangeType::Decrease
                },
            });
            cumulative_sum = 0.0;
        }
    }

    tracing::debug!("Detected {} change points", points.len());
    Ok(points)
}
