//! Point anomaly detection.
//!
//! Two independent strategies are provided:
//! - [`detect_anomalies`]: classic Z-score against the sequence mean
//! - [`detect_anomalies_mad`]: modified Z-score against the median, scaled by
//!   the median absolute deviation (robust to the outliers it is looking for)
//!
//! Both return records in the positional order of the input. Running both and
//! merging is left to the caller.

use crate::core::rounding::round_to;
use crate::core::stats::{compute_stats, median_of_sorted, sorted_copy};
use crate::error::{check_threshold, Result};
use serde::{Deserialize, Serialize};

/// Default Z-score threshold.
pub const DEFAULT_Z_THRESHOLD: f64 = 2.5;

/// Default modified Z-score threshold.
pub const DEFAULT_MAD_THRESHOLD: f64 = 3.5;

/// Consistency constant relating MAD to the standard deviation of a normal
/// distribution.
const MAD_SCALE: f64 = 0.6745;

/// Z-scores above `threshold * 1.5` are critical.
const Z_CRITICAL_FACTOR: f64 = 1.5;

/// Modified Z-scores above `threshold * 1.3` are critical.
const MAD_CRITICAL_FACTOR: f64 = 1.3;

/// Which side of the center a flagged sample lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Critical,
}

/// Strategy that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyMethod {
    ZScore,
    ModifiedZScore,
}

/// A flagged sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    /// Position in the source sequence
    pub index: usize,
    pub value: f64,
    /// Absolute Z-score, or the signed modified Z-score for the MAD method
    pub score: f64,
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    pub method: AnomalyMethod,
}

impl AnomalyRecord {
    /// Copy with the score rounded to 2 places for display.
    pub fn rounded(&self) -> Self {
        Self {
            score: round_to(self.score, 2),
            ..self.clone()
        }
    }
}

/// Flag samples whose Z-score exceeds `threshold`.
///
/// A zero standard deviation yields no anomalies.
pub fn detect_anomalies(values: &[f64], threshold: f64) -> Result<Vec<AnomalyRecord>> {
    check_threshold("z-score", threshold)?;

    let stats = match compute_stats(values) {
        Some(stats) if stats.std_dev > 0.0 => stats,
        _ => return Ok(Vec::new()),
    };

    let anomalies: Vec<AnomalyRecord> = values
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let z = ((value - stats.mean) / stats.std_dev).abs();
            (z > threshold).then(|| AnomalyRecord {
                index,
                value,
                score: z,
                anomaly_type: if value > stats.mean {
                    AnomalyType::High
                } else {
                    AnomalyType::Low
                },
                severity: if z > threshold * Z_CRITICAL_FACTOR {
                    Severity::Critical
                } else {
                    Severity::Warning
                },
                method: AnomalyMethod::ZScore,
            })
        })
        .collect();

    tracing::debug!(
        "Detected {} anomalies in {} data points",
        anomalies.len(),
        values.len()
    );
    Ok(anomalies)
}

/// Flag samples whose modified Z-score magnitude exceeds `threshold`.
///
/// The center is the median (mean of the two middle samples for even N). The
/// MAD is taken at sorted position `floor(N / 2)` of the absolute deviations
/// with no averaging. A MAD of zero is replaced by a divisor of 1.
pub fn detect_anomalies_mad(values: &[f64], threshold: f64) -> Result<Vec<AnomalyRecord>> {
    check_threshold("modified z-score", threshold)?;

    if values.is_empty() {
        return Ok(Vec::new());
    }

    let median = median_of_sorted(&sorted_copy(values));
    let deviations: Vec<f64> = values.iter().map(|v| (v - median).abs()).collect();
    let mad = sorted_copy(&deviations)[values.len() / 2];
    let divisor = if mad == 0.0 { 1.0 } else { mad };

    let anomalies = values
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let modified_z = MAD_SCALE * (value - median) / divisor;
            let magnitude = modified_z.abs();
            (magnitude > threshold).then(|| AnomalyRecord {
                index,
                value,
                score: modified_z,
                anomaly_type: if value > median {
                    AnomalyType::High
                } else {
                    AnomalyType::Low
                },
                severity: if magnitude > threshold * MAD_CRITICAL_FACTOR {
                    Severity::Critical
                } else {
                    Severity::Warning
                },
                method: AnomalyMethod::ModifiedZScore,
            })
        })
        .collect();

    Ok(anomalies)
}
