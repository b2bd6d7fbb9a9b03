//! Short-horizon forecasting by trend extrapolation.

use crate::core::rounding::round_to;
use crate::core::trend::{detect_trend, Confidence};
use serde::{Deserialize, Serialize};

/// Default number of steps forecast by the trend report.
pub const DEFAULT_HORIZON: usize = 24;

/// A projected sample `step` positions past the end of the sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 1-based distance past the last observed sample
    pub step: usize,
    /// Never negative
    pub value: f64,
    pub confidence: Confidence,
}

impl ForecastPoint {
    /// Copy with the value rounded to 2 places for display.
    pub fn rounded(&self) -> Self {
        Self {
            value: round_to(self.value, 2),
            ..self.clone()
        }
    }
}

/// Extend the fitted trend line `horizon` steps past the sequence.
///
/// Empty when no trend can be fitted (fewer than two samples). Concentrations
/// cannot be negative, so projections are clamped at zero. Every point carries
/// the confidence of the underlying fit.
pub fn forecast(values: &[f64], horizon: usize) -> Vec<ForecastPoint> {
    let Some(trend) = detect_trend(values) else {
        return Vec::new();
    };

    let n = values.len();
    (1..=horizon)
        .map(|step| ForecastPoint {
            step,
            value: trend.value_at((n + step - 1) as f64).max(0.0),
            confidence: trend.confidence,
        })
        .collect()
}
