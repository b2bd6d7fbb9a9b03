//! Moving-average smoothing.

use crate::core::stats::mean;
use crate::error::{check_window, AnalyticsError, Result};

/// Default window used by the trend report.
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 12;

/// Centered moving average.
///
/// Sample `i` averages `window` samples starting at `i - window / 2`, with the
/// window shifted inward (and shortened at the tail) near the ends. A
/// sequence shorter than the window is returned unchanged.
pub fn moving_average(values: &[f64], window: usize) -> Result<Vec<f64>> {
    check_window("moving-average window", window)?;

    if values.len() < window {
        return Ok(values.to_vec());
    }

    Ok((0..values.len())
        .map(|i| {
            let start = i.saturating_sub(window / 2);
            let end = (start + window).min(values.len());
            mean(&values[start..end])
        })
        .collect())
}

/// Exponential moving average seeded with the first sample.
pub fn exponential_moving_average(values: &[f64], alpha: f64) -> Result<Vec<f64>> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(AnalyticsError::InvalidSmoothingFactor(alpha));
    }

    let mut smoothed: Vec<f64> = Vec::with_capacity(values.len());
    for &value in values {
        let next = match smoothed.last() {
            Some(&prev) => alpha * value + (1.0 - alpha) * prev,
            None => value,
        };
        smoothed.push(next);
    }
    Ok(smoothed)
}
