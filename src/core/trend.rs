//! Least-squares trend estimation over sample index.

use crate::core::rounding::round_to;
use crate::core::stats::is_constant;
use serde::{Deserialize, Serialize};

/// Slopes with magnitude at or below this are classified as stable.
const STABLE_SLOPE: f64 = 0.1;

/// Minimum R² for a directional (increasing/decreasing) classification.
const DIRECTIONAL_R_SQUARED: f64 = 0.5;

/// Direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendType {
    Increasing,
    Decreasing,
    Stable,
    Variable,
}

/// Confidence band shared by trends, forecasts and insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Band an R² value: > 0.7 high, > 0.4 medium, otherwise low.
    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared > 0.7 {
            Confidence::High
        } else if r_squared > 0.4 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Ordinary least-squares fit of value against 0-based index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; defined as 0 for a constant sequence.
    pub r_squared: f64,
    pub trend_type: TrendType,
    pub confidence: Confidence,
}

impl TrendResult {
    /// Fitted value at a sample index.
    pub fn value_at(&self, index: f64) -> f64 {
        self.slope * index + self.intercept
    }

    /// Copy rounded for display: slope to 4 places, intercept 2, R² 3.
    pub fn rounded(&self) -> Self {
        Self {
            slope: round_to(self.slope, 4),
            intercept: round_to(self.intercept, 2),
            r_squared: round_to(self.r_squared, 3),
            ..self.clone()
        }
    }
}

/// Fit a linear trend, or `None` when fewer than two samples are given.
pub fn detect_trend(values: &[f64]) -> Option<TrendResult> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    // Flat line through the value, with R² defined as 0.
    if is_constant(values) {
        return Some(TrendResult {
            slope: 0.0,
            intercept: values[0],
            r_squared: 0.0,
            trend_type: TrendType::Stable,
            confidence: Confidence::Low,
        });
    }

    let nf = n as f64;
    let (sum_x, sum_y, sum_xy, sum_x2) = values.iter().enumerate().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sx2), (i, &y)| {
            let x = i as f64;
            (sx + x, sy + y, sxy + x * y, sx2 + x * x)
        },
    );

    // Non-zero for n >= 2 since the x values are distinct.
    let slope = (nf * sum_xy - sum_x * sum_y) / (nf * sum_x2 - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / nf;

    let y_mean = sum_y / nf;
    let (ss_res, ss_tot) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(res, tot), (i, &y)| {
            let predicted = slope * i as f64 + intercept;
            (res + (y - predicted).powi(2), tot + (y - y_mean).powi(2))
        });
    // SStot can still underflow to 0 for subnormal spreads.
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    Some(TrendResult {
        slope,
        intercept,
        r_squared,
        trend_type: classify(slope, r_squared),
        confidence: Confidence::from_r_squared(r_squared),
    })
}

fn classify(slope: f64, r_squared: f64) -> TrendType {
    if slope.abs() <= STABLE_SLOPE {
        TrendType::Stable
    } else if r_squared > DIRECTIONAL_R_SQUARED {
        if slope > 0.0 {
            TrendType::Increasing
        } else {
            TrendType::Decreasing
        }
    } else {
        TrendType::Variable
    }
}
