//! Additive seasonal index estimation.

use crate::core::stats::{compute_stats, mean};
use crate::error::{check_window, Result};
use serde::{Deserialize, Serialize};

/// Default period: hourly readings over a day.
pub const DEFAULT_SEASON_PERIOD: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalStrength {
    Weak,
    Moderate,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seasonality {
    pub period: usize,
    /// Mean of each phase relative to the overall mean
    pub indices: Vec<f64>,
    pub has_seasonality: bool,
    pub strength: SeasonalStrength,
}

/// Estimate per-phase seasonal indices.
///
/// `None` with fewer than two full periods of data, or when the overall mean
/// is zero and indices cannot be normalized.
pub fn detect_seasonality(values: &[f64], period: usize) -> Result<Option<Seasonality>> {
    check_window("season period", period)?;

    if values.len() / 2 < period {
        return Ok(None);
    }
    let overall = mean(values);
    if overall == 0.0 {
        return Ok(None);
    }

    let indices: Vec<f64> = (0..period)
        .map(|phase| {
            let phase_values: Vec<f64> = values
                .iter()
                .skip(phase)
                .step_by(period)
                .copied()
                .collect();
            mean(&phase_values) / overall
        })
        .collect();

    let spread = compute_stats(&indices).map_or(0.0, |s| s.std_dev);
    let strength = if spread > 0.3 {
        SeasonalStrength::Strong
    } else if spread > 0.1 {
        SeasonalStrength::Moderate
    } else {
        SeasonalStrength::Weak
    };

    Ok(Some(Seasonality {
        period,
        indices,
        has_seasonality: spread > 0.1,
        strength,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_two_periods() {
        let values = vec![1.0; 47];
        assert!(detect_seasonality(&values, 24).unwrap().is_none());
        assert!(detect_seasonality(&values, usize::MAX).unwrap().is_none());
    }

    #[test]
    fn test_flat_series_has_no_seasonality() {
        let values = vec![5.0; 48];
        let season = detect_seasonality(&values, 24).unwrap().unwrap();
        assert_eq!(season.indices.len(), 24);
        assert!(season.indices.iter().all(|&i| (i - 1.0).abs() < 1e-12));
        assert!(!season.has_seasonality);
        assert_eq!(season.strength, SeasonalStrength::Weak);
    }

    #[test]
    fn test_alternating_pattern() {
        // Period 2: phase means 50 and 150, overall 100 -> indices 0.5, 1.5
        let values: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 50.0 } else { 150.0 })
            .collect();
        let season = detect_seasonality(&values, 2).unwrap().unwrap();
        assert!((season.indices[0] - 0.5).abs() < 1e-12);
        assert!((season.indices[1] - 1.5).abs() < 1e-12);
        assert!(season.has_seasonality);
        assert_eq!(season.strength, SeasonalStrength::Strong);
    }

    #[test]
    fn test_zero_mean_is_absent() {
        let values: Vec<f64> = (0..8).map(|i| if i % 2 == 0 { -1.0 } else { 1.0 }).collect();
        assert!(detect_seasonality(&values, 2).unwrap().is_none());
        assert!(detect_seasonality(&values, 0).is_err());
    }
}
