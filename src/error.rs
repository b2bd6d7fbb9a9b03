//! Error types for the analytics core.
//!
//! Degenerate inputs (empty or single-point sequences, zero variance) are not
//! errors: the core answers them with `None` or an empty list. The variants
//! here cover parameters and samples the core refuses to work with.

use thiserror::Error;

/// Validation failures raised at the boundary of the analytics functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("invalid {name} threshold: {value} (must be finite and > 0)")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("invalid {name}: {value} (must be > 0)")]
    InvalidWindow { name: &'static str, value: usize },

    #[error("invalid smoothing factor: {0} (must be in (0, 1])")]
    InvalidSmoothingFactor(f64),

    #[error("non-finite sample in {analyte} at index {index}")]
    NonFiniteSample { analyte: String, index: usize },

    #[error("sequence of length {len} exceeds the limit of {max}")]
    SequenceTooLong { len: usize, max: usize },

    #[error("row dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("unknown period token: {0}")]
    UnknownPeriod(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Reject thresholds that are NaN, infinite, zero or negative.
pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidThreshold { name, value })
    }
}

/// Reject zero-sized windows, periods and cluster counts.
pub(crate) fn check_window(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        Err(AnalyticsError::InvalidWindow { name, value })
    } else {
        Ok(())
    }
}

/// Check that every sample of a sequence is a finite number.
pub fn validate_samples(analyte: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(AnalyticsError::NonFiniteSample {
            analyte: analyte.to_string(),
            index,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_validation() {
        assert!(check_threshold("z-score", 2.5).is_ok());
        assert!(check_threshold("z-score", 0.0).is_err());
        assert!(check_threshold("z-score", -1.0).is_err());
        assert!(check_threshold("z-score", f64::NAN).is_err());
        assert!(check_threshold("z-score", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_samples_reports_index() {
        let err = validate_samples("serotonin", &[1.0, 2.0, f64::NAN]).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::NonFiniteSample {
                analyte: "serotonin".to_string(),
                index: 2
            }
        );
        assert!(validate_samples("serotonin", &[]).is_ok());
    }
}
