//! Configuration for the Symbion analytics engine.

use crate::core::anomaly::{DEFAULT_MAD_THRESHOLD, DEFAULT_Z_THRESHOLD};
use crate::core::changepoint::DEFAULT_CHANGE_THRESHOLD;
use crate::core::forecast::DEFAULT_HORIZON;
use crate::core::insights::InsightOptions;
use crate::core::risk::{default_reference_ranges, ReferenceRanges};
use crate::core::smoothing::DEFAULT_MOVING_AVERAGE_WINDOW;
use crate::error::{check_threshold, check_window, AnalyticsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration for the analytics engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detector thresholds and report sizes
    pub thresholds: Thresholds,

    /// Analytes analyzed, in report order
    pub panel: Vec<AnalyteChannel>,

    /// Analytes examined for insights
    pub insight_analytes: Vec<String>,

    /// Reference ranges for risk assessment
    pub reference_ranges: ReferenceRanges,

    /// Default directory for report output
    pub export_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("symbion-analytics");

        Self {
            thresholds: Thresholds::default(),
            panel: default_panel(),
            insight_analytes: InsightOptions::default().analytes,
            reference_ranges: default_reference_ranges(),
            export_path: data_dir.join("reports"),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, falling back to defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("symbion-analytics")
            .join("config.json")
    }

    /// Check every threshold with the rules the detectors apply.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        check_threshold("z-score", t.z_score)?;
        check_threshold("modified z-score", t.mad)?;
        check_threshold("change-point", t.change_point)?;
        check_threshold("anomaly ratio", t.anomaly_insight_ratio)?;
        check_window("moving-average window", t.moving_average_window)?;
        Ok(())
    }

    /// Insight options derived from this configuration.
    pub fn insight_options(&self) -> InsightOptions {
        InsightOptions {
            analytes: self.insight_analytes.clone(),
            min_samples: self.thresholds.min_insight_samples,
            z_threshold: self.thresholds.z_score,
            anomaly_ratio: self.thresholds.anomaly_insight_ratio,
        }
    }
}

/// Detector thresholds and report sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub z_score: f64,
    pub mad: f64,
    pub change_point: f64,
    pub min_insight_samples: usize,
    pub anomaly_insight_ratio: f64,
    pub forecast_horizon: usize,
    pub moving_average_window: usize,
    /// Correlations at or below this magnitude are left out of the ranking
    pub correlation_report_min: f64,
    pub correlation_report_limit: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        let insights = InsightOptions::default();
        Self {
            z_score: DEFAULT_Z_THRESHOLD,
            mad: DEFAULT_MAD_THRESHOLD,
            change_point: DEFAULT_CHANGE_THRESHOLD,
            min_insight_samples: insights.min_samples,
            anomaly_insight_ratio: insights.anomaly_ratio,
            forecast_horizon: DEFAULT_HORIZON,
            moving_average_window: DEFAULT_MOVING_AVERAGE_WINDOW,
            correlation_report_min: 0.3,
            correlation_report_limit: 5,
        }
    }
}

/// Maps an analyte name to the reading field holding its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyteChannel {
    pub name: String,
    pub field: String,
}

impl AnalyteChannel {
    pub fn new(name: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            field: field.to_string(),
        }
    }
}

/// The standard neurochemical panel.
pub fn default_panel() -> Vec<AnalyteChannel> {
    vec![
        AnalyteChannel::new("serotonin", "serotonin_nm"),
        AnalyteChannel::new("dopamine", "dopamine_nm"),
        AnalyteChannel::new("gaba", "gaba_nm"),
        AnalyteChannel::new("ph", "ph_level"),
    ]
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] AnalyticsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.thresholds.z_score, 2.5);
        assert_eq!(config.thresholds.mad, 3.5);
        assert_eq!(config.panel.len(), 4);
        assert_eq!(config.panel[3].field, "ph_level");
        assert_eq!(config.reference_ranges["serotonin"].min, 50.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_thresholds_match_detectors() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.z_score, DEFAULT_Z_THRESHOLD);
        assert_eq!(thresholds.change_point, 5.0);
        assert_eq!(thresholds.forecast_horizon, 24);
        assert_eq!(thresholds.moving_average_window, 12);

        let options = Config::default().insight_options();
        assert_eq!(options, InsightOptions::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let json = r#"{"thresholds": {"z_score": 3.0}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.thresholds.z_score, 3.0);
        assert_eq!(config.thresholds.mad, 3.5);
        assert_eq!(config.panel, default_panel());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = Config::default();
        config.thresholds.mad = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.thresholds.forecast_horizon = 6;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.thresholds.forecast_horizon, 6);
        assert_eq!(loaded.panel, config.panel);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.thresholds, Thresholds::default());
    }

    #[test]
    fn test_insight_options() {
        let options = Config::default().insight_options();
        assert_eq!(options.analytes, vec!["serotonin", "dopamine", "gaba"]);
        assert_eq!(options.min_samples, 10);
    }
}
