//! Stored sensor readings and period windowing.
//!
//! Readings are what the persistence layer hands over: a timestamp plus an
//! open set of numeric analyte fields. This module selects the readings that
//! fall inside a period and turns them into a [`SequenceBundle`] for the core.

use crate::config::AnalyteChannel;
use crate::core::series::SequenceBundle;
use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// A single multi-analyte reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Analyte fields such as `serotonin_nm` or `ph_level`
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Reading {
    pub fn new(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style setter for a numeric field.
    pub fn with(mut self, field: &str, value: f64) -> Self {
        self.fields.insert(field.to_string(), serde_json::json!(value));
        self
    }

    /// Finite numeric value of a field, if present.
    pub fn value(&self, field: &str) -> Option<f64> {
        self.fields
            .get(field)
            .and_then(|v| v.as_f64())
            .filter(|v| v.is_finite())
    }

    /// Value for an analyte name: `<name>_nm` first, then `<name>` itself.
    pub fn analyte_value(&self, name: &str) -> Option<f64> {
        self.value(&format!("{name}_nm"))
            .or_else(|| self.value(name))
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp_ms).single()
    }
}

/// Load a JSON array of readings from disk.
pub fn load_readings(path: &Path) -> std::io::Result<Vec<Reading>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(std::io::Error::other)
}

/// Build one sequence per panel channel, in panel order.
///
/// A reading missing a channel's field contributes nothing to that channel.
pub fn sequence_bundle(readings: &[Reading], panel: &[AnalyteChannel]) -> Result<SequenceBundle> {
    let mut bundle = SequenceBundle::new();
    for channel in panel {
        let values: Vec<f64> = readings
            .iter()
            .filter_map(|r| r.value(&channel.field))
            .collect();
        bundle.insert(channel.name.clone(), values)?;
    }
    Ok(bundle)
}

/// Like [`sequence_bundle`], restricted to readings that carry every channel.
///
/// All sequences then have one sample per kept reading, in the same order.
pub fn complete_bundle(readings: &[Reading], panel: &[AnalyteChannel]) -> Result<SequenceBundle> {
    let complete: Vec<Reading> = readings
        .iter()
        .filter(|r| panel.iter().all(|c| r.value(&c.field).is_some()))
        .cloned()
        .collect();
    sequence_bundle(&complete, panel)
}

/// Values of two fields from the readings that carry both, paired by reading.
pub fn paired_values(readings: &[Reading], first: &str, second: &str) -> (Vec<f64>, Vec<f64>) {
    readings
        .iter()
        .filter_map(|r| Some((r.value(first)?, r.value(second)?)))
        .unzip()
}

/// A look-back period resolved against the newest reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl Period {
    /// Length of the period, `None` for [`Period::All`].
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Period::Day => Some(Duration::hours(24)),
            Period::Week => Some(Duration::days(7)),
            Period::Month => Some(Duration::days(30)),
            Period::Year => Some(Duration::days(365)),
            Period::All => None,
        }
    }
}

impl FromStr for Period {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" | "1d" | "day" => Ok(Period::Day),
            "7d" | "week" => Ok(Period::Week),
            "30d" | "month" => Ok(Period::Month),
            "365d" | "year" => Ok(Period::Year),
            "all" => Ok(Period::All),
            other => Err(AnalyticsError::UnknownPeriod(other.to_string())),
        }
    }
}

/// The time span selected for an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingWindow {
    pub start_ms: i64,
    pub end_ms: i64,
    pub readings: Vec<Reading>,
}

impl ReadingWindow {
    /// Select the readings inside `period`, ending at the newest reading.
    ///
    /// The result is sorted by ascending timestamp.
    pub fn select(readings: &[Reading], period: Period) -> Self {
        let mut sorted = readings.to_vec();
        sorted.sort_by_key(|r| r.timestamp_ms);

        let end_ms = sorted.last().map_or(0, |r| r.timestamp_ms);
        let start_ms = match period.duration() {
            Some(span) => end_ms - span.num_milliseconds(),
            None => sorted.first().map_or(0, |r| r.timestamp_ms),
        };

        let readings: Vec<Reading> = sorted
            .into_iter()
            .filter(|r| r.timestamp_ms >= start_ms)
            .collect();

        Self {
            start_ms,
            end_ms,
            readings,
        }
    }

    /// Check if a timestamp falls within this window.
    pub fn contains(&self, timestamp_ms: i64) -> bool {
        timestamp_ms >= self.start_ms && timestamp_ms <= self.end_ms
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_panel;

    const HOUR_MS: i64 = 3_600_000;

    fn hourly(count: i64) -> Vec<Reading> {
        (0..count)
            .map(|i| {
                Reading::new(i * HOUR_MS)
                    .with("serotonin_nm", 100.0 + i as f64)
                    .with("dopamine_nm", 300.0)
            })
            .collect()
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("24h".parse::<Period>().unwrap(), Period::Day);
        assert_eq!("7d".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("Month".parse::<Period>().unwrap(), Period::Month);
        assert_eq!("all".parse::<Period>().unwrap(), Period::All);
        assert!("fortnight".parse::<Period>().is_err());
    }

    #[test]
    fn test_window_selects_trailing_period() {
        let mut readings = hourly(72);
        readings.reverse();

        let window = ReadingWindow::select(&readings, Period::Day);
        assert_eq!(window.end_ms, 71 * HOUR_MS);
        // Hours 47..=71
        assert_eq!(window.len(), 25);
        assert!(window
            .readings
            .windows(2)
            .all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
        assert!(window.contains(50 * HOUR_MS));
        assert!(!window.contains(10 * HOUR_MS));
        assert_eq!(window.latest().unwrap().timestamp_ms, 71 * HOUR_MS);

        let all = ReadingWindow::select(&readings, Period::All);
        assert_eq!(all.len(), 72);
    }

    #[test]
    fn test_empty_window() {
        let window = ReadingWindow::select(&[], Period::Week);
        assert!(window.is_empty());
        assert!(window.latest().is_none());
    }

    #[test]
    fn test_analyte_value_lookup() {
        let reading = Reading::new(0)
            .with("serotonin_nm", 120.0)
            .with("ph_level", 7.1)
            .with("calprotectin", 12.0);
        assert_eq!(reading.analyte_value("serotonin"), Some(120.0));
        assert_eq!(reading.analyte_value("ph_level"), Some(7.1));
        assert_eq!(reading.analyte_value("calprotectin"), Some(12.0));
        assert_eq!(reading.analyte_value("gaba"), None);
    }

    #[test]
    fn test_reading_json_shape() {
        let json = r#"{"timestamp_ms": 1000, "serotonin_nm": 150.5, "device_id": "abc"}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.timestamp_ms, 1000);
        assert_eq!(reading.value("serotonin_nm"), Some(150.5));
        assert_eq!(reading.value("device_id"), None);
        assert!(reading.timestamp().is_some());
    }

    #[test]
    fn test_sequence_bundle_follows_panel() {
        let mut readings = hourly(5);
        readings[2].fields.remove("dopamine_nm");

        let bundle = sequence_bundle(&readings, &default_panel()).unwrap();
        let names: Vec<&str> = bundle.names().collect();
        assert_eq!(names, vec!["serotonin", "dopamine", "gaba", "ph"]);
        assert_eq!(bundle.get("serotonin").unwrap().len(), 5);
        assert_eq!(bundle.get("dopamine").unwrap().len(), 4);
        assert!(bundle.get("gaba").unwrap().is_empty());
    }

    #[test]
    fn test_paired_values_stay_aligned() {
        let mut readings = hourly(6);
        readings[0].fields.remove("serotonin_nm");
        readings[1].fields.remove("dopamine_nm");

        let (serotonin, dopamine) = paired_values(&readings, "serotonin_nm", "dopamine_nm");
        assert_eq!(serotonin, vec![102.0, 103.0, 104.0, 105.0]);
        assert_eq!(dopamine, vec![300.0; 4]);
    }

    #[test]
    fn test_complete_bundle_drops_partial_readings() {
        let panel = &default_panel()[..2];
        let mut readings = hourly(5);
        readings[3].fields.remove("serotonin_nm");

        let bundle = complete_bundle(&readings, panel).unwrap();
        assert_eq!(bundle.get("serotonin"), Some(&[100.0, 101.0, 102.0, 104.0][..]));
        assert_eq!(bundle.get("dopamine").unwrap().len(), 4);
    }
}
