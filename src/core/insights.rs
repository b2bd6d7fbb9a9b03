//! Human-readable insights derived from trend and anomaly results.

use crate::core::anomaly::{detect_anomalies, DEFAULT_Z_THRESHOLD};
use crate::core::series::SequenceBundle;
use crate::core::trend::{detect_trend, Confidence, TrendType};
use crate::error::{check_threshold, Result};
use serde::{Deserialize, Serialize};

/// Parameters of insight generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightOptions {
    /// Analytes examined, in output order
    pub analytes: Vec<String>,
    /// Samples each analyte needs before insights are produced
    pub min_samples: usize,
    /// Z-score threshold for the anomaly check
    pub z_threshold: f64,
    /// Anomaly insight emitted when anomalies exceed this share of samples
    pub anomaly_ratio: f64,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            analytes: vec![
                "serotonin".to_string(),
                "dopamine".to_string(),
                "gaba".to_string(),
            ],
            min_samples: 10,
            z_threshold: DEFAULT_Z_THRESHOLD,
            anomaly_ratio: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Trend,
    Anomaly,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyte: Option<String>,
    pub message: String,
    pub confidence: Confidence,
    /// Trend slope behind a trend insight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Anomaly count behind an anomaly insight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Insight {
    fn collect_more_data() -> Self {
        Self {
            insight_type: InsightType::Info,
            analyte: None,
            message: "Collect more data for personalized insights".to_string(),
            confidence: Confidence::Low,
            value: None,
            count: None,
        }
    }
}

/// Produce trend and anomaly insights for the configured analytes.
///
/// If any examined analyte is missing or has fewer than `min_samples`
/// samples, a single low-confidence "collect more data" insight is returned.
pub fn generate_insights(bundle: &SequenceBundle, options: &InsightOptions) -> Result<Vec<Insight>> {
    check_threshold("z-score", options.z_threshold)?;
    check_threshold("anomaly ratio", options.anomaly_ratio)?;

    let series: Option<Vec<(&str, &[f64])>> = options
        .analytes
        .iter()
        .map(|name| {
            bundle
                .get(name)
                .filter(|values| values.len() >= options.min_samples)
                .map(|values| (name.as_str(), values))
        })
        .collect();

    let Some(series) = series else {
        return Ok(vec![Insight::collect_more_data()]);
    };

    let mut insights = Vec::new();
    for (name, values) in series {
        if let Some(trend) = detect_trend(values) {
            let direction = match trend.trend_type {
                TrendType::Increasing => Some("increasing"),
                TrendType::Decreasing => Some("decreasing"),
                TrendType::Stable | TrendType::Variable => None,
            };
            if let Some(direction) = direction.filter(|_| trend.confidence != Confidence::Low) {
                insights.push(Insight {
                    insight_type: InsightType::Trend,
                    analyte: Some(name.to_string()),
                    message: format!("{name} levels are {direction}"),
                    confidence: trend.confidence,
                    value: Some(trend.slope),
                    count: None,
                });
            }
        }

        let anomalies = detect_anomalies(values, options.z_threshold)?;
        if anomalies.len() as f64 > values.len() as f64 * options.anomaly_ratio {
            insights.push(Insight {
                insight_type: InsightType::Anomaly,
                analyte: Some(name.to_string()),
                message: format!("Unusual variability detected in {name}"),
                confidence: Confidence::Medium,
                value: None,
                count: Some(anomalies.len()),
            });
        }
    }

    Ok(insights)
}
