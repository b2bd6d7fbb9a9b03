//! Composite analytics reports.
//!
//! A report runs several core analyses over the readings of one period and
//! wraps the results in an envelope carrying the report identity, the
//! producer and the window that was analyzed.

use crate::config::{AnalyteChannel, Config};
use crate::core::anomaly::{detect_anomalies, detect_anomalies_mad, AnomalyRecord};
use crate::core::changepoint::{detect_change_points, ChangePoint};
use crate::core::clustering::{cluster, ClusterOptions, Clustering};
use crate::core::correlation::{correlate, CorrelationMatrix, CorrelationPair};
use crate::core::forecast::{forecast, ForecastPoint};
use crate::core::insights::{generate_insights, Insight};
use crate::core::patterns::{find_similar_patterns, PatternMatch};
use crate::core::risk::{assess_risk, RiskAssessment};
use crate::core::rounding::round_to;
use crate::core::seasonality::{detect_seasonality, Seasonality, DEFAULT_SEASON_PERIOD};
use crate::core::smoothing::moving_average;
use crate::core::stats::{compute_stats, StatsSummary};
use crate::core::trend::{detect_trend, TrendResult};
use crate::error::Result;
use crate::readings::{
    complete_bundle, paired_values, sequence_bundle, Period, Reading, ReadingWindow,
};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The name of this producer.
pub const PRODUCER_NAME: &str = "symbion-analytics";

/// Display rounding applied right before a report is serialized.
pub trait Rounded {
    fn rounded(&self) -> Self;
}

// ============================================================================
// Envelope
// ============================================================================

/// Producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    pub name: String,
    pub version: String,
    /// Unique instance identifier (UUID)
    pub instance_id: String,
}

/// The span of readings a report covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWindow {
    pub period: Period,
    /// Oldest timestamp included (RFC3339), absent for an empty window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Newest reading (RFC3339), absent for an empty window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub reading_count: usize,
}

impl ReportWindow {
    fn describe(window: &ReadingWindow, period: Period) -> Self {
        let rfc3339 = |ms: i64| Utc.timestamp_millis_opt(ms).single().map(|t| t.to_rfc3339());
        let (start, end) = if window.is_empty() {
            (None, None)
        } else {
            (rfc3339(window.start_ms), rfc3339(window.end_ms))
        };

        Self {
            period,
            start,
            end,
            reading_count: window.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<T> {
    pub report_id: String,
    /// When this report was computed (RFC3339)
    pub generated_at: String,
    pub producer: Producer,
    pub window: ReportWindow,
    pub data: T,
}

impl<T: Rounded> Rounded for Report<T> {
    fn rounded(&self) -> Self {
        Self {
            report_id: self.report_id.clone(),
            generated_at: self.generated_at.clone(),
            producer: self.producer.clone(),
            window: self.window.clone(),
            data: self.data.rounded(),
        }
    }
}

// ============================================================================
// Report bodies
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyteSummary {
    pub analyte: String,
    pub stats: Option<StatsSummary>,
    pub trend: Option<TrendResult>,
    pub anomaly_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub analytes: Vec<AnalyteSummary>,
}

impl Rounded for Summary {
    fn rounded(&self) -> Self {
        Self {
            analytes: self
                .analytes
                .iter()
                .map(|a| AnalyteSummary {
                    analyte: a.analyte.clone(),
                    stats: a.stats.as_ref().map(round_stats),
                    trend: a.trend.as_ref().map(TrendResult::rounded),
                    anomaly_count: a.anomaly_count,
                })
                .collect(),
        }
    }
}

fn round_stats(stats: &StatsSummary) -> StatsSummary {
    let r = |v: f64| round_to(v, 2);
    StatsSummary {
        count: stats.count,
        mean: r(stats.mean),
        median: r(stats.median),
        std_dev: r(stats.std_dev),
        variance: r(stats.variance),
        min: r(stats.min),
        max: r(stats.max),
        q1: r(stats.q1),
        q3: r(stats.q3),
        iqr: r(stats.iqr),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub analyte: String,
    pub data_points: usize,
    pub trend: Option<TrendResult>,
    pub moving_average: Vec<f64>,
    pub forecast: Vec<ForecastPoint>,
    pub change_points: Vec<ChangePoint>,
    pub seasonality: Option<Seasonality>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub analyses: Vec<TrendAnalysis>,
}

impl Rounded for TrendReport {
    fn rounded(&self) -> Self {
        Self {
            analyses: self
                .analyses
                .iter()
                .map(|a| TrendAnalysis {
                    analyte: a.analyte.clone(),
                    data_points: a.data_points,
                    trend: a.trend.as_ref().map(TrendResult::rounded),
                    moving_average: a.moving_average.iter().map(|v| round_to(*v, 2)).collect(),
                    forecast: a.forecast.iter().map(ForecastPoint::rounded).collect(),
                    change_points: a.change_points.iter().map(ChangePoint::rounded).collect(),
                    seasonality: a.seasonality.as_ref().map(|s| Seasonality {
                        indices: s.indices.iter().map(|v| round_to(*v, 3)).collect(),
                        ..s.clone()
                    }),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationReport {
    pub matrix: CorrelationMatrix,
    pub strongest: Vec<CorrelationPair>,
}

impl Rounded for CorrelationReport {
    fn rounded(&self) -> Self {
        Self {
            matrix: self.matrix.rounded(),
            strongest: self
                .strongest
                .iter()
                .map(|p| CorrelationPair {
                    result: p.result.rounded(),
                    ..p.clone()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyteAnomalies {
    pub analyte: String,
    pub z_score: Vec<AnomalyRecord>,
    pub mad: Vec<AnomalyRecord>,
    /// Number of z-score anomalies
    pub count: usize,
    /// `count` as a percentage of the samples
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub sensitivity: f64,
    pub analytes: Vec<AnalyteAnomalies>,
    /// Risk of the newest reading, absent for an empty window
    pub risk: Option<RiskAssessment>,
    pub insights: Vec<Insight>,
}

impl Rounded for AnomalyReport {
    fn rounded(&self) -> Self {
        Self {
            sensitivity: self.sensitivity,
            analytes: self
                .analytes
                .iter()
                .map(|a| AnalyteAnomalies {
                    analyte: a.analyte.clone(),
                    z_score: a.z_score.iter().map(AnomalyRecord::rounded).collect(),
                    mad: a.mad.iter().map(AnomalyRecord::rounded).collect(),
                    count: a.count,
                    percentage: round_to(a.percentage, 1),
                })
                .collect(),
            risk: self.risk.clone(),
            insights: self
                .insights
                .iter()
                .map(|i| Insight {
                    value: i.value.map(|v| round_to(v, 4)),
                    ..i.clone()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternReport {
    pub analyte: String,
    pub threshold: f64,
    pub matches: Vec<PatternMatch>,
}

impl Rounded for PatternReport {
    fn rounded(&self) -> Self {
        Self {
            matches: self
                .matches
                .iter()
                .map(|m| PatternMatch {
                    correlation: round_to(m.correlation, 3),
                    ..m.clone()
                })
                .collect(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReport {
    /// Centroid coordinates follow this analyte order
    pub analytes: Vec<String>,
    /// Readings carrying every panel analyte
    pub complete_readings: usize,
    pub clustering: Option<Clustering>,
}

impl Rounded for ClusterReport {
    fn rounded(&self) -> Self {
        Self {
            clustering: self.clustering.as_ref().map(|c| Clustering {
                centroids: c
                    .centroids
                    .iter()
                    .map(|row| row.iter().map(|v| round_to(*v, 2)).collect())
                    .collect(),
                ..c.clone()
            }),
            ..self.clone()
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for analytics reports over a configured panel.
pub struct ReportBuilder {
    instance_id: Uuid,
    config: Config,
}

impl ReportBuilder {
    /// Create a new report builder with a unique instance ID.
    pub fn new(config: Config) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            config,
        }
    }

    /// Get the instance ID.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn envelope<T>(&self, window: &ReadingWindow, period: Period, data: T) -> Report<T> {
        Report {
            report_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now().to_rfc3339(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: crate::VERSION.to_string(),
                instance_id: self.instance_id.to_string(),
            },
            window: ReportWindow::describe(window, period),
            data,
        }
    }

    fn select(&self, readings: &[Reading], period: Period, kind: &str) -> ReadingWindow {
        let window = ReadingWindow::select(readings, period);
        if window.is_empty() {
            tracing::warn!("No readings available for {} report", kind);
        } else {
            tracing::debug!("Selected {} readings for {} report", window.len(), kind);
        }
        window
    }

    /// Resolve an analyte name to its panel channel, or read the name as a
    /// raw field when the panel does not know it.
    fn channel(&self, analyte: &str) -> AnalyteChannel {
        self.config
            .panel
            .iter()
            .find(|c| c.name == analyte || c.field == analyte)
            .cloned()
            .unwrap_or_else(|| AnalyteChannel::new(analyte, analyte))
    }

    /// Statistics, trend and anomaly count for every panel analyte.
    pub fn summarize(&self, readings: &[Reading], period: Period) -> Result<Report<Summary>> {
        let window = self.select(readings, period, "summary");
        let bundle = sequence_bundle(&window.readings, &self.config.panel)?;

        let mut analytes = Vec::with_capacity(bundle.len());
        for series in bundle.iter() {
            analytes.push(AnalyteSummary {
                analyte: series.name.clone(),
                stats: compute_stats(&series.values),
                trend: detect_trend(&series.values),
                anomaly_count: detect_anomalies(&series.values, self.config.thresholds.z_score)?
                    .len(),
            });
        }

        Ok(self.envelope(&window, period, Summary { analytes }))
    }

    /// Trend, smoothing, forecast and change points for one analyte, or for
    /// every panel analyte when `analyte` is `None`.
    pub fn analyze_trend(
        &self,
        readings: &[Reading],
        period: Period,
        analyte: Option<&str>,
        horizon: usize,
    ) -> Result<Report<TrendReport>> {
        let window = self.select(readings, period, "trend");
        let channels = match analyte {
            Some(name) => vec![self.channel(name)],
            None => self.config.panel.clone(),
        };
        let bundle = sequence_bundle(&window.readings, &channels)?;
        let thresholds = &self.config.thresholds;

        let mut analyses = Vec::with_capacity(bundle.len());
        for series in bundle.iter() {
            let values = &series.values;
            analyses.push(TrendAnalysis {
                analyte: series.name.clone(),
                data_points: values.len(),
                trend: detect_trend(values),
                moving_average: moving_average(values, thresholds.moving_average_window)?,
                forecast: forecast(values, horizon),
                change_points: detect_change_points(values, thresholds.change_point)?,
                seasonality: detect_seasonality(values, DEFAULT_SEASON_PERIOD)?,
            });
        }

        Ok(self.envelope(&window, period, TrendReport { analyses }))
    }

    /// Correlation matrix of the panel and its strongest off-diagonal pairs.
    ///
    /// Each pair is correlated over the readings that carry both analytes.
    pub fn correlation_report(
        &self,
        readings: &[Reading],
        period: Period,
    ) -> Result<Report<CorrelationReport>> {
        let window = self.select(readings, period, "correlation");
        let panel = &self.config.panel;

        let matrix = CorrelationMatrix::from_pairs(
            panel.iter().map(|c| c.name.clone()).collect(),
            |i, j| {
                let (a, b) = paired_values(&window.readings, &panel[i].field, &panel[j].field);
                correlate(&a, &b)
            },
        );
        let strongest = matrix.strongest_pairs(
            self.config.thresholds.correlation_report_min,
            self.config.thresholds.correlation_report_limit,
        );

        Ok(self.envelope(&window, period, CorrelationReport { matrix, strongest }))
    }

    /// Z-score and MAD anomalies per analyte, risk of the newest reading and
    /// insights. `sensitivity` overrides the configured z-score threshold.
    pub fn anomaly_report(
        &self,
        readings: &[Reading],
        period: Period,
        sensitivity: Option<f64>,
    ) -> Result<Report<AnomalyReport>> {
        let window = self.select(readings, period, "anomaly");
        let bundle = sequence_bundle(&window.readings, &self.config.panel)?;
        let sensitivity = sensitivity.unwrap_or(self.config.thresholds.z_score);

        let mut analytes = Vec::with_capacity(bundle.len());
        for series in bundle.iter() {
            let z_score = detect_anomalies(&series.values, sensitivity)?;
            let mad = detect_anomalies_mad(&series.values, self.config.thresholds.mad)?;
            let count = z_score.len();
            let percentage = if series.values.is_empty() {
                0.0
            } else {
                count as f64 / series.values.len() as f64 * 100.0
            };
            analytes.push(AnalyteAnomalies {
                analyte: series.name.clone(),
                z_score,
                mad,
                count,
                percentage,
            });
        }

        let risk = window
            .latest()
            .map(|latest| assess_risk(latest, &self.config.reference_ranges));
        let insights = generate_insights(&bundle, &self.config.insight_options())?;

        Ok(self.envelope(
            &window,
            period,
            AnomalyReport {
                sensitivity,
                analytes,
                risk,
                insights,
            },
        ))
    }

    /// Recurring windows of `length` samples in one analyte.
    pub fn pattern_report(
        &self,
        readings: &[Reading],
        period: Period,
        analyte: &str,
        length: usize,
        threshold: f64,
        max_len: usize,
    ) -> Result<Report<PatternReport>> {
        let window = self.select(readings, period, "pattern");
        let channel = self.channel(analyte);
        let bundle = sequence_bundle(&window.readings, std::slice::from_ref(&channel))?;
        let values = bundle.get(&channel.name).unwrap_or_default();

        let matches = find_similar_patterns(values, length, threshold, max_len)?;

        Ok(self.envelope(
            &window,
            period,
            PatternReport {
                analyte: channel.name,
                threshold,
                matches,
            },
        ))
    }

    /// K-means over the readings that carry every panel analyte.
    pub fn cluster_report(
        &self,
        readings: &[Reading],
        period: Period,
        options: &ClusterOptions,
    ) -> Result<Report<ClusterReport>> {
        let window = self.select(readings, period, "cluster");
        let bundle = complete_bundle(&window.readings, &self.config.panel)?;
        let analytes: Vec<&str> = bundle.names().collect();

        // Sequences of a complete bundle always share one length.
        let rows = bundle.rows(&analytes).unwrap_or_default();
        if rows.len() < window.len() {
            tracing::debug!(
                "Skipped {} incomplete readings for clustering",
                window.len() - rows.len()
            );
        }

        let clustering = cluster(&rows, options)?;
        if clustering.is_none() {
            tracing::warn!(
                "Too few complete readings ({}) for {} clusters",
                rows.len(),
                options.k
            );
        }

        Ok(self.envelope(
            &window,
            period,
            ClusterReport {
                analytes: analytes.iter().map(|a| a.to_string()).collect(),
                complete_readings: rows.len(),
                clustering,
            },
        ))
    }
}
