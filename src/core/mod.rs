//! The analytics core.
//!
//! Every function here is pure: it reads the sequences it is given, allocates
//! its own working copies and returns fresh value objects. Nothing is cached
//! and nothing is shared, so calls may run concurrently on independent inputs.
//!
//! This module contains:
//! - Descriptive statistics, trend fitting and forecasting
//! - Z-score and MAD anomaly detection, CUSUM change points
//! - Pearson correlation and correlation matrices
//! - Risk assessment and insight generation
//! - Smoothing, seasonality, pattern search and clustering helpers

pub mod anomaly;
pub mod changepoint;
pub mod clustering;
pub mod correlation;
pub mod forecast;
pub mod insights;
pub mod patterns;
pub mod risk;
pub mod rounding;
pub mod seasonality;
pub mod series;
pub mod smoothing;
pub mod stats;
pub mod trend;

// Re-export commonly used types
pub use anomaly::{
    detect_anomalies, detect_anomalies_mad, AnomalyMethod, AnomalyRecord, AnomalyType, Severity,
};
pub use changepoint::{detect_change_points, ChangePoint, ChangeType};
pub use clustering::{cluster, ClusterOptions, Clustering};
pub use correlation::{
    correlate, correlation_matrix, CorrelationDirection, CorrelationMatrix, CorrelationPair,
    CorrelationResult, CorrelationStrength,
};
pub use forecast::{forecast, ForecastPoint};
pub use insights::{generate_insights, Insight, InsightOptions, InsightType};
pub use patterns::{find_similar_patterns, PatternMatch};
pub use risk::{
    assess_risk, default_reference_ranges, AnalyteRisk, OverallRisk, Recommendation,
    ReferenceRange, ReferenceRanges, RiskAssessment,
};
pub use seasonality::{detect_seasonality, SeasonalStrength, Seasonality};
pub use series::{AnalyteSeries, SequenceBundle};
pub use smoothing::{exponential_moving_average, moving_average};
pub use stats::{compute_stats, StatsSummary};
pub use trend::{detect_trend, Confidence, TrendResult, TrendType};
