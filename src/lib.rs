//! Symbion Analytics - statistical analysis of neurochemical sensor readings.
//!
//! This library turns materialized sequences of analyte readings (serotonin,
//! dopamine, GABA, pH and friends) into descriptive statistics, trends,
//! forecasts, anomalies, change points, correlations and health-risk
//! assessments.
//!
//! # Guarantees
//!
//! - **Pure**: analytics functions never mutate their inputs or keep state
//! - **Finite output**: non-finite samples are rejected at the boundary, and
//!   degenerate inputs produce an explicit "absent" instead of NaN
//! - **Deterministic**: the same input (and seed, for clustering) always
//!   gives the same result
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Symbion Analytics                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Readings   │──▶│   Window    │──▶│  Sequence   │       │
//! │  │   (JSON)    │   │  (period)   │   │   Bundle    │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                                             │               │
//! │                                             ▼               │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │   Report    │◀────────────────────│    Core     │       │
//! │  │  Envelope   │                     │  Analytics  │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use symbion_analytics::core::{detect_anomalies, detect_trend, TrendType};
//!
//! let serotonin = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
//! let trend = detect_trend(&serotonin).unwrap();
//! assert_eq!(trend.trend_type, TrendType::Increasing);
//!
//! let anomalies = detect_anomalies(&serotonin, 2.5).unwrap();
//! assert!(anomalies.is_empty());
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod readings;
pub mod report;

// Re-export key types at crate root for convenience
pub use config::{AnalyteChannel, Config, ConfigError, Thresholds};
pub use core::{
    AnomalyRecord, ChangePoint, CorrelationMatrix, CorrelationResult, ForecastPoint, Insight,
    RiskAssessment, SequenceBundle, StatsSummary, TrendResult,
};
pub use error::{AnalyticsError, Result};
pub use readings::{Period, Reading, ReadingWindow};
pub use report::{Report, ReportBuilder, Rounded};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
