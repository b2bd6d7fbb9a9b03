//! Health-risk assessment of the latest reading against reference ranges.

use crate::readings::Reading;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Expected concentration band for one analyte.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
}

impl ReferenceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Reference ranges keyed by analyte name.
pub type ReferenceRanges = BTreeMap<String, ReferenceRange>;

/// Reference ranges for the standard neurochemical panel.
pub fn default_reference_ranges() -> ReferenceRanges {
    [
        ("serotonin", 50.0, 200.0),
        ("dopamine", 100.0, 500.0),
        ("gaba", 200.0, 1000.0),
        ("ph_level", 6.5, 7.5),
        ("calprotectin", 0.0, 50.0),
    ]
    .into_iter()
    .map(|(name, min, max)| (name.to_string(), ReferenceRange::new(min, max)))
    .collect()
}

/// Classification of a single analyte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyteRisk {
    CriticalLow,
    Low,
    Normal,
    Optimal,
    High,
    CriticalHigh,
}

impl AnalyteRisk {
    /// Contribution to the overall risk score.
    pub fn score(&self) -> u32 {
        match self {
            AnalyteRisk::CriticalLow | AnalyteRisk::CriticalHigh => 3,
            AnalyteRisk::Low | AnalyteRisk::High => 2,
            AnalyteRisk::Normal | AnalyteRisk::Optimal => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallRisk {
    Minimal,
    Low,
    Moderate,
    High,
}

impl OverallRisk {
    pub fn from_score(score: u32) -> Self {
        if score >= 6 {
            OverallRisk::High
        } else if score >= 3 {
            OverallRisk::Moderate
        } else if score > 0 {
            OverallRisk::Low
        } else {
            OverallRisk::Minimal
        }
    }

    pub fn recommendation(&self) -> Recommendation {
        match self {
            OverallRisk::High => Recommendation::ConsultProvider,
            OverallRisk::Moderate => Recommendation::MonitorClosely,
            OverallRisk::Low => Recommendation::ContinueMonitoring,
            OverallRisk::Minimal => Recommendation::MaintainPractices,
        }
    }
}

/// Advice attached to each overall risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Consult healthcare provider immediately")]
    ConsultProvider,
    #[serde(rename = "Monitor closely and consider medical advice")]
    MonitorClosely,
    #[serde(rename = "Continue monitoring")]
    ContinueMonitoring,
    #[serde(rename = "Maintain current health practices")]
    MaintainPractices,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::ConsultProvider => "Consult healthcare provider immediately",
            Recommendation::MonitorClosely => "Monitor closely and consider medical advice",
            Recommendation::ContinueMonitoring => "Continue monitoring",
            Recommendation::MaintainPractices => "Maintain current health practices",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// One entry per reference range, `normal` unless the value says otherwise
    pub analytes: BTreeMap<String, AnalyteRisk>,
    pub risk_score: u32,
    pub overall: OverallRisk,
    pub recommendation: Recommendation,
}

/// Classify one value against its range.
///
/// Checked in order: below 70% of min, below min, above 130% of max, above
/// max, inside [90% of min, 110% of max]. Anything else stays normal.
pub fn classify_value(value: f64, range: &ReferenceRange) -> AnalyteRisk {
    if value < range.min * 0.7 {
        AnalyteRisk::CriticalLow
    } else if value < range.min {
        AnalyteRisk::Low
    } else if value > range.max * 1.3 {
        AnalyteRisk::CriticalHigh
    } else if value > range.max {
        AnalyteRisk::High
    } else if value >= range.min * 0.9 && value <= range.max * 1.1 {
        AnalyteRisk::Optimal
    } else {
        AnalyteRisk::Normal
    }
}

/// Assess the most recent reading against the reference ranges.
///
/// Each range's analyte is looked up as `<name>_nm`, then `<name>`. Missing
/// and zero-valued fields are not assessed and stay `normal`.
pub fn assess_risk(latest: &Reading, ranges: &ReferenceRanges) -> RiskAssessment {
    let analytes: BTreeMap<String, AnalyteRisk> = ranges
        .iter()
        .map(|(name, range)| {
            let risk = match latest.analyte_value(name) {
                Some(value) if value != 0.0 => classify_value(value, range),
                _ => AnalyteRisk::Normal,
            };
            (name.clone(), risk)
        })
        .collect();

    let risk_score = analytes.values().map(AnalyteRisk::score).sum();
    let overall = OverallRisk::from_score(risk_score);

    RiskAssessment {
        analytes,
        risk_score,
        overall,
        recommendation: overall.recommendation(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serotonin_range() -> ReferenceRange {
        ReferenceRange::new(50.0, 200.0)
    }

    #[test]
    fn test_classify_bands() {
        let range = serotonin_range();
        assert_eq!(classify_value(34.0, &range), AnalyteRisk::CriticalLow);
        assert_eq!(classify_value(35.0, &range), AnalyteRisk::Low);
        assert_eq!(classify_value(49.9, &range), AnalyteRisk::Low);
        assert_eq!(classify_value(50.0, &range), AnalyteRisk::Optimal);
        assert_eq!(classify_value(200.0, &range), AnalyteRisk::Optimal);
        assert_eq!(classify_value(210.0, &range), AnalyteRisk::High);
        assert_eq!(classify_value(261.0, &range), AnalyteRisk::CriticalHigh);
    }

    #[test]
    fn test_critical_low_serotonin() {
        let mut ranges = ReferenceRanges::new();
        ranges.insert("serotonin".to_string(), serotonin_range());
        let reading = Reading::new(0).with("serotonin_nm", 34.0);

        let assessment = assess_risk(&reading, &ranges);
        assert_eq!(assessment.analytes["serotonin"], AnalyteRisk::CriticalLow);
        assert_eq!(assessment.risk_score, 3);
        assert_eq!(assessment.overall, OverallRisk::Moderate);
        assert_eq!(assessment.recommendation, Recommendation::MonitorClosely);
    }

    #[test]
    fn test_score_accumulates_across_analytes() {
        let reading = Reading::new(0)
            .with("serotonin_nm", 34.0)
            .with("dopamine_nm", 600.0)
            .with("gaba_nm", 500.0)
            .with("ph_level", 7.0);

        let assessment = assess_risk(&reading, &default_reference_ranges());
        assert_eq!(assessment.analytes["serotonin"], AnalyteRisk::CriticalLow);
        assert_eq!(assessment.analytes["dopamine"], AnalyteRisk::High);
        assert_eq!(assessment.analytes["gaba"], AnalyteRisk::Optimal);
        assert_eq!(assessment.analytes["ph_level"], AnalyteRisk::Optimal);
        assert_eq!(assessment.analytes["calprotectin"], AnalyteRisk::Normal);
        assert_eq!(assessment.risk_score, 5);
        assert_eq!(assessment.overall, OverallRisk::Moderate);
    }

    #[test]
    fn test_overall_levels() {
        assert_eq!(OverallRisk::from_score(0), OverallRisk::Minimal);
        assert_eq!(OverallRisk::from_score(2), OverallRisk::Low);
        assert_eq!(OverallRisk::from_score(3), OverallRisk::Moderate);
        assert_eq!(OverallRisk::from_score(6), OverallRisk::High);
    }

    #[test]
    fn test_missing_and_zero_values_not_assessed() {
        let reading = Reading::new(0).with("dopamine_nm", 0.0);
        let assessment = assess_risk(&reading, &default_reference_ranges());
        assert!(assessment.analytes.values().all(|r| *r == AnalyteRisk::Normal));
        assert_eq!(assessment.risk_score, 0);
        assert_eq!(assessment.overall, OverallRisk::Minimal);
        assert_eq!(
            assessment.recommendation.message(),
            "Maintain current health practices"
        );
    }

    #[test]
    fn test_recommendation_serializes_as_message() {
        let json = serde_json::to_string(&Recommendation::ConsultProvider).unwrap();
        assert_eq!(json, "\"Consult healthcare provider immediately\"");
    }
}
