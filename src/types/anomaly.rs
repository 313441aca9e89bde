//! Anomaly detection results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a flagged sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Medium,
    High,
}

impl std::fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalySeverity::Medium => write!(f, "medium"),
            AnomalySeverity::High => write!(f, "high"),
        }
    }
}

/// Which rule produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    StatisticalThreshold,
    ChangeThreshold,
}

/// One flagged sample (statistical detector) or reading pair (delta detector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub timestamp: DateTime<Utc>,
    /// Observed value, or signed change for the delta detector.
    pub value: f64,
    /// `|x - mean|` or `|delta|`.
    pub deviation: f64,
    pub severity: AnomalySeverity,
}

/// Detector output when enough data was available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalies: Vec<AnomalyRecord>,
    /// Number of valid (non-missing) samples examined.
    pub total_readings: usize,
    pub anomaly_count: usize,
    pub method: DetectionMethod,
}

impl AnomalyReport {
    pub fn new(anomalies: Vec<AnomalyRecord>, total_readings: usize, method: DetectionMethod) -> Self {
        Self {
            anomaly_count: anomalies.len(),
            anomalies,
            total_readings,
            method,
        }
    }
}

/// Result of one detector call. Insufficient data is distinct from a clean
/// report with zero anomalies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetectionOutcome {
    Completed(AnomalyReport),
    InsufficientData { required: usize, available: usize },
}

impl DetectionOutcome {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, DetectionOutcome::InsufficientData { .. })
    }

    /// Flagged records; empty for insufficient data.
    pub fn anomalies(&self) -> &[AnomalyRecord] {
        match self {
            DetectionOutcome::Completed(report) => &report.anomalies,
            DetectionOutcome::InsufficientData { .. } => &[],
        }
    }
}
