//! City health score types

use serde::{Deserialize, Serialize};

/// Status label for the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Excellent => write!(f, "Excellent"),
            HealthStatus::Good => write!(f, "Good"),
            HealthStatus::Moderate => write!(f, "Moderate"),
            HealthStatus::Poor => write!(f, "Poor"),
        }
    }
}

/// Category of the primary (air-quality) metric on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirQualityCategory {
    Excellent,
    Good,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Hazardous,
}

impl std::fmt::Display for AirQualityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AirQualityCategory::Excellent => write!(f, "Excellent"),
            AirQualityCategory::Good => write!(f, "Good"),
            AirQualityCategory::Moderate => write!(f, "Moderate"),
            AirQualityCategory::Poor => write!(f, "Poor"),
            AirQualityCategory::VeryPoor => write!(f, "Very Poor"),
            AirQualityCategory::Hazardous => write!(f, "Hazardous"),
        }
    }
}

/// Category of the secondary (waste) ratio on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WasteStatus {
    #[serde(rename = "No Data")]
    NoData,
    Excellent,
    Good,
    Moderate,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

impl std::fmt::Display for WasteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WasteStatus::NoData => write!(f, "No Data"),
            WasteStatus::Excellent => write!(f, "Excellent"),
            WasteStatus::Good => write!(f, "Good"),
            WasteStatus::Moderate => write!(f, "Moderate"),
            WasteStatus::NeedsAttention => write!(f, "Needs Attention"),
        }
    }
}

/// Composite city health score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// Weighted composite in [0, 100], one decimal place.
    pub composite: f64,
    pub status: HealthStatus,
    /// Breakpoint bucket score of the primary metric.
    pub primary_score: f64,
    /// `(1 - ratio) * 100`, or 0 when the ratio is undefined.
    pub secondary_score: f64,
    pub air_quality: AirQualityCategory,
    pub waste: WasteStatus,
}
