//! Forecast outputs: per-step points, tagged outcomes and reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model label used when the trend extrapolator produced a forecast.
pub const TREND_MODEL_LABEL: &str = "trend";

/// One future timestep of a station forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 1-indexed step from the end of the history.
    pub step: usize,
    pub timestamp: DateTime<Utc>,
    /// Predicted value of every tracked field, keyed by field name.
    pub values: BTreeMap<String, f64>,
    /// Predicted value of the primary field.
    pub primary: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    /// Label of the predictor that produced this point.
    pub model_version: String,
}

/// Why a forecast call produced points or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    /// Forecast ran; may legitimately hold zero points when horizon is 0.
    Forecast { points: Vec<ForecastPoint> },
    /// History shorter than the configured window.
    InsufficientHistory { needed: usize, available: usize },
    /// The learned predictor failed and no fallback was configured.
    PredictorFailed { reason: String },
}

impl ForecastOutcome {
    /// Points of a successful forecast, empty otherwise.
    pub fn points(&self) -> &[ForecastPoint] {
        match self {
            ForecastOutcome::Forecast { points } => points,
            _ => &[],
        }
    }

    pub fn into_points(self) -> Vec<ForecastPoint> {
        match self {
            ForecastOutcome::Forecast { points } => points,
            _ => Vec::new(),
        }
    }
}

/// Direction of the primary field across a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl ForecastTrend {
    /// Compare first and last predicted primary values.
    pub fn from_points(points: &[ForecastPoint]) -> Option<Self> {
        let first = points.first()?.primary;
        let last = points.last()?.primary;
        Some(if last > first {
            ForecastTrend::Increasing
        } else if last < first {
            ForecastTrend::Decreasing
        } else {
            ForecastTrend::Stable
        })
    }
}

impl std::fmt::Display for ForecastTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastTrend::Increasing => write!(f, "increasing"),
            ForecastTrend::Decreasing => write!(f, "decreasing"),
            ForecastTrend::Stable => write!(f, "stable"),
        }
    }
}

/// Full result of one station forecast call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub outcome: ForecastOutcome,
    /// Label of the model that was used (or attempted).
    pub model: String,
    pub trend: Option<ForecastTrend>,
}

impl ForecastReport {
    pub fn new(outcome: ForecastOutcome, model: impl Into<String>) -> Self {
        let trend = ForecastTrend::from_points(outcome.points());
        Self {
            outcome,
            model: model.into(),
            trend,
        }
    }
}

/// One future day of a bin fill-level forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillForecastPoint {
    pub step: usize,
    pub timestamp: DateTime<Utc>,
    pub predicted_fill_level: f64,
    pub collection_needed: bool,
}

/// Outcome of a fill-level forecast call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FillForecastOutcome {
    Forecast { points: Vec<FillForecastPoint> },
    InsufficientHistory { needed: usize, available: usize },
}

impl FillForecastOutcome {
    pub fn points(&self) -> &[FillForecastPoint] {
        match self {
            FillForecastOutcome::Forecast { points } => points,
            FillForecastOutcome::InsufficientHistory { .. } => &[],
        }
    }
}
