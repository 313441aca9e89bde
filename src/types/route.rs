//! Collection route types

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Categorical urgency label on a collection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorityTier::Low => write!(f, "low"),
            PriorityTier::Normal => write!(f, "normal"),
            PriorityTier::High => write!(f, "high"),
            PriorityTier::Urgent => write!(f, "urgent"),
        }
    }
}

/// A physical collection point to be placed on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Fill / urgency ratio in [0, 1].
    pub fill_ratio: f64,
    #[serde(default)]
    pub priority: PriorityTier,
}

impl RouteCandidate {
    pub fn new(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        fill_ratio: f64,
        priority: PriorityTier,
    ) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            fill_ratio,
            priority,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// How a route order was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMethod {
    /// Urgency-first stable sort.
    PriorityBased,
    /// Fewer than two candidates: input order kept.
    Trivial,
    /// Optimization failed: input order kept with neutral efficiency.
    Degraded,
}

/// Ordered visitation plan for one optimization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub order: Vec<String>,
    pub total_distance_km: f64,
    /// Dimensionless score in [0, 1].
    pub efficiency_score: f64,
    pub estimated_duration_minutes: u64,
    pub method: RouteMethod,
}

impl RouteResult {
    /// Input order, zero distance, given efficiency.
    pub fn unchanged(candidates: &[RouteCandidate], efficiency_score: f64, method: RouteMethod) -> Self {
        Self {
            order: candidates.iter().map(|c| c.id.clone()).collect(),
            total_distance_km: 0.0,
            efficiency_score,
            estimated_duration_minutes: 0,
            method,
        }
    }
}
