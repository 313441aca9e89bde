//! City Health Scoring
//!
//! Deterministic, breakpoint-based composite of average air quality and the
//! share of collection points needing service. Category labels for each input
//! are reported alongside the composite.

mod scorer;

pub use scorer::{air_quality_category, waste_status, HealthScorer};
