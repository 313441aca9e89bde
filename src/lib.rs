//! UrbanSense: Urban Environment Analytics
//!
//! Predictive and decision-support engine for city sensor networks.
//!
//! ## Components
//!
//! - **Forecast**: multi-step air-quality forecasts (learned predictor with
//!   autoregressive rollout, or trend extrapolation) and bin fill projection
//! - **Routing**: urgency-first collection ordering with great-circle distance
//! - **Anomaly**: sigma-threshold and change-threshold detectors
//! - **Health**: breakpoint-based composite city health score
//!
//! Every component is a pure function of its inputs. The only shared
//! resource is the learned predictor, loaded once and gated when it cannot
//! serve concurrent calls.

pub mod anomaly;
pub mod config;
pub mod engine;
pub mod forecast;
pub mod geo;
pub mod health;
pub mod routing;
pub mod types;

pub use config::EngineConfig;
pub use engine::{AnalyticsEngine, EngineStatus};

pub use types::{
    AirQualityReading, AnomalyRecord, AnomalySeverity, BinReading, DetectionOutcome,
    FillForecastOutcome, ForecastOutcome, ForecastPoint, ForecastReport, HealthScore,
    HealthStatus, PriorityTier, Reading, RouteCandidate, RouteResult,
};

pub use anomaly::{DeltaDetector, StatisticalDetector};
pub use forecast::{
    FillLevelForecaster, LinearPredictor, Predictor, PredictorError, PredictorHandle,
    SequenceForecaster, TrendExtrapolator,
};
pub use geo::haversine_km;
pub use health::HealthScorer;
pub use routing::RouteOptimizer;
