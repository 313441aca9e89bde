//! Analytics engine facade
//!
//! Owns the configuration, every stateless component and the optional
//! learned predictor. The predictor is chosen once at construction and
//! never swapped; all methods take `&self`, so one engine can be shared
//! across threads and invoked per station or per bin in parallel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::anomaly::{DeltaDetector, StatisticalDetector};
use crate::config::{self, EngineConfig};
use crate::forecast::{FillLevelForecaster, PredictorHandle, SequenceForecaster};
use crate::health::HealthScorer;
use crate::routing::RouteOptimizer;
use crate::types::{
    AirQualityReading, BinReading, DetectionOutcome, FieldSchema, FillForecastOutcome,
    ForecastReport, HealthScore, Reading, RouteCandidate, RouteResult, Sample,
    TREND_MODEL_LABEL,
};

/// Snapshot of what the engine is running with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub predictor_loaded: bool,
    /// `name_version` of the learned predictor, or `trend`.
    pub model: String,
    /// Predictor calls go through the exclusive-access gate.
    pub predictor_serialized: bool,
    pub window_len: usize,
    pub max_horizon: usize,
    pub fields: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AnalyticsEngine {
    config: EngineConfig,
    forecaster: SequenceForecaster,
    fill_forecaster: FillLevelForecaster,
    router: RouteOptimizer,
    statistical: StatisticalDetector,
    delta: DeltaDetector,
    health: HealthScorer,
    predictor: Option<Arc<PredictorHandle>>,
}

impl AnalyticsEngine {
    /// Engine over the process-wide configuration.
    pub fn new() -> Self {
        Self::from_config(config::get().clone())
    }

    /// Build every component from `config` and load the learned predictor it
    /// names, if any. A predictor that fails to load leaves the engine on
    /// the trend fallback.
    pub fn from_config(config: EngineConfig) -> Self {
        let predictor = PredictorHandle::from_config(&config.predictor).map(Arc::new);
        let engine = Self::without_predictor(config);
        let engine = Self { predictor, ..engine };
        info!(
            model = %engine.model_label(),
            window_len = engine.forecaster.window_len(),
            "Analytics engine ready"
        );
        engine
    }

    /// Replace the predictor chosen at construction.
    pub fn with_predictor(mut self, handle: PredictorHandle) -> Self {
        self.predictor = Some(Arc::new(handle));
        self
    }

    fn without_predictor(config: EngineConfig) -> Self {
        Self {
            forecaster: SequenceForecaster::new(config.forecast.clone(), FieldSchema::air_quality()),
            fill_forecaster: FillLevelForecaster::new(config.fill_forecast.clone()),
            router: RouteOptimizer::new(config.routing.clone()),
            statistical: StatisticalDetector::new(config.anomaly.clone()),
            delta: DeltaDetector::new(config.anomaly.clone()),
            health: HealthScorer::new(config.health.clone()),
            predictor: None,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn model_label(&self) -> String {
        self.predictor
            .as_ref()
            .map_or_else(|| TREND_MODEL_LABEL.to_string(), |p| p.label())
    }

    // ------------------------------------------------------------------
    // Forecasting
    // ------------------------------------------------------------------

    /// Multi-step air-quality forecast from a chronological station history.
    pub fn forecast_air_quality(&self, history: &[AirQualityReading], horizon: usize) -> ForecastReport {
        let readings: Vec<Reading> = history.iter().map(Reading::from).collect();
        self.forecast_readings(&readings, horizon)
    }

    /// Multi-step forecast over readings already laid out in the air-quality schema.
    pub fn forecast_readings(&self, history: &[Reading], horizon: usize) -> ForecastReport {
        self.forecaster
            .forecast_report(history, horizon, self.predictor.as_deref())
    }

    /// Daily fill-level projection for one bin.
    pub fn forecast_fill_level(&self, history: &[BinReading], days: usize) -> FillForecastOutcome {
        let samples: Vec<Sample> = history.iter().map(BinReading::fill_sample).collect();
        self.fill_forecaster.forecast(&samples, days)
    }

    // ------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------

    pub fn optimize_route(&self, candidates: &[RouteCandidate]) -> RouteResult {
        self.router.optimize(candidates)
    }

    // ------------------------------------------------------------------
    // Anomaly detection
    // ------------------------------------------------------------------

    /// Sigma-threshold detection on the air-quality index.
    pub fn detect_air_quality_anomalies(&self, history: &[AirQualityReading]) -> DetectionOutcome {
        let samples: Vec<Sample> = history
            .iter()
            .map(|r| Sample::new(r.timestamp, r.aqi))
            .collect();
        self.statistical.detect(&samples)
    }

    /// Change-threshold detection on a bin's fill level.
    pub fn detect_fill_anomalies(&self, history: &[BinReading]) -> DetectionOutcome {
        let samples: Vec<Sample> = history.iter().map(BinReading::fill_sample).collect();
        self.delta.detect(&samples)
    }

    // ------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------

    /// Composite city health from an average index and bin counts.
    pub fn city_health(&self, avg_aqi: f64, bins_needing_collection: usize, total_bins: usize) -> HealthScore {
        self.health
            .score_from_counts(avg_aqi, bins_needing_collection, total_bins)
    }

    /// Composite city health straight from recent station readings and the
    /// latest fill level of each active bin.
    ///
    /// Readings without an index are ignored; no readings at all averages to 0.
    /// A bin needs collection at or above the fill forecast threshold.
    pub fn city_health_from_readings(&self, air: &[AirQualityReading], fill_levels: &[f64]) -> HealthScore {
        let avg_aqi = average_aqi(air);
        let threshold = self.config.fill_forecast.collection_threshold;
        let flagged = fill_levels.iter().filter(|&&f| f >= threshold).count();
        debug!(avg_aqi, flagged, total = fill_levels.len(), "City health inputs");
        self.city_health(avg_aqi, flagged, fill_levels.len())
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            predictor_loaded: self.predictor.is_some(),
            model: self.model_label(),
            predictor_serialized: self
                .predictor
                .as_ref()
                .is_some_and(|p| p.is_serialized()),
            window_len: self.config.forecast.window_len,
            max_horizon: self.config.forecast.max_horizon,
            fields: self.forecaster.schema().names.clone(),
            checked_at: Utc::now(),
        }
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean of the readings that carry an index; 0 when none do.
pub fn average_aqi(readings: &[AirQualityReading]) -> f64 {
    let values: Vec<f64> = readings.iter().filter_map(|r| r.aqi).collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{LinearArtifact, LinearPredictor};
    use crate::types::{AnomalySeverity, ForecastOutcome, HealthStatus, PriorityTier};
    use chrono::{Duration, TimeZone};

    fn station_history(n: usize) -> Vec<AirQualityReading> {
        let start = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| AirQualityReading {
                timestamp: start + Duration::hours(i as i64),
                aqi: Some(120.0 + i as f64),
                pm25: Some(60.0),
                temperature: Some(22.0),
                humidity: Some(55.0),
                ..AirQualityReading::default()
            })
            .collect()
    }

    #[test]
    fn test_trend_engine_status() {
        let engine = AnalyticsEngine::from_config(EngineConfig::default());
        let status = engine.status();
        assert!(!status.predictor_loaded);
        assert_eq!(status.model, "trend");
        assert_eq!(status.window_len, 24);
        assert_eq!(status.fields.len(), 9);
    }

    #[test]
    fn test_forecast_air_quality_uses_trend() {
        let engine = AnalyticsEngine::from_config(EngineConfig::default());
        let report = engine.forecast_air_quality(&station_history(30), 6);
        assert_eq!(report.model, "trend");
        let points = report.outcome.points();
        assert_eq!(points.len(), 6);
        // +1 per hour from 149
        assert!((points[0].primary - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_short_history_is_refused() {
        let engine = AnalyticsEngine::from_config(EngineConfig::default());
        let report = engine.forecast_air_quality(&station_history(5), 6);
        assert!(matches!(
            report.outcome,
            ForecastOutcome::InsufficientHistory {
                needed: 24,
                available: 5
            }
        ));
    }

    #[test]
    fn test_with_predictor_changes_model_label() {
        let fields = FieldSchema::air_quality().len();
        let weights: Vec<Vec<f64>> = (0..fields)
            .map(|j| (0..fields).map(|k| if j == k { 1.0 } else { 0.0 }).collect())
            .collect();
        let model = LinearPredictor::from_artifact(LinearArtifact {
            name: "persistence".into(),
            version: "v2".into(),
            fields,
            lags: 1,
            weights,
            bias: vec![0.0; fields],
            interval_half_width: None,
        })
        .unwrap();
        let engine = AnalyticsEngine::from_config(EngineConfig::default())
            .with_predictor(PredictorHandle::new(Arc::new(model)));

        assert_eq!(engine.status().model, "persistence_v2");
        let report = engine.forecast_air_quality(&station_history(24), 3);
        assert_eq!(report.model, "persistence_v2");
        assert_eq!(report.outcome.points().len(), 3);
    }

    #[test]
    fn test_route_and_anomalies() {
        let engine = AnalyticsEngine::from_config(EngineConfig::default());
        let route = engine.optimize_route(&[
            RouteCandidate::new("bin-1", 28.61, 77.21, 0.3, PriorityTier::Normal),
            RouteCandidate::new("bin-2", 28.62, 77.22, 0.9, PriorityTier::Urgent),
        ]);
        assert_eq!(route.order, vec!["bin-2", "bin-1"]);

        let mut history = station_history(20);
        for r in &mut history {
            r.aqi = Some(100.0);
        }
        let mut spike = history[19].clone();
        spike.timestamp += Duration::hours(1);
        spike.aqi = Some(1000.0);
        history.push(spike);
        let outcome = engine.detect_air_quality_anomalies(&history);
        assert_eq!(outcome.anomalies().len(), 1);
        assert_eq!(outcome.anomalies()[0].severity, AnomalySeverity::High);
    }

    #[test]
    fn test_city_health_from_readings() {
        let engine = AnalyticsEngine::from_config(EngineConfig::default());
        let air = vec![
            AirQualityReading {
                aqi: Some(30.0),
                ..AirQualityReading::default()
            },
            AirQualityReading {
                aqi: Some(50.0),
                ..AirQualityReading::default()
            },
            AirQualityReading::default(),
        ];
        let score = engine.city_health_from_readings(&air, &[0.1, 0.2, 0.85, 0.5]);
        // avg 40 -> 100; 1 of 4 flagged -> 75
        assert_eq!(score.composite, 90.0);
        assert_eq!(score.status, HealthStatus::Excellent);
    }

    #[test]
    fn test_average_aqi_empty_is_zero() {
        assert_eq!(average_aqi(&[]), 0.0);
    }
}
