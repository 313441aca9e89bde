//! Config and predictor artifact loading tests
//!
//! Exercise TOML loading, validation errors and the startup predictor
//! selection from files on disk.

use std::io::Write;

use tempfile::{tempdir, NamedTempFile};

use urbansense::config::{ConfigError, EngineConfig};
use urbansense::forecast::{LinearArtifact, LinearPredictor, Predictor, PredictorError};
use urbansense::types::FieldSchema;
use urbansense::AnalyticsEngine;

fn write_toml(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn identity_artifact(fields: usize) -> LinearArtifact {
    LinearArtifact {
        name: "aq_linear".to_string(),
        version: "2025.11".to_string(),
        fields,
        lags: 1,
        weights: (0..fields)
            .map(|j| (0..fields).map(|k| if j == k { 1.0 } else { 0.0 }).collect())
            .collect(),
        bias: vec![0.0; fields],
        interval_half_width: Some(0.05),
    }
}

// ============================================================================
// Engine config
// ============================================================================

#[test]
fn partial_file_overrides_only_named_keys() {
    let file = write_toml(
        r#"
[forecast]
window_len = 12
max_horizon = 72

[anomaly]
high_sigma = 4.0

[routing]
minutes_per_km = 4.5
"#,
    );
    let config = EngineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.forecast.window_len, 12);
    assert_eq!(config.forecast.max_horizon, 72);
    assert_eq!(config.forecast.trend_lookback, 6);
    assert_eq!(config.anomaly.high_sigma, 4.0);
    assert_eq!(config.anomaly.medium_sigma, 2.0);
    assert_eq!(config.routing.minutes_per_km, 4.5);
    assert_eq!(config.health.breakpoints.len(), 5);
}

#[test]
fn overridden_window_changes_engine_behaviour() {
    let file = write_toml("[forecast]\nwindow_len = 6\n");
    let engine = AnalyticsEngine::from_config(EngineConfig::load_from_file(file.path()).unwrap());
    assert_eq!(engine.status().window_len, 6);
}

#[test]
fn inconsistent_values_fail_validation() {
    let file = write_toml(
        r#"
[anomaly]
medium_sigma = 3.0
high_sigma = 2.0

[health]
primary_weight = 0.7
secondary_weight = 0.4
"#,
    );
    match EngineConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 2, "{errors:?}");
            assert!(errors.iter().any(|e| e.contains("anomaly.sigma")));
            assert!(errors.iter().any(|e| e.contains("health.primary_weight")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_parse_error() {
    let file = write_toml("[forecast\nwindow_len = ");
    assert!(matches!(
        EngineConfig::load_from_file(file.path()),
        Err(ConfigError::Parse(..))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        EngineConfig::load_from_file(&missing),
        Err(ConfigError::Io(..))
    ));
}

#[test]
fn written_config_reloads_identically() {
    let mut config = EngineConfig::default();
    config.forecast.confidence_band = 0.15;
    config.fill_forecast.collection_threshold = 0.75;

    let file = write_toml(&config.to_toml().unwrap());
    let reloaded = EngineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(reloaded.forecast.confidence_band, 0.15);
    assert_eq!(reloaded.fill_forecast.collection_threshold, 0.75);
    assert_eq!(reloaded.health.breakpoints, config.health.breakpoints);
}

// ============================================================================
// Predictor artifacts
// ============================================================================

#[test]
fn engine_loads_artifact_named_in_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("aq_linear.json");
    let fields = FieldSchema::air_quality().len();
    std::fs::write(&path, serde_json::to_vec(&identity_artifact(fields)).unwrap()).unwrap();

    let mut config = EngineConfig::default();
    config.predictor.artifact_path = Some(path);
    let engine = AnalyticsEngine::from_config(config);

    let status = engine.status();
    assert!(status.predictor_loaded);
    assert!(!status.predictor_serialized);
    assert_eq!(status.model, "aq_linear_2025.11");
}

#[test]
fn broken_artifact_falls_back_to_trend() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, b"{\"name\": \"aq_linear\"").unwrap();

    let mut config = EngineConfig::default();
    config.predictor.artifact_path = Some(path.clone());
    let engine = AnalyticsEngine::from_config(config);
    assert!(!engine.status().predictor_loaded);
    assert_eq!(engine.status().model, "trend");

    assert!(matches!(LinearPredictor::load(&path), Err(PredictorError::Parse(..))));
}

#[test]
fn artifact_with_wrong_shape_is_rejected() {
    let mut artifact = identity_artifact(3);
    artifact.weights[1].pop();
    assert!(matches!(
        LinearPredictor::from_artifact(artifact),
        Err(PredictorError::InvalidArtifact(_))
    ));
}

#[test]
fn loaded_artifact_predicts_with_interval() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("small.json");
    std::fs::write(&path, serde_json::to_vec(&identity_artifact(2)).unwrap()).unwrap();

    let model = LinearPredictor::load(&path).unwrap();
    let prediction = model.predict(&[vec![0.1, 0.2], vec![0.4, 0.6]]).unwrap();
    assert_eq!(prediction.values, vec![0.4, 0.6]);
    let (lo, hi) = prediction.primary_interval.unwrap();
    assert!((lo - 0.35).abs() < 1e-12);
    assert!((hi - 0.45).abs() < 1e-12);
}
