//! Engine Configuration - every analytics policy constant as an overridable TOML value
//!
//! Each struct implements `Default` with values matching `config::defaults`,
//! so an engine built without a config file behaves exactly like the
//! reference policy.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

/// Environment variable pointing at a TOML config file.
pub const CONFIG_ENV_VAR: &str = "URBANSENSE_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const LOCAL_CONFIG_FILE: &str = "urbansense.toml";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the analytics engine.
///
/// Load with `EngineConfig::load()` which searches:
/// 1. `$URBANSENSE_CONFIG`
/// 2. `./urbansense.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Air-quality sequence forecaster
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Bin fill-level forecaster
    #[serde(default)]
    pub fill_forecast: FillForecastConfig,

    /// Collection route optimizer
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Anomaly detectors
    #[serde(default)]
    pub anomaly: AnomalyConfig,

    /// City health scorer
    #[serde(default)]
    pub health: HealthConfig,

    /// Learned predictor selection
    #[serde(default)]
    pub predictor: PredictorConfig,
}

impl EngineConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults on any failure.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded engine config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No engine config found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate all policy values for internal consistency.
    ///
    /// Rules:
    /// - Window, lookback and sample minimums must be > 0
    /// - High thresholds must be >= medium thresholds
    /// - Weight pairs must sum to approximately 1.0
    /// - Health breakpoints must be strictly ascending
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let f = &self.forecast;
        if f.window_len == 0 {
            errors.push("forecast.window_len must be > 0".to_string());
        }
        if f.max_horizon == 0 {
            errors.push("forecast.max_horizon must be > 0".to_string());
        }
        if f.step_minutes <= 0 {
            errors.push("forecast.step_minutes must be > 0".to_string());
        }
        if f.trend_lookback == 0 {
            errors.push("forecast.trend_lookback must be > 0".to_string());
        }
        if !(0.0..1.0).contains(&f.confidence_band) {
            errors.push(format!(
                "forecast.confidence_band must be in [0, 1) (got {})",
                f.confidence_band
            ));
        }
        Self::check_escalation(f.primary_min, f.primary_max, "forecast.primary range", &mut errors);

        let ff = &self.fill_forecast;
        if ff.min_history < 2 {
            errors.push("fill_forecast.min_history must be >= 2".to_string());
        }
        if !(0.0..=1.0).contains(&ff.collection_threshold) {
            errors.push(format!(
                "fill_forecast.collection_threshold must be in [0, 1] (got {})",
                ff.collection_threshold
            ));
        }
        if ff.step_minutes <= 0 {
            errors.push("fill_forecast.step_minutes must be > 0".to_string());
        }

        let r = &self.routing;
        for (name, w) in [
            ("urgent", r.weight_urgent),
            ("high", r.weight_high),
            ("normal", r.weight_normal),
            ("low", r.weight_low),
        ] {
            if !w.is_finite() || w <= 0.0 {
                errors.push(format!("routing.weight_{name} must be positive (got {w})"));
            }
        }
        Self::check_weights(
            r.priority_share,
            r.fill_share,
            "routing.priority_share + routing.fill_share",
            &mut errors,
        );
        if !r.minutes_per_km.is_finite() || r.minutes_per_km < 0.0 {
            errors.push("routing.minutes_per_km must be >= 0".to_string());
        }

        let a = &self.anomaly;
        if a.min_samples < 2 {
            errors.push("anomaly.min_samples must be >= 2".to_string());
        }
        if a.delta_min_samples < 2 {
            errors.push("anomaly.delta_min_samples must be >= 2".to_string());
        }
        Self::check_escalation(a.medium_sigma, a.high_sigma, "anomaly.sigma", &mut errors);
        Self::check_escalation(a.delta_medium, a.delta_high, "anomaly.delta", &mut errors);

        let h = &self.health;
        Self::check_weights(
            h.primary_weight,
            h.secondary_weight,
            "health.primary_weight + health.secondary_weight",
            &mut errors,
        );
        if h.breakpoints.is_empty() {
            errors.push("health.breakpoints must not be empty".to_string());
        }
        if h.breakpoints.windows(2).any(|w| w[1].upper <= w[0].upper) {
            errors.push("health.breakpoints must be strictly ascending".to_string());
        }
        if !(h.moderate_min <= h.good_min && h.good_min <= h.excellent_min) {
            errors.push(
                "health status thresholds must satisfy moderate_min <= good_min <= excellent_min"
                    .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_escalation(low: f64, high: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, so catch them explicitly
        if !low.is_finite() || !high.is_finite() {
            errors.push(format!("{name}: values must be finite (got {low}, {high})"));
            return;
        }
        if high < low {
            errors.push(format!("{name}: upper ({high}) must be >= lower ({low})"));
        }
    }

    fn check_weights(a: f64, b: f64, name: &str, errors: &mut Vec<String>) {
        if a < 0.0 || b < 0.0 || ((a + b) - 1.0).abs() > 1e-6 {
            errors.push(format!("{name} must be non-negative and sum to 1.0 (got {})", a + b));
        }
    }
}

// ============================================================================
// Forecast Config
// ============================================================================

/// Sequence forecaster policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of most-recent readings in a forecast window.
    #[serde(default = "default_window_len")]
    pub window_len: usize,

    /// Largest accepted horizon; larger requests are clamped.
    #[serde(default = "default_max_horizon")]
    pub max_horizon: usize,

    /// Minutes between forecast points.
    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,

    /// Rows used by the trend extrapolator.
    #[serde(default = "default_trend_lookback")]
    pub trend_lookback: usize,

    /// Primary field clamp (lower).
    #[serde(default = "default_primary_min")]
    pub primary_min: f64,

    /// Primary field clamp (upper).
    #[serde(default = "default_primary_max")]
    pub primary_max: f64,

    /// Symmetric band around the primary prediction when the predictor supplies none.
    #[serde(default = "default_confidence_band")]
    pub confidence_band: f64,

    /// Re-run a failed learned forecast on the trend path instead of returning empty.
    #[serde(default)]
    pub fallback_to_trend_on_error: bool,
}

fn default_window_len() -> usize { defaults::FORECAST_WINDOW_LEN }
fn default_max_horizon() -> usize { defaults::FORECAST_MAX_HORIZON }
fn default_step_minutes() -> i64 { defaults::FORECAST_STEP_MINUTES }
fn default_trend_lookback() -> usize { defaults::TREND_LOOKBACK_ROWS }
fn default_primary_min() -> f64 { defaults::PRIMARY_FIELD_MIN }
fn default_primary_max() -> f64 { defaults::PRIMARY_FIELD_MAX }
fn default_confidence_band() -> f64 { defaults::CONFIDENCE_BAND_FRACTION }

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window_len: default_window_len(),
            max_horizon: default_max_horizon(),
            step_minutes: default_step_minutes(),
            trend_lookback: default_trend_lookback(),
            primary_min: default_primary_min(),
            primary_max: default_primary_max(),
            confidence_band: default_confidence_band(),
            fallback_to_trend_on_error: false,
        }
    }
}

// ============================================================================
// Fill Forecast Config
// ============================================================================

/// Bin fill-level forecaster policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillForecastConfig {
    #[serde(default = "default_fill_min_history")]
    pub min_history: usize,

    /// Fill ratio at which collection is flagged as needed.
    #[serde(default = "default_collection_threshold")]
    pub collection_threshold: f64,

    #[serde(default = "default_fill_step_minutes")]
    pub step_minutes: i64,
}

fn default_fill_min_history() -> usize { defaults::FILL_FORECAST_MIN_HISTORY }
fn default_collection_threshold() -> f64 { defaults::BIN_FILL_THRESHOLD }
fn default_fill_step_minutes() -> i64 { defaults::FILL_FORECAST_STEP_MINUTES }

impl Default for FillForecastConfig {
    fn default() -> Self {
        Self {
            min_history: default_fill_min_history(),
            collection_threshold: default_collection_threshold(),
            step_minutes: default_fill_step_minutes(),
        }
    }
}

// ============================================================================
// Routing Config
// ============================================================================

/// Route optimizer weights and placeholder travel model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_weight_urgent")]
    pub weight_urgent: f64,

    #[serde(default = "default_weight_high")]
    pub weight_high: f64,

    #[serde(default = "default_weight_normal")]
    pub weight_normal: f64,

    #[serde(default = "default_weight_low")]
    pub weight_low: f64,

    /// Efficiency share of mean priority weight.
    #[serde(default = "default_priority_share")]
    pub priority_share: f64,

    /// Efficiency share of mean fill ratio.
    #[serde(default = "default_fill_share")]
    pub fill_share: f64,

    #[serde(default = "default_minutes_per_km")]
    pub minutes_per_km: f64,

    /// Efficiency reported by a degraded route.
    #[serde(default = "default_degraded_efficiency")]
    pub degraded_efficiency: f64,
}

fn default_weight_urgent() -> f64 { defaults::PRIORITY_WEIGHT_URGENT }
fn default_weight_high() -> f64 { defaults::PRIORITY_WEIGHT_HIGH }
fn default_weight_normal() -> f64 { defaults::PRIORITY_WEIGHT_NORMAL }
fn default_weight_low() -> f64 { defaults::PRIORITY_WEIGHT_LOW }
fn default_priority_share() -> f64 { defaults::EFFICIENCY_PRIORITY_SHARE }
fn default_fill_share() -> f64 { defaults::EFFICIENCY_FILL_SHARE }
fn default_minutes_per_km() -> f64 { defaults::MINUTES_PER_KM }
fn default_degraded_efficiency() -> f64 { defaults::DEGRADED_EFFICIENCY }

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            weight_urgent: default_weight_urgent(),
            weight_high: default_weight_high(),
            weight_normal: default_weight_normal(),
            weight_low: default_weight_low(),
            priority_share: default_priority_share(),
            fill_share: default_fill_share(),
            minutes_per_km: default_minutes_per_km(),
            degraded_efficiency: default_degraded_efficiency(),
        }
    }
}

// ============================================================================
// Anomaly Config
// ============================================================================

/// Thresholds for both anomaly detectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Minimum valid samples for the statistical detector.
    #[serde(default = "default_anomaly_min_samples")]
    pub min_samples: usize,

    #[serde(default = "default_medium_sigma")]
    pub medium_sigma: f64,

    #[serde(default = "default_high_sigma")]
    pub high_sigma: f64,

    /// Minimum valid samples for the delta detector.
    #[serde(default = "default_delta_min_samples")]
    pub delta_min_samples: usize,

    #[serde(default = "default_delta_medium")]
    pub delta_medium: f64,

    #[serde(default = "default_delta_high")]
    pub delta_high: f64,
}

fn default_anomaly_min_samples() -> usize { defaults::ANOMALY_MIN_SAMPLES }
fn default_medium_sigma() -> f64 { defaults::ANOMALY_MEDIUM_SIGMA }
fn default_high_sigma() -> f64 { defaults::ANOMALY_HIGH_SIGMA }
fn default_delta_min_samples() -> usize { defaults::DELTA_MIN_SAMPLES }
fn default_delta_medium() -> f64 { defaults::DELTA_MEDIUM_THRESHOLD }
fn default_delta_high() -> f64 { defaults::DELTA_HIGH_THRESHOLD }

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_samples: default_anomaly_min_samples(),
            medium_sigma: default_medium_sigma(),
            high_sigma: default_high_sigma(),
            delta_min_samples: default_delta_min_samples(),
            delta_medium: default_delta_medium(),
            delta_high: default_delta_high(),
        }
    }
}

// ============================================================================
// Health Config
// ============================================================================

/// One primary-metric bucket: values `<= upper` (and above the previous bound) score `score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthBreakpoint {
    pub upper: f64,
    pub score: f64,
}

/// Composite health score weights and breakpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_health_primary_weight")]
    pub primary_weight: f64,

    #[serde(default = "default_health_secondary_weight")]
    pub secondary_weight: f64,

    /// Score for primary values above the last breakpoint.
    #[serde(default = "default_health_floor_score")]
    pub floor_score: f64,

    #[serde(default = "default_excellent_min")]
    pub excellent_min: f64,

    #[serde(default = "default_good_min")]
    pub good_min: f64,

    #[serde(default = "default_moderate_min")]
    pub moderate_min: f64,

    /// Ascending primary-metric buckets.
    #[serde(default = "default_health_breakpoints")]
    pub breakpoints: Vec<HealthBreakpoint>,
}

fn default_health_primary_weight() -> f64 { defaults::HEALTH_PRIMARY_WEIGHT }
fn default_health_secondary_weight() -> f64 { defaults::HEALTH_SECONDARY_WEIGHT }
fn default_health_breakpoints() -> Vec<HealthBreakpoint> {
    defaults::HEALTH_PRIMARY_BREAKPOINTS
        .iter()
        .map(|&(upper, score)| HealthBreakpoint { upper, score })
        .collect()
}
fn default_health_floor_score() -> f64 { defaults::HEALTH_PRIMARY_FLOOR_SCORE }
fn default_excellent_min() -> f64 { defaults::HEALTH_EXCELLENT_MIN }
fn default_good_min() -> f64 { defaults::HEALTH_GOOD_MIN }
fn default_moderate_min() -> f64 { defaults::HEALTH_MODERATE_MIN }

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            primary_weight: default_health_primary_weight(),
            secondary_weight: default_health_secondary_weight(),
            breakpoints: default_health_breakpoints(),
            floor_score: default_health_floor_score(),
            excellent_min: default_excellent_min(),
            good_min: default_good_min(),
            moderate_min: default_moderate_min(),
        }
    }
}

// ============================================================================
// Predictor Config
// ============================================================================

/// Which learned predictor artifact (if any) is loaded at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Path to a linear predictor artifact (JSON). `None` selects the trend fallback.
    #[serde(default)]
    pub artifact_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.forecast.window_len, 24);
        assert_eq!(config.health.breakpoints.len(), 5);
        assert!((config.anomaly.delta_high - 0.5).abs() < f64::EPSILON);
        assert!(config.predictor.artifact_path.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config: EngineConfig = toml::from_str(
            r#"
[anomaly]
medium_sigma = 2.5

[routing]
minutes_per_km = 4.0
"#,
        )
        .unwrap();
        assert!((config.anomaly.medium_sigma - 2.5).abs() < f64::EPSILON);
        assert!((config.anomaly.high_sigma - 3.0).abs() < f64::EPSILON);
        assert!((config.routing.minutes_per_km - 4.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_sigma_rejected() {
        let mut config = EngineConfig::default();
        config.anomaly.medium_sigma = 4.0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("anomaly.sigma")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_unsorted_breakpoints_rejected() {
        let mut config = EngineConfig::default();
        config.health.breakpoints.swap(0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = EngineConfig::default();
        config.health.primary_weight = 0.7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_is_valid() {
        let text = EngineConfig::default().to_toml().unwrap();
        let parsed: EngineConfig = toml::from_str(&text).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.health.breakpoints, EngineConfig::default().health.breakpoints);
    }
}
