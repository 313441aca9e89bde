//! System-wide default constants.
//!
//! Centralises the policy numbers used by the analytics engine. Every value
//! here is the default for a field in `EngineConfig` and can be overridden
//! from `urbansense.toml`.

// ============================================================================
// Geodesy
// ============================================================================

/// Mean Earth radius used by the haversine distance (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ============================================================================
// Sequence Forecaster
// ============================================================================

/// Number of most-recent readings fed to the predictor (hours at 1 reading/hr).
pub const FORECAST_WINDOW_LEN: usize = 24;

/// Upper bound on the forecast horizon (steps). 168 = one week of hourly steps.
pub const FORECAST_MAX_HORIZON: usize = 168;

/// Time between consecutive forecast points (minutes).
pub const FORECAST_STEP_MINUTES: i64 = 60;

/// Rows used by the trend extrapolator to estimate the mean first difference.
pub const TREND_LOOKBACK_ROWS: usize = 6;

/// Lower clamp for the primary tracked field (AQI).
pub const PRIMARY_FIELD_MIN: f64 = 0.0;

/// Upper clamp for the primary tracked field (AQI).
pub const PRIMARY_FIELD_MAX: f64 = 500.0;

/// Fixed symmetric confidence band around the primary prediction (fraction).
///
/// `lower = v * (1 - band)`, `upper = v * (1 + band)`.
pub const CONFIDENCE_BAND_FRACTION: f64 = 0.10;

// ============================================================================
// Fill-Level Forecaster
// ============================================================================

/// Minimum fill-level readings needed before a fill forecast is attempted.
pub const FILL_FORECAST_MIN_HISTORY: usize = 7;

/// Fill ratio at or above which a bin is considered due for collection.
pub const BIN_FILL_THRESHOLD: f64 = 0.8;

/// Time between fill forecast points (minutes). 1 440 = one day.
pub const FILL_FORECAST_STEP_MINUTES: i64 = 1_440;

// ============================================================================
// Route Optimizer
// ============================================================================

/// Priority weight for `urgent` collection points.
pub const PRIORITY_WEIGHT_URGENT: f64 = 3.0;

/// Priority weight for `high` collection points.
pub const PRIORITY_WEIGHT_HIGH: f64 = 2.0;

/// Priority weight for `normal` collection points.
pub const PRIORITY_WEIGHT_NORMAL: f64 = 1.0;

/// Priority weight for `low` collection points.
pub const PRIORITY_WEIGHT_LOW: f64 = 1.0;

/// Share of the efficiency score contributed by mean priority weight.
pub const EFFICIENCY_PRIORITY_SHARE: f64 = 0.6;

/// Share of the efficiency score contributed by mean fill ratio.
pub const EFFICIENCY_FILL_SHARE: f64 = 0.4;

/// Placeholder travel-time multiplier (minutes per km).
pub const MINUTES_PER_KM: f64 = 10.0;

/// Efficiency reported when the optimizer has to degrade.
pub const DEGRADED_EFFICIENCY: f64 = 0.5;

// ============================================================================
// Anomaly Detection
// ============================================================================

/// Minimum valid samples for the statistical-threshold detector.
pub const ANOMALY_MIN_SAMPLES: usize = 10;

/// Sigma multiplier above which a sample is flagged (`medium`).
pub const ANOMALY_MEDIUM_SIGMA: f64 = 2.0;

/// Sigma multiplier above which a flagged sample is `high`.
pub const ANOMALY_HIGH_SIGMA: f64 = 3.0;

/// Minimum valid samples for the delta-threshold detector.
pub const DELTA_MIN_SAMPLES: usize = 10;

/// Absolute change between consecutive readings that is flagged (`medium`).
pub const DELTA_MEDIUM_THRESHOLD: f64 = 0.3;

/// Absolute change between consecutive readings that is `high`.
pub const DELTA_HIGH_THRESHOLD: f64 = 0.5;

// ============================================================================
// Health Scoring
// ============================================================================

/// Weight of the primary (air-quality) category score in the composite.
pub const HEALTH_PRIMARY_WEIGHT: f64 = 0.6;

/// Weight of the secondary (waste) category score in the composite.
pub const HEALTH_SECONDARY_WEIGHT: f64 = 0.4;

/// Primary-metric breakpoints as `(inclusive upper bound, bucket score)`.
///
/// Values above the last bound score [`HEALTH_PRIMARY_FLOOR_SCORE`].
pub const HEALTH_PRIMARY_BREAKPOINTS: [(f64, f64); 5] = [
    (50.0, 100.0),
    (100.0, 80.0),
    (150.0, 60.0),
    (200.0, 40.0),
    (300.0, 20.0),
];

/// Bucket score for primary values beyond every breakpoint.
pub const HEALTH_PRIMARY_FLOOR_SCORE: f64 = 0.0;

/// Composite at or above this is `Excellent`.
pub const HEALTH_EXCELLENT_MIN: f64 = 80.0;

/// Composite at or above this is `Good`.
pub const HEALTH_GOOD_MIN: f64 = 60.0;

/// Composite at or above this is `Moderate`; anything lower is `Poor`.
pub const HEALTH_MODERATE_MIN: f64 = 40.0;

// ============================================================================
// Category Labels
// ============================================================================

/// Upper bounds (inclusive) for the air-quality categories Excellent, Good,
/// Moderate, Poor and Very Poor. Anything above is Hazardous.
pub const AIR_QUALITY_CATEGORY_BOUNDS: [f64; 5] = [50.0, 100.0, 150.0, 200.0, 300.0];

/// Upper bounds (inclusive) of the flagged-bin ratio for the waste statuses
/// Excellent, Good and Moderate. Anything above Needs Attention.
pub const WASTE_STATUS_BOUNDS: [f64; 3] = [0.1, 0.25, 0.5];
