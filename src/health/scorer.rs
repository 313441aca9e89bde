//! Composite health scoring

use tracing::debug;

use crate::config::defaults::{AIR_QUALITY_CATEGORY_BOUNDS, WASTE_STATUS_BOUNDS};
use crate::config::HealthConfig;
use crate::types::{AirQualityCategory, HealthScore, HealthStatus, WasteStatus};

/// Combines an average air-quality index and a flagged-bin ratio into a
/// single 0-100 score.
///
/// # Scoring
///
/// - Primary metric: first breakpoint whose inclusive upper bound contains the
///   value, else the floor score
/// - Secondary ratio: `(1 - ratio) * 100`, clamped to [0, 100]; an undefined
///   ratio scores 0
/// - Composite: `primary_weight * primary + secondary_weight * secondary`,
///   rounded to one decimal place
#[derive(Debug, Clone, Default)]
pub struct HealthScorer {
    config: HealthConfig,
}

impl HealthScorer {
    pub fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    /// Score from an already-computed ratio. Non-finite ratios are treated as
    /// undefined.
    pub fn score(&self, avg_primary: f64, secondary_ratio: f64) -> HealthScore {
        let ratio = secondary_ratio.is_finite().then_some(secondary_ratio);
        self.score_ratio(avg_primary, ratio)
    }

    /// Score from raw counts; `total == 0` leaves the ratio undefined.
    pub fn score_from_counts(&self, avg_primary: f64, flagged: usize, total: usize) -> HealthScore {
        let ratio = (total > 0).then(|| flagged as f64 / total as f64);
        self.score_ratio(avg_primary, ratio)
    }

    fn score_ratio(&self, avg_primary: f64, ratio: Option<f64>) -> HealthScore {
        let primary_score = self.primary_bucket(avg_primary);
        let secondary_score = ratio.map_or(0.0, |r| ((1.0 - r) * 100.0).clamp(0.0, 100.0));

        let composite = round_one_decimal(
            self.config.primary_weight * primary_score + self.config.secondary_weight * secondary_score,
        );
        let status = self.status(composite);

        debug!(avg_primary, ?ratio, primary_score, secondary_score, composite, %status, "Health score computed");

        HealthScore {
            composite,
            status,
            primary_score,
            secondary_score,
            air_quality: air_quality_category(avg_primary),
            waste: waste_status(ratio),
        }
    }

    /// Bucket score for the primary metric.
    pub fn primary_bucket(&self, value: f64) -> f64 {
        self.config
            .breakpoints
            .iter()
            .find(|bp| value <= bp.upper)
            .map_or(self.config.floor_score, |bp| bp.score)
    }

    pub fn status(&self, composite: f64) -> HealthStatus {
        if composite >= self.config.excellent_min {
            HealthStatus::Excellent
        } else if composite >= self.config.good_min {
            HealthStatus::Good
        } else if composite >= self.config.moderate_min {
            HealthStatus::Moderate
        } else {
            HealthStatus::Poor
        }
    }
}

/// Category for an air-quality index on its own.
pub fn air_quality_category(aqi: f64) -> AirQualityCategory {
    const LABELS: [AirQualityCategory; 5] = [
        AirQualityCategory::Excellent,
        AirQualityCategory::Good,
        AirQualityCategory::Moderate,
        AirQualityCategory::Poor,
        AirQualityCategory::VeryPoor,
    ];
    AIR_QUALITY_CATEGORY_BOUNDS
        .iter()
        .zip(LABELS)
        .find(|&(&upper, _)| aqi <= upper)
        .map_or(AirQualityCategory::Hazardous, |(_, label)| label)
}

/// Status for the flagged-bin ratio on its own.
pub fn waste_status(ratio: Option<f64>) -> WasteStatus {
    const LABELS: [WasteStatus; 3] = [WasteStatus::Excellent, WasteStatus::Good, WasteStatus::Moderate];
    let Some(ratio) = ratio.filter(|r| r.is_finite()) else {
        return WasteStatus::NoData;
    };
    WASTE_STATUS_BOUNDS
        .iter()
        .zip(LABELS)
        .find(|&(&upper, _)| ratio <= upper)
        .map_or(WasteStatus::NeedsAttention, |(_, label)| label)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_city_scores_full() {
        let score = HealthScorer::default().score(40.0, 0.0);
        assert_eq!(score.primary_score, 100.0);
        assert_eq!(score.secondary_score, 100.0);
        assert_eq!(score.composite, 100.0);
        assert_eq!(score.status, HealthStatus::Excellent);
        assert_eq!(score.air_quality, AirQualityCategory::Excellent);
        assert_eq!(score.waste, WasteStatus::Excellent);
    }

    #[test]
    fn test_polluted_half_full() {
        let score = HealthScorer::default().score(250.0, 0.5);
        assert_eq!(score.primary_score, 20.0);
        assert_eq!(score.secondary_score, 50.0);
        assert_eq!(score.composite, 32.0);
        assert_eq!(score.status, HealthStatus::Poor);
        assert_eq!(score.air_quality, AirQualityCategory::VeryPoor);
        assert_eq!(score.waste, WasteStatus::Moderate);
    }

    #[test]
    fn test_breakpoints_are_inclusive_upper() {
        let s = HealthScorer::default();
        assert_eq!(s.primary_bucket(50.0), 100.0);
        assert_eq!(s.primary_bucket(50.1), 80.0);
        assert_eq!(s.primary_bucket(300.0), 20.0);
        assert_eq!(s.primary_bucket(300.1), 0.0);
        assert_eq!(s.primary_bucket(-5.0), 100.0);
    }

    #[test]
    fn test_zero_total_is_undefined_ratio() {
        let score = HealthScorer::default().score_from_counts(80.0, 0, 0);
        assert_eq!(score.secondary_score, 0.0);
        assert_eq!(score.waste, WasteStatus::NoData);
        // 0.6 * 80
        assert_eq!(score.composite, 48.0);
        assert_eq!(score.status, HealthStatus::Moderate);
    }

    #[test]
    fn test_nan_ratio_scores_zero() {
        let score = HealthScorer::default().score(120.0, f64::NAN);
        assert_eq!(score.secondary_score, 0.0);
        assert!(score.composite.is_finite());
    }

    #[test]
    fn test_counts_match_ratio() {
        let s = HealthScorer::default();
        assert_eq!(s.score_from_counts(90.0, 3, 12), s.score(90.0, 0.25));
    }

    #[test]
    fn test_composite_rounds_to_one_decimal() {
        // 0.6 * 80 + 0.4 * (1 - 1/3) * 100 = 74.666..
        let score = HealthScorer::default().score_from_counts(75.0, 1, 3);
        assert_eq!(score.composite, 74.7);
        assert_eq!(score.status, HealthStatus::Good);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(air_quality_category(100.0), AirQualityCategory::Good);
        assert_eq!(air_quality_category(180.0), AirQualityCategory::Poor);
        assert_eq!(air_quality_category(301.0), AirQualityCategory::Hazardous);
        assert_eq!(waste_status(Some(0.2)), WasteStatus::Good);
        assert_eq!(waste_status(Some(0.75)), WasteStatus::NeedsAttention);
        assert_eq!(waste_status(None), WasteStatus::NoData);
    }
}
