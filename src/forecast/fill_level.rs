//! Bin fill-level forecast from the average change between readings.

use tracing::warn;

use crate::config::FillForecastConfig;
use crate::types::{FillForecastOutcome, FillForecastPoint, Sample};

use super::forecaster::step_timestamp;

/// Projects a bin's fill ratio forward one step (day) at a time.
#[derive(Debug, Clone, Default)]
pub struct FillLevelForecaster {
    config: FillForecastConfig,
}

impl FillLevelForecaster {
    pub fn new(config: FillForecastConfig) -> Self {
        Self { config }
    }

    /// Forecast `steps` future fill levels from chronological samples.
    ///
    /// Samples without a fill value are skipped. The increment is the mean
    /// first difference across all remaining samples; predictions stay in [0, 1].
    pub fn forecast(&self, history: &[Sample], steps: usize) -> FillForecastOutcome {
        let present: Vec<(chrono::DateTime<chrono::Utc>, f64)> = history
            .iter()
            .filter_map(|s| s.value.map(|v| (s.timestamp, v)))
            .collect();

        if present.len() < self.config.min_history {
            warn!(
                needed = self.config.min_history,
                available = present.len(),
                "Insufficient fill history for forecast"
            );
            return FillForecastOutcome::InsufficientHistory {
                needed: self.config.min_history,
                available: present.len(),
            };
        }

        let (Some(&(_, first)), Some(&(anchor, last))) = (present.first(), present.last()) else {
            return FillForecastOutcome::Forecast { points: Vec::new() };
        };
        let increment = if present.len() > 1 {
            (last - first) / (present.len() - 1) as f64
        } else {
            0.0
        };

        let points = (1..=steps)
            .map(|step| {
                let predicted = (last + increment * step as f64).clamp(0.0, 1.0);
                FillForecastPoint {
                    step,
                    timestamp: step_timestamp(anchor, self.config.step_minutes, step),
                    predicted_fill_level: predicted,
                    collection_needed: predicted >= self.config.collection_threshold,
                }
            })
            .collect();

        FillForecastOutcome::Forecast { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn daily(values: &[Option<f64>]) -> Vec<Sample> {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample::new(start + Duration::days(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_insufficient_history() {
        let f = FillLevelForecaster::default();
        let outcome = f.forecast(&daily(&[Some(0.1), Some(0.2), None, Some(0.3)]), 3);
        assert_eq!(
            outcome,
            FillForecastOutcome::InsufficientHistory {
                needed: 7,
                available: 3
            }
        );
    }

    #[test]
    fn test_linear_fill_and_collection_flag() {
        let values: Vec<Option<f64>> = (0_u32..7).map(|i| Some(0.3125 + 0.0625 * f64::from(i))).collect();
        let outcome = FillLevelForecaster::default().forecast(&daily(&values), 6);
        let points = outcome.points();
        assert_eq!(points.len(), 6);
        // last = 0.6875, +0.0625/day
        assert_eq!(points[0].predicted_fill_level, 0.75);
        assert!(!points[0].collection_needed);
        assert!(points[1].collection_needed);
        assert_eq!(points[5].predicted_fill_level, 1.0);
    }

    #[test]
    fn test_emptying_bin_never_negative() {
        let values: Vec<Option<f64>> = (0_u32..8).map(|i| Some(0.7 - 0.1 * f64::from(i))).collect();
        let outcome = FillLevelForecaster::default().forecast(&daily(&values), 5);
        assert!(outcome.points().iter().all(|p| p.predicted_fill_level >= 0.0));
        assert_eq!(outcome.points()[4].predicted_fill_level, 0.0);
    }
}
