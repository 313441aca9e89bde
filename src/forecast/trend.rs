//! Finite-difference trend extrapolation.
//!
//! Deterministic, model-free fallback: the mean first difference over the
//! last few rows is projected linearly `h` steps ahead. Defined for any
//! finite input including a single row (zero trend).

use crate::config::ForecastConfig;

use super::predictor::{Prediction, Predictor, PredictorError};

/// Linear extrapolator over a `rows × fields` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendExtrapolator {
    /// Rows used to estimate the trend.
    lookback: usize,
    /// Clamp range for the primary (first) field.
    primary_min: f64,
    primary_max: f64,
}

impl Default for TrendExtrapolator {
    fn default() -> Self {
        Self::from_config(&ForecastConfig::default())
    }
}

impl TrendExtrapolator {
    pub fn new(lookback: usize, primary_min: f64, primary_max: f64) -> Self {
        Self {
            lookback: lookback.max(1),
            primary_min,
            primary_max,
        }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new(config.trend_lookback, config.primary_min, config.primary_max)
    }

    /// Mean first difference per field across the last `lookback` rows.
    ///
    /// Zero for every field when fewer than two rows are available.
    pub fn trend(&self, matrix: &[Vec<f64>]) -> Vec<f64> {
        let Some(last) = matrix.last() else {
            return Vec::new();
        };
        let cols = last.len();
        let start = matrix.len().saturating_sub(self.lookback);
        let recent = &matrix[start..];
        if recent.len() < 2 {
            return vec![0.0; cols];
        }

        let diffs = (recent.len() - 1) as f64;
        (0..cols)
            .map(|j| {
                recent
                    .windows(2)
                    .map(|pair| cell(&pair[1], j) - cell(&pair[0], j))
                    .sum::<f64>()
                    / diffs
            })
            .collect()
    }

    /// Project `last_row + trend * h` and apply the clamp policy.
    ///
    /// `h` is the 1-indexed step count. Returns an empty row for an empty matrix.
    pub fn extrapolate(&self, matrix: &[Vec<f64>], h: usize) -> Vec<f64> {
        self.clamp_row(self.project(matrix, h))
    }

    /// `last_row + trend * h` without clamping; valid in any linear units.
    pub fn project(&self, matrix: &[Vec<f64>], h: usize) -> Vec<f64> {
        let Some(last) = matrix.last() else {
            return Vec::new();
        };
        let trend = self.trend(matrix);
        let steps = h as f64;

        last.iter()
            .zip(trend.iter())
            .map(|(&value, &slope)| value + slope * steps)
            .collect()
    }

    /// Primary field into `[primary_min, primary_max]`, all others non-negative.
    pub fn clamp_row(&self, row: Vec<f64>) -> Vec<f64> {
        row.into_iter()
            .enumerate()
            .map(|(j, value)| self.clamp_field(j, value))
            .collect()
    }

    fn clamp_field(&self, index: usize, value: f64) -> f64 {
        if index == 0 {
            value.max(self.primary_min).min(self.primary_max)
        } else {
            value.max(0.0)
        }
    }
}

fn cell(row: &[f64], j: usize) -> f64 {
    row.get(j).copied().unwrap_or(0.0)
}

impl Predictor for TrendExtrapolator {
    fn name(&self) -> &str {
        "trend"
    }

    fn version(&self) -> &str {
        "v1"
    }

    /// One unclamped step. The rollout window is min-max scaled, so the
    /// clamp is applied by the forecaster after denormalizing.
    fn predict(&self, window: &[Vec<f64>]) -> Result<Prediction, PredictorError> {
        if window.is_empty() {
            return Err(PredictorError::ShapeMismatch {
                expected: 1,
                actual: 0,
            });
        }
        Ok(Prediction::new(self.project(window, 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extrapolator() -> TrendExtrapolator {
        TrendExtrapolator::new(6, 0.0, 500.0)
    }

    #[test]
    fn test_single_row_is_returned_unchanged() {
        let row = vec![120.0, 55.0, 80.0, 20.0];
        let m = vec![row.clone()];
        for h in [1, 2, 10, 100] {
            assert_eq!(extrapolator().extrapolate(&m, h), row);
        }
    }

    #[test]
    fn test_linear_series_continues() {
        let m: Vec<Vec<f64>> = (0..10).map(|i| vec![100.0 + 2.0 * i as f64, 10.0]).collect();
        let out = extrapolator().extrapolate(&m, 3);
        assert!((out[0] - (118.0 + 6.0)).abs() < 1e-9, "out={out:?}");
        assert!((out[1] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_only_last_rows_drive_trend() {
        // Flat for a long time, then rising by 5 per step over the last 6 rows
        let mut m: Vec<Vec<f64>> = (0..20).map(|_| vec![50.0]).collect();
        for i in 1..=6 {
            m.push(vec![50.0 + 5.0 * i as f64]);
        }
        assert_eq!(extrapolator().trend(&m), vec![5.0]);
    }

    #[test]
    fn test_primary_clamped_to_range() {
        let rising: Vec<Vec<f64>> = (0..6).map(|i| vec![400.0 + 50.0 * i as f64]).collect();
        assert_eq!(extrapolator().extrapolate(&rising, 5)[0], 500.0);

        let falling: Vec<Vec<f64>> = (0..6).map(|i| vec![30.0 - 10.0 * i as f64]).collect();
        assert_eq!(extrapolator().extrapolate(&falling, 5)[0], 0.0);
    }

    #[test]
    fn test_other_fields_non_negative() {
        let m: Vec<Vec<f64>> = (0..6).map(|i| vec![100.0, 10.0 - 4.0 * i as f64]).collect();
        let out = extrapolator().extrapolate(&m, 2);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn test_empty_matrix_yields_empty_row() {
        assert!(extrapolator().extrapolate(&[], 1).is_empty());
    }

    #[test]
    fn test_predictor_impl_is_one_step() {
        let m: Vec<Vec<f64>> = (0..4).map(|i| vec![10.0 + i as f64]).collect();
        let p = extrapolator().predict(&m).unwrap();
        assert_eq!(p.values, vec![14.0]);
        assert!(p.primary_interval.is_none());
    }

    #[test]
    fn test_predictor_impl_leaves_scaled_values_unclamped() {
        // Falling below the scaled minimum must not be pinned at zero
        let m: Vec<Vec<f64>> = (0..6).map(|i| vec![0.5, 0.25 - 0.0625 * i as f64]).collect();
        let p = extrapolator().predict(&m).unwrap();
        assert_eq!(p.values, vec![0.5, -0.125]);
        assert_eq!(extrapolator().extrapolate(&m, 1), vec![0.5, 0.0]);
    }
}
