//! Sequence forecaster with autoregressive rollout.
//!
//! One call:
//! 1. Refuse when the history is shorter than the window (`InsufficientHistory`)
//! 2. Build the raw `rows × fields` matrix, imputing missing fields
//! 3. Without a learned predictor: extrapolate the trend `h = 1..=horizon`
//!    directly on the raw matrix
//! 4. With a learned predictor: fit min-max scaling on the history, seed the
//!    window with the last `W` normalized rows, then repeat
//!    predict → denormalize → clamp → emit → renormalize → slide, `horizon` times
//!
//! All state (scaler, window buffer, step counter) is local to the call, so
//! concurrent calls for different stations never interact.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, error, warn};

use crate::config::ForecastConfig;
use crate::types::{
    FieldSchema, ForecastOutcome, ForecastPoint, ForecastReport, Reading, TREND_MODEL_LABEL,
};

use super::predictor::{Prediction, PredictorError, PredictorHandle};
use super::scaler::MinMaxScaler;
use super::trend::TrendExtrapolator;

/// Multi-step forecaster over a fixed field schema.
#[derive(Debug, Clone)]
pub struct SequenceForecaster {
    config: ForecastConfig,
    schema: FieldSchema,
    trend: TrendExtrapolator,
}

impl SequenceForecaster {
    pub fn new(config: ForecastConfig, schema: FieldSchema) -> Self {
        let trend = TrendExtrapolator::from_config(&config);
        Self {
            config,
            schema,
            trend,
        }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn window_len(&self) -> usize {
        self.config.window_len
    }

    /// Forecast `horizon` steps; empty when refused or failed.
    pub fn forecast(
        &self,
        history: &[Reading],
        horizon: usize,
        predictor: Option<&PredictorHandle>,
    ) -> Vec<ForecastPoint> {
        self.forecast_report(history, horizon, predictor)
            .outcome
            .into_points()
    }

    /// Forecast `horizon` steps and report why points were or were not produced.
    ///
    /// `history` must be chronological (oldest first); it is not re-sorted.
    pub fn forecast_report(
        &self,
        history: &[Reading],
        horizon: usize,
        predictor: Option<&PredictorHandle>,
    ) -> ForecastReport {
        let model = predictor.map_or_else(|| TREND_MODEL_LABEL.to_string(), PredictorHandle::label);

        let needed = self.config.window_len;
        if history.len() < needed {
            warn!(
                needed,
                available = history.len(),
                "Insufficient history for forecast"
            );
            return ForecastReport::new(
                ForecastOutcome::InsufficientHistory {
                    needed,
                    available: history.len(),
                },
                model,
            );
        }

        let horizon = if horizon > self.config.max_horizon {
            warn!(
                requested = horizon,
                max = self.config.max_horizon,
                "Forecast horizon clamped"
            );
            self.config.max_horizon
        } else {
            horizon
        };

        let matrix = self.history_matrix(history);
        let anchor = history
            .last()
            .map_or_else(Utc::now, |reading| reading.timestamp);

        let Some(handle) = predictor else {
            let points = self.trend_forecast(&matrix, anchor, horizon);
            return ForecastReport::new(ForecastOutcome::Forecast { points }, model);
        };

        match self.rollout(&matrix, anchor, horizon, handle) {
            Ok(points) => {
                debug!(model = %model, points = points.len(), "Rollout forecast complete");
                ForecastReport::new(ForecastOutcome::Forecast { points }, model)
            }
            Err(e) => {
                error!(model = %model, error = %e, "Predictor failed during rollout");
                if self.config.fallback_to_trend_on_error {
                    warn!("Falling back to trend extrapolation");
                    let points = self.trend_forecast(&matrix, anchor, horizon);
                    ForecastReport::new(ForecastOutcome::Forecast { points }, TREND_MODEL_LABEL)
                } else {
                    ForecastReport::new(
                        ForecastOutcome::PredictorFailed {
                            reason: e.to_string(),
                        },
                        model,
                    )
                }
            }
        }
    }

    /// Raw `rows × fields` matrix. A missing value takes the mean of that
    /// field's present values; a field missing everywhere takes the schema default.
    fn history_matrix(&self, history: &[Reading]) -> Vec<Vec<f64>> {
        let fills: Vec<f64> = (0..self.schema.len())
            .map(|j| {
                let (sum, count) = history
                    .iter()
                    .filter_map(|r| r.value(j))
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                if count > 0 {
                    sum / count as f64
                } else {
                    self.schema.defaults.get(j).copied().unwrap_or(0.0)
                }
            })
            .collect();

        history
            .iter()
            .map(|r| {
                fills
                    .iter()
                    .enumerate()
                    .map(|(j, &fill)| r.value(j).unwrap_or(fill))
                    .collect()
            })
            .collect()
    }

    fn trend_forecast(
        &self,
        matrix: &[Vec<f64>],
        anchor: DateTime<Utc>,
        horizon: usize,
    ) -> Vec<ForecastPoint> {
        (0..horizon)
            .map(|i| {
                let values = self.trend.extrapolate(matrix, i + 1);
                self.point(i, anchor, values, None, TREND_MODEL_LABEL)
            })
            .collect()
    }

    fn rollout(
        &self,
        matrix: &[Vec<f64>],
        anchor: DateTime<Utc>,
        horizon: usize,
        handle: &PredictorHandle,
    ) -> Result<Vec<ForecastPoint>, PredictorError> {
        let scaler = MinMaxScaler::fit(matrix);
        let start = matrix.len() - self.config.window_len;
        let mut window: VecDeque<Vec<f64>> = matrix[start..]
            .iter()
            .map(|row| scaler.transform_row(row))
            .collect();

        let label = handle.label();
        let mut points = Vec::with_capacity(horizon);

        for i in 0..horizon {
            let prediction = handle.predict(window.make_contiguous())?;
            self.check_prediction(&prediction)?;

            let values = self.trend.clamp_row(scaler.inverse_row(&prediction.values));
            let interval = prediction
                .primary_interval
                .map(|(lo, hi)| (scaler.inverse_value(0, lo), scaler.inverse_value(0, hi)));

            let next = scaler.transform_row(&values);
            points.push(self.point(i, anchor, values, interval, &label));

            window.pop_front();
            window.push_back(next);
        }

        Ok(points)
    }

    fn check_prediction(&self, prediction: &Prediction) -> Result<(), PredictorError> {
        if prediction.values.len() != self.schema.len() {
            return Err(PredictorError::ShapeMismatch {
                expected: self.schema.len(),
                actual: prediction.values.len(),
            });
        }
        if let Some(j) = prediction.values.iter().position(|v| !v.is_finite()) {
            return Err(PredictorError::NonFinite(j));
        }
        if let Some((lo, hi)) = prediction.primary_interval {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(PredictorError::NonFinite(0));
            }
        }
        Ok(())
    }

    fn point(
        &self,
        i: usize,
        anchor: DateTime<Utc>,
        values: Vec<f64>,
        interval: Option<(f64, f64)>,
        model: &str,
    ) -> ForecastPoint {
        let primary = values.first().copied().unwrap_or(0.0);
        let (lower, upper) = interval.unwrap_or_else(|| {
            let band = self.config.confidence_band;
            (primary * (1.0 - band), primary * (1.0 + band))
        });

        ForecastPoint {
            step: i + 1,
            timestamp: step_timestamp(anchor, self.config.step_minutes, i + 1),
            values: self
                .schema
                .names
                .iter()
                .cloned()
                .zip(values.iter().copied())
                .collect::<BTreeMap<_, _>>(),
            primary,
            confidence_lower: lower.min(upper),
            confidence_upper: lower.max(upper),
            model_version: model.to_string(),
        }
    }
}

/// `anchor + step_minutes * step`, saturating at `anchor` on overflow.
pub(crate) fn step_timestamp(anchor: DateTime<Utc>, step_minutes: i64, step: usize) -> DateTime<Utc> {
    i64::try_from(step)
        .ok()
        .and_then(|s| step_minutes.checked_mul(s))
        .and_then(Duration::try_minutes)
        .and_then(|d| anchor.checked_add_signed(d))
        .unwrap_or(anchor)
}
