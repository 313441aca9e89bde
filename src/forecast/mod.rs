//! Forecasting Engine
//!
//! Turns chronological reading histories into multi-step forecasts.
//!
//! ## Architecture
//! - `trend`: finite-difference extrapolator, the model-free fallback
//! - `scaler`: per-call min-max normalization
//! - `predictor`: the single-step predictor capability, the learned linear
//!   adapter and the gated shared handle
//! - `forecaster`: window preparation and autoregressive rollout
//! - `fill_level`: bin fill-level projection

mod fill_level;
mod forecaster;
pub mod predictor;
mod scaler;
mod trend;

pub use fill_level::FillLevelForecaster;
pub use forecaster::SequenceForecaster;
pub use predictor::{
    LinearArtifact, LinearPredictor, Prediction, Predictor, PredictorError, PredictorHandle,
};
pub use scaler::MinMaxScaler;
pub use trend::TrendExtrapolator;
