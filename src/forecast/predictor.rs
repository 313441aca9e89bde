//! Pluggable single-step predictors.
//!
//! A predictor maps a window of normalized rows (oldest first) to the next
//! row. Two implementations ship with the engine: the learned
//! [`LinearPredictor`] loaded from a versioned artifact, and the
//! [`TrendExtrapolator`](super::TrendExtrapolator). The predictor is chosen
//! once at startup and wrapped in a [`PredictorHandle`], which serializes
//! calls when the backend is not safe for concurrent inference.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::PredictorConfig;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("Failed to read predictor artifact {}: {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse predictor artifact {}: {1}", .0.display())]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Invalid predictor artifact: {0}")]
    InvalidArtifact(String),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Predictor produced a non-finite value at field {0}")]
    NonFinite(usize),

    #[error("Predictor gate poisoned by an earlier panic")]
    GatePoisoned,

    #[error("Predictor backend error: {0}")]
    Backend(String),
}

// ============================================================================
// Predictor capability
// ============================================================================

/// One-step prediction in normalized units.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Next row, one value per tracked field.
    pub values: Vec<f64>,
    /// Optional `(lower, upper)` interval for the primary field.
    pub primary_interval: Option<(f64, f64)>,
}

impl Prediction {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            primary_interval: None,
        }
    }

    pub fn with_interval(mut self, lower: f64, upper: f64) -> Self {
        self.primary_interval = Some((lower, upper));
        self
    }
}

/// Multi-field, single-step predictor.
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Predict the row following `window` (normalized, oldest first).
    fn predict(&self, window: &[Vec<f64>]) -> Result<Prediction, PredictorError>;

    /// Whether concurrent `predict` calls are safe. Non-reentrant backends
    /// are serialized by [`PredictorHandle`].
    fn is_reentrant(&self) -> bool {
        true
    }

    /// Label recorded on forecast points.
    fn label(&self) -> String {
        format!("{}_{}", self.name(), self.version())
    }
}

/// Shared, read-only predictor with an optional exclusive-access gate.
pub struct PredictorHandle {
    predictor: Arc<dyn Predictor>,
    gate: Option<Mutex<()>>,
}

impl std::fmt::Debug for PredictorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorHandle")
            .field("label", &self.predictor.label())
            .field("serialized", &self.gate.is_some())
            .finish()
    }
}

impl PredictorHandle {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        let gate = if predictor.is_reentrant() {
            None
        } else {
            Some(Mutex::new(()))
        };
        Self { predictor, gate }
    }

    /// Failures are reported through `Err`. A backend that panics is outside
    /// this contract: release builds use `panic = "abort"`, so `GatePoisoned`
    /// only surfaces in unwinding builds after an earlier panic under the gate.
    pub fn predict(&self, window: &[Vec<f64>]) -> Result<Prediction, PredictorError> {
        let _guard = match &self.gate {
            Some(gate) => Some(gate.lock().map_err(|_| PredictorError::GatePoisoned)?),
            None => None,
        };
        self.predictor.predict(window)
    }

    pub fn label(&self) -> String {
        self.predictor.label()
    }

    /// True when calls go through the exclusive-access gate.
    pub fn is_serialized(&self) -> bool {
        self.gate.is_some()
    }

    /// Load the learned predictor named by `config`, if any.
    ///
    /// A missing or broken artifact is logged and yields `None`, which
    /// selects the trend fallback for the lifetime of the process.
    pub fn from_config(config: &PredictorConfig) -> Option<Self> {
        let path = config.artifact_path.as_ref()?;
        match LinearPredictor::load(path) {
            Ok(model) => {
                info!(path = %path.display(), model = %model.label(), "Loaded learned predictor");
                Some(Self::new(Arc::new(model)))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not load learned predictor, using trend fallback");
                None
            }
        }
    }
}

// ============================================================================
// Learned linear predictor
// ============================================================================

/// Serialized, versioned linear autoregressive model.
///
/// `next[j] = bias[j] + Σ weights[j][k] · x[k]` where `x` is the last `lags`
/// rows of the window flattened oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub name: String,
    pub version: String,
    pub fields: usize,
    pub lags: usize,
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    /// Half width of the primary-field interval in normalized units.
    #[serde(default)]
    pub interval_half_width: Option<f64>,
}

impl LinearArtifact {
    fn validate(&self) -> Result<(), PredictorError> {
        if self.fields == 0 || self.lags == 0 {
            return Err(PredictorError::InvalidArtifact(
                "fields and lags must be > 0".to_string(),
            ));
        }
        if self.weights.len() != self.fields || self.bias.len() != self.fields {
            return Err(PredictorError::InvalidArtifact(format!(
                "expected {} weight rows and biases, got {} and {}",
                self.fields,
                self.weights.len(),
                self.bias.len()
            )));
        }
        let inputs = self.fields * self.lags;
        if let Some(row) = self.weights.iter().position(|w| w.len() != inputs) {
            return Err(PredictorError::InvalidArtifact(format!(
                "weight row {row} has {} inputs, expected {inputs}",
                self.weights[row].len()
            )));
        }
        let all_finite = self.weights.iter().flatten().chain(self.bias.iter()).all(|v| v.is_finite());
        if !all_finite {
            return Err(PredictorError::InvalidArtifact(
                "weights and bias must be finite".to_string(),
            ));
        }
        if let Some(hw) = self.interval_half_width {
            if !hw.is_finite() || hw < 0.0 {
                return Err(PredictorError::InvalidArtifact(format!(
                    "interval_half_width must be >= 0 (got {hw})"
                )));
            }
        }
        Ok(())
    }
}

/// Adapter exposing a [`LinearArtifact`] as a [`Predictor`].
#[derive(Debug, Clone)]
pub struct LinearPredictor {
    artifact: LinearArtifact,
}

impl LinearPredictor {
    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, PredictorError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    /// Read and validate an artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self, PredictorError> {
        let bytes = std::fs::read(path).map_err(|e| PredictorError::Io(path.to_path_buf(), e))?;
        let artifact: LinearArtifact =
            serde_json::from_slice(&bytes).map_err(|e| PredictorError::Parse(path.to_path_buf(), e))?;
        Self::from_artifact(artifact)
    }
}

impl Predictor for LinearPredictor {
    fn name(&self) -> &str {
        &self.artifact.name
    }

    fn version(&self) -> &str {
        &self.artifact.version
    }

    fn predict(&self, window: &[Vec<f64>]) -> Result<Prediction, PredictorError> {
        let a = &self.artifact;
        if window.len() < a.lags {
            return Err(PredictorError::ShapeMismatch {
                expected: a.lags,
                actual: window.len(),
            });
        }
        let recent = &window[window.len() - a.lags..];
        if let Some(row) = recent.iter().find(|r| r.len() != a.fields) {
            return Err(PredictorError::ShapeMismatch {
                expected: a.fields,
                actual: row.len(),
            });
        }

        let x: Vec<f64> = recent.iter().flatten().copied().collect();
        let values: Vec<f64> = a
            .weights
            .iter()
            .zip(a.bias.iter())
            .map(|(w, b)| b + w.iter().zip(x.iter()).map(|(wk, xk)| wk * xk).sum::<f64>())
            .collect();

        let prediction = match (a.interval_half_width, values.first()) {
            (Some(hw), Some(&primary)) => {
                Prediction::new(values).with_interval(primary - hw, primary + hw)
            }
            _ => Prediction::new(values),
        };
        Ok(prediction)
    }
}
