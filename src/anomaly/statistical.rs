//! Sigma-threshold detector for continuous metrics.

use statrs::statistics::Statistics;
use tracing::{debug, warn};

use crate::config::AnomalyConfig;
use crate::types::{
    AnomalyRecord, AnomalyReport, AnomalySeverity, DetectionMethod, DetectionOutcome, Sample,
};

/// Flags samples that sit more than `medium_sigma` population standard
/// deviations from the window mean.
#[derive(Debug, Clone, Default)]
pub struct StatisticalDetector {
    config: AnomalyConfig,
}

impl StatisticalDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, series: &[Sample]) -> DetectionOutcome {
        let valid: Vec<(chrono::DateTime<chrono::Utc>, f64)> = series
            .iter()
            .filter_map(|s| s.value.filter(|v| v.is_finite()).map(|v| (s.timestamp, v)))
            .collect();

        if valid.len() < self.config.min_samples {
            warn!(
                required = self.config.min_samples,
                available = valid.len(),
                "Insufficient data for statistical anomaly detection"
            );
            return DetectionOutcome::InsufficientData {
                required: self.config.min_samples,
                available: valid.len(),
            };
        }

        let values: Vec<f64> = valid.iter().map(|&(_, v)| v).collect();
        let mean = values.iter().mean();
        let sigma = values.iter().population_std_dev();

        // Constant series: nothing can deviate
        if !sigma.is_finite() || sigma <= f64::EPSILON * mean.abs().max(1.0) {
            debug!(samples = values.len(), "Zero variance window, no anomalies");
            return DetectionOutcome::Completed(AnomalyReport::new(
                Vec::new(),
                values.len(),
                DetectionMethod::StatisticalThreshold,
            ));
        }

        let medium = self.config.medium_sigma * sigma;
        let high = self.config.high_sigma * sigma;

        let anomalies: Vec<AnomalyRecord> = valid
            .iter()
            .filter_map(|&(timestamp, value)| {
                let deviation = (value - mean).abs();
                (deviation > medium).then(|| AnomalyRecord {
                    timestamp,
                    value,
                    deviation,
                    severity: if deviation > high {
                        AnomalySeverity::High
                    } else {
                        AnomalySeverity::Medium
                    },
                })
            })
            .collect();

        debug!(
            samples = values.len(),
            mean,
            sigma,
            flagged = anomalies.len(),
            "Statistical detection complete"
        );

        DetectionOutcome::Completed(AnomalyReport::new(
            anomalies,
            values.len(),
            DetectionMethod::StatisticalThreshold,
        ))
    }
}
