//! Change-threshold detector for bounded ratios such as fill level.

use tracing::{debug, warn};

use crate::config::AnomalyConfig;
use crate::types::{
    AnomalyRecord, AnomalyReport, AnomalySeverity, DetectionMethod, DetectionOutcome, Sample,
};

/// Flags jumps between consecutive readings larger than `delta_medium`.
#[derive(Debug, Clone, Default)]
pub struct DeltaDetector {
    config: AnomalyConfig,
}

impl DeltaDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// A missing value breaks the chain: pairs are only formed between
    /// adjacent samples that both carry a value. Each record holds the signed
    /// change and the timestamp of the later sample.
    pub fn detect(&self, series: &[Sample]) -> DetectionOutcome {
        let available = series.iter().filter(|s| s.value.is_some()).count();
        if available < self.config.delta_min_samples {
            warn!(
                required = self.config.delta_min_samples,
                available,
                "Insufficient data for change detection"
            );
            return DetectionOutcome::InsufficientData {
                required: self.config.delta_min_samples,
                available,
            };
        }

        let anomalies: Vec<AnomalyRecord> = series
            .windows(2)
            .filter_map(|pair| {
                let (Some(prev), Some(next)) = (pair[0].value, pair[1].value) else {
                    return None;
                };
                let delta = next - prev;
                let magnitude = delta.abs();
                (magnitude > self.config.delta_medium).then(|| AnomalyRecord {
                    timestamp: pair[1].timestamp,
                    value: delta,
                    deviation: magnitude,
                    severity: if magnitude > self.config.delta_high {
                        AnomalySeverity::High
                    } else {
                        AnomalySeverity::Medium
                    },
                })
            })
            .collect();

        debug!(samples = available, flagged = anomalies.len(), "Change detection complete");

        DetectionOutcome::Completed(AnomalyReport::new(
            anomalies,
            available,
            DetectionMethod::ChangeThreshold,
        ))
    }
}
