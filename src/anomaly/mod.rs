//! Anomaly Detection
//!
//! Two stateless rules over an in-memory series:
//! - `StatisticalDetector`: mean/sigma threshold for continuous metrics
//! - `DeltaDetector`: consecutive-change threshold for bounded ratios
//!
//! Both return a `DetectionOutcome` so "not enough data" never looks like
//! "nothing found".

mod delta;
mod statistical;

pub use delta::DeltaDetector;
pub use statistical::StatisticalDetector;
