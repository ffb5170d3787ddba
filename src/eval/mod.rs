//! Evaluation framework: weighted APK / MAPK, item weighting, and JSON eval datasets.

pub mod dataset;
pub mod metrics;
pub mod weight;

pub use dataset::{EvalDataset, EvalInstance, EvalReport, InstanceScore};
pub use metrics::{apk, mapk, weighted_apk, weighted_mapk, DEFAULT_K};
pub use weight::{uniform, ItemWeights};
