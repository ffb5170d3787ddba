//! Evaluation dataset: ground-truth / prediction pairs loaded from JSON, scored into a report.

use crate::error::Result;
use crate::eval::{weighted_apk, weighted_mapk, ItemWeights};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One evaluation instance: the relevant items and a ranked prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalInstance {
    /// Label for reporting. Defaults to the instance's index when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Items considered correct (order doesn't matter).
    #[serde(default)]
    pub actual: Vec<String>,
    /// Ranked prediction (order matters, duplicates allowed).
    #[serde(default)]
    pub predicted: Vec<String>,
}

/// A batch of instances plus an optional per-item weight table.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalDataset {
    pub instances: Vec<EvalInstance>,
    /// Optional: per-item weights; enables the weighted APK column.
    #[serde(default)]
    pub weights: Option<HashMap<String, f64>>,
    /// Weight for items missing from `weights`.
    #[serde(default = "default_weight")]
    pub default_weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Scores for a single instance.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceScore {
    pub id: String,
    pub apk: f64,
    /// Present only when the dataset carries a weight table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_apk: Option<f64>,
}

/// Per-instance scores and the batch mean for one cutoff.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub k: usize,
    pub instances: Vec<InstanceScore>,
    /// NaN when the dataset has no instances.
    pub mapk: f64,
}

impl EvalReport {
    /// True when the batch mean reaches `threshold`. A NaN mean never passes.
    pub fn passes(&self, threshold: f64) -> bool {
        self.mapk >= threshold
    }
}

impl EvalDataset {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dataset: EvalDataset = serde_json::from_str(json)?;
        Ok(dataset)
    }

    /// Read and parse a dataset file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} eval instances from {}",
            dataset.instances.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Score every instance at cutoff `k`.
    ///
    /// The batch mean is always unweighted; the weight table, when present, only feeds
    /// the per-instance `weighted_apk` column.
    pub fn evaluate(&self, k: usize) -> Result<EvalReport> {
        let table = match &self.weights {
            Some(w) => Some(ItemWeights::new(w.clone(), self.default_weight)?),
            None => None,
        };
        let weight_fn = table.as_ref().map(|t| t.as_fn());

        let mut instances = Vec::with_capacity(self.instances.len());
        for (idx, inst) in self.instances.iter().enumerate() {
            let apk = weighted_apk(&inst.actual, &inst.predicted, None, k)?;
            let weighted = match &weight_fn {
                Some(f) => {
                    let f: &dyn Fn(&String) -> f64 = f;
                    Some(weighted_apk(&inst.actual, &inst.predicted, Some(f), k)?)
                }
                None => None,
            };
            instances.push(InstanceScore {
                id: inst.id.clone().unwrap_or_else(|| idx.to_string()),
                apk,
                weighted_apk: weighted,
            });
        }

        let actual: Vec<&[String]> = self.instances.iter().map(|i| i.actual.as_slice()).collect();
        let predicted: Vec<&[String]> = self
            .instances
            .iter()
            .map(|i| i.predicted.as_slice())
            .collect();
        let mapk = weighted_mapk::<String, _, _>(&actual, &predicted, k)?;

        Ok(EvalReport {
            k,
            instances,
            mapk,
        })
    }
}
