//! Item weighting for weighted APK.
//!
//! Any `Fn(&T) -> f64` closure works as a weight function. `ItemWeights` covers the
//! common case of a fixed per-item table with a fallback for unlisted items.

use crate::error::{MetricsError, Result};
use std::collections::HashMap;
use std::hash::Hash;

/// Per-item weight table with a default for items not in the table.
#[derive(Debug, Clone)]
pub struct ItemWeights<T> {
    weights: HashMap<T, f64>,
    default_weight: f64,
}

impl<T: Eq + Hash> ItemWeights<T> {
    /// Build a table. Every weight, and the default, must be a finite non-negative number.
    pub fn new(weights: HashMap<T, f64>, default_weight: f64) -> Result<Self> {
        check_weight(default_weight, "default weight")?;
        for w in weights.values() {
            check_weight(*w, "item weight")?;
        }
        Ok(Self {
            weights,
            default_weight,
        })
    }

    /// Weight for `item`, falling back to the default.
    pub fn get(&self, item: &T) -> f64 {
        self.weights
            .get(item)
            .copied()
            .unwrap_or(self.default_weight)
    }

    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Borrow the table as a weight function for [`weighted_apk`](super::weighted_apk).
    pub fn as_fn(&self) -> impl Fn(&T) -> f64 + '_ {
        move |item| self.get(item)
    }
}

/// Weight function returning `c` for every item.
pub fn uniform<T>(c: f64) -> impl Fn(&T) -> f64 {
    move |_| c
}

fn check_weight(w: f64, what: &str) -> Result<()> {
    if !w.is_finite() || w < 0.0 {
        return Err(MetricsError::InvalidInput(format!(
            "{} must be a finite non-negative number, got {}",
            what, w
        )));
    }
    Ok(())
}
