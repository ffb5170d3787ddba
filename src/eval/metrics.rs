//! Evaluation metrics: weighted Average Precision at K (APK) and its batch mean (MAPK).

use crate::error::{MetricsError, Result};
use std::collections::HashSet;
use std::hash::Hash;

/// Cutoff used when the caller has no preference.
pub const DEFAULT_K: usize = 10;

/// Weighted average precision at K.
///
/// Walks the first `k` predictions. A prediction is a hit when it is in `actual` and
/// has not appeared earlier in `predicted`; each hit contributes hits-so-far / position
/// (1-based), scaled by `weight_func(item)` when one is given. The sum is divided by
/// `min(actual.len(), k)`.
///
/// An empty `actual` scores 1.0 whatever was predicted. `k` must be at least 1.
pub fn weighted_apk<T: Eq + Hash>(
    actual: &[T],
    predicted: &[T],
    weight_func: Option<&dyn Fn(&T) -> f64>,
    k: usize,
) -> Result<f64> {
    if k == 0 {
        return Err(MetricsError::InvalidInput(
            "k must be greater than 0".to_string(),
        ));
    }

    let relevant: HashSet<&T> = actual.iter().collect();
    let mut seen: HashSet<&T> = HashSet::with_capacity(k.min(predicted.len()));

    let mut score = 0.0;
    let mut num_hits = 0.0;
    for (i, p) in predicted.iter().take(k).enumerate() {
        // insert() is false for a repeat, so duplicates never score twice
        let first_time = seen.insert(p);
        if first_time && relevant.contains(p) {
            num_hits += 1.0;
            let mut i_score = num_hits / (i as f64 + 1.0);
            if let Some(weight) = weight_func {
                i_score *= weight(p);
            }
            score += i_score;
        }
    }

    if actual.is_empty() {
        return Ok(1.0);
    }

    Ok(score / actual.len().min(k) as f64)
}

/// Unweighted APK at [`DEFAULT_K`].
pub fn apk<T: Eq + Hash>(actual: &[T], predicted: &[T]) -> Result<f64> {
    weighted_apk(actual, predicted, None, DEFAULT_K)
}

/// Mean of [`weighted_apk`] over positionally paired instances, always with uniform weights.
///
/// Both batches must have the same length. An empty batch has no defined mean and
/// yields `f64::NAN`.
pub fn weighted_mapk<T, A, P>(actual: &[A], predicted: &[P], k: usize) -> Result<f64>
where
    T: Eq + Hash,
    A: AsRef<[T]>,
    P: AsRef<[T]>,
{
    if actual.len() != predicted.len() {
        return Err(MetricsError::InvalidInput(format!(
            "batch length mismatch: {} actual sets vs {} predictions",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        log::warn!("MAPK@{} requested for an empty batch; returning NaN", k);
        return Ok(f64::NAN);
    }

    let mut sum = 0.0;
    for (a, p) in actual.iter().zip(predicted.iter()) {
        sum += weighted_apk(a.as_ref(), p.as_ref(), None, k)?;
    }
    let mean = sum / actual.len() as f64;
    log::debug!("MAPK@{} over {} instances: {:.4}", k, actual.len(), mean);
    Ok(mean)
}

/// Unweighted MAPK at [`DEFAULT_K`].
pub fn mapk<T, A, P>(actual: &[A], predicted: &[P]) -> Result<f64>
where
    T: Eq + Hash,
    A: AsRef<[T]>,
    P: AsRef<[T]>,
{
    weighted_mapk(actual, predicted, DEFAULT_K)
}
