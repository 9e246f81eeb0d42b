//! Rolling-window sampling for model evaluation.
//!
//! Nothing here may use future data: windows always order train before
//! validation before test, and the whole schedule rolls forward. Each window
//! is an independent, read-only slice of the input, so evaluation can fan
//! out across threads without sharing any engine state.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rayon::prelude::*;
use std::ops::Range;

/// Window sizing for the rolling split.
#[derive(Debug, Clone)]
pub struct WindowPlan {
    /// How often the model is refit; also the stride between windows.
    pub retrain_every: Duration,
    /// Held out purely for measuring performance.
    pub test_window: Duration,
    /// Used for hyperparameter tuning.
    pub validation_window: Duration,
    /// Minimum span of the training slice; rolling stops below this.
    pub min_training_window: Duration,
}

/// Index ranges into the time-sorted input: train < validation < test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSplit {
    pub train: Range<usize>,
    pub validation: Range<usize>,
    pub test: Range<usize>,
}

/// Generate rolling train/validation/test splits over sorted timestamps.
///
/// Windows are laid out backward from the last timestamp at the retrain
/// stride, then returned in chronological order.
pub fn rolling_windows(timestamps: &[DateTime<Utc>], plan: &WindowPlan) -> Vec<WindowSplit> {
    let Some((&first, &last)) = timestamps.first().zip(timestamps.last()) else {
        return Vec::new();
    };

    let mut splits = Vec::new();
    let mut end = last;
    while end - plan.validation_window - plan.test_window - first > plan.min_training_window {
        let test_start = end - plan.test_window;
        let validation_start = test_start - plan.validation_window;

        splits.push(WindowSplit {
            train: 0..index_at(timestamps, validation_start),
            validation: index_at(timestamps, validation_start)..index_at(timestamps, test_start),
            test: index_at(timestamps, test_start)..index_after(timestamps, end),
        });
        end = end - plan.retrain_every;
    }
    splits.reverse();
    splits
}

fn index_at(timestamps: &[DateTime<Utc>], t: DateTime<Utc>) -> usize {
    timestamps.partition_point(|&x| x < t)
}

fn index_after(timestamps: &[DateTime<Utc>], t: DateTime<Utc>) -> usize {
    timestamps.partition_point(|&x| x <= t)
}

/// Exponential time-decay weight for a sample `age_days` old.
pub fn exponential_weight(age_days: f64, alpha: f64) -> f64 {
    (-alpha * age_days).exp()
}

/// Draw a time-decay weighted sample of indices, newest-heavy, returned
/// sorted and deduplicated. The sample size is the truncated sum of weights,
/// so a steeper decay yields a smaller sample.
pub fn weighted_sample_indices<R: Rng>(
    timestamps: &[DateTime<Utc>],
    now: DateTime<Utc>,
    alpha: f64,
    rng: &mut R,
) -> Vec<usize> {
    if timestamps.is_empty() {
        return Vec::new();
    }
    let weights: Vec<f64> = timestamps
        .iter()
        .map(|ts| {
            let age_days = (now - *ts).num_seconds() as f64 / 86_400.0;
            exponential_weight(age_days.max(0.0), alpha)
        })
        .collect();
    let sample_size = weights.iter().sum::<f64>().floor() as usize;
    if sample_size == 0 {
        return Vec::new();
    }
    let Ok(distribution) = WeightedIndex::new(&weights) else {
        return Vec::new();
    };
    let mut picked: Vec<usize> = (0..sample_size)
        .map(|_| distribution.sample(rng))
        .collect();
    picked.sort_unstable();
    picked.dedup();
    picked
}

/// Evaluate every window in parallel. `eval` must be pure over its window;
/// results are collected in window order.
pub fn evaluate_windows<T, F>(splits: &[WindowSplit], eval: F) -> Vec<T>
where
    T: Send,
    F: Fn(&WindowSplit) -> T + Send + Sync,
{
    splits.par_iter().map(eval).collect()
}
