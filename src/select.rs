//! Picking the best configuration of a sweep.
//!
//! Minimization is the only objective sense. A candidate replaces the
//! current best only if its value is strictly smaller, so ties keep the
//! earliest configuration. `NaN` values never win.

use crate::types::SweepTrial;

/// Returns the index of the trial with the smallest `best_value`.
///
/// Returns `None` if `trials` is empty or every value is `NaN`.
///
/// # Examples
///
/// ```
/// use optimizer_engine::select::select_best;
/// use optimizer_engine::{RunResult, SweepTrial};
///
/// let trial = |index, value| SweepTrial {
///     index,
///     configuration: vec![index as f64],
///     result: RunResult { best_point: vec![], best_value: value, evaluation_count: 1 },
/// };
/// let trials = [trial(0, 3.0), trial(1, 1.0), trial(2, 1.0)];
/// assert_eq!(select_best(&trials), Some(1));
/// ```
#[must_use]
pub fn select_best(trials: &[SweepTrial]) -> Option<usize> {
    let mut tracker = BestTracker::new();
    for (i, trial) in trials.iter().enumerate() {
        tracker.offer(i, trial.result.best_value);
    }
    tracker.best().map(|(i, _)| i)
}

/// Incremental arg-min over a stream of objective values.
#[derive(Clone, Copy, Debug, Default)]
pub struct BestTracker {
    best: Option<(usize, f64)>,
}

impl BestTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers the value of candidate `index`. Returns `true` if it became
    /// the new best.
    pub fn offer(&mut self, index: usize, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        let improves = self.best.is_none_or(|(_, best)| value < best);
        if improves {
            self.best = Some((index, value));
        }
        improves
    }

    /// The current best `(index, value)`, if any.
    #[must_use]
    pub fn best(&self) -> Option<(usize, f64)> {
        self.best
    }
}
