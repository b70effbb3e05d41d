//! Hyper-parameter metadata published by algorithms, and the ranges swept
//! over them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One concrete hyper-parameter vector, aligned with an algorithm's
/// [`ParameterDescriptor`]s.
pub type Configuration = Vec<f64>;

/// Metadata describing a tunable hyper-parameter's legal range.
///
/// Published by [`Algorithm::parameter_descriptors`](crate::plugin::Algorithm::parameter_descriptors).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    /// Short parameter name, e.g. `"F"`.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Smallest legal value.
    pub lower_boundary: f64,
    /// Largest legal value.
    pub upper_boundary: f64,
}

impl ParameterDescriptor {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        lower_boundary: f64,
        upper_boundary: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            lower_boundary,
            upper_boundary,
        }
    }

    /// Builds the sweep range covering this parameter's legal range at `step`.
    #[must_use]
    pub fn sweep(&self, step: f64) -> SweepRange {
        SweepRange::new(self.lower_boundary, self.upper_boundary, step)
    }
}

/// One `(lower, upper, step)` triple of a sweep specification.
///
/// Values `lower, lower + step, lower + 2 * step, ...` up to and including
/// `upper` are visited.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepRange {
    /// First value of the range.
    pub lower_boundary: f64,
    /// Last admissible value of the range (inclusive).
    pub upper_boundary: f64,
    /// Distance between consecutive values. Must be positive.
    pub step: f64,
}

impl SweepRange {
    /// Creates a new sweep range.
    #[must_use]
    pub fn new(lower_boundary: f64, upper_boundary: f64, step: f64) -> Self {
        Self {
            lower_boundary,
            upper_boundary,
            step,
        }
    }

    /// Checks that the range can be enumerated.
    ///
    /// `lower > upper` is valid here: such a range simply has no values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSweepSpec`] if `step` is not strictly
    /// positive or any field is not finite.
    pub fn validate(&self, algorithm: &str) -> Result<()> {
        let invalid = |reason: String| Error::InvalidSweepSpec {
            algorithm: algorithm.to_owned(),
            reason,
        };
        if !self.lower_boundary.is_finite() || !self.upper_boundary.is_finite() {
            return Err(invalid(format!(
                "bounds must be finite, got [{}, {}]",
                self.lower_boundary, self.upper_boundary
            )));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(invalid(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        Ok(())
    }

    /// Number of values in the range: `floor((upper - lower) / step) + 1`, or
    /// zero when `lower > upper`. Saturates at `usize::MAX`; see
    /// [`checked_len`](Self::checked_len).
    ///
    /// Assumes the range has been [validated](Self::validate).
    #[must_use]
    pub fn len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    /// Like [`len`](Self::len), but `None` when the number of values does
    /// not fit in a `usize`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn checked_len(&self) -> Option<usize> {
        if self.lower_boundary > self.upper_boundary {
            return Some(0);
        }
        let spans = (self.upper_boundary - self.lower_boundary) / self.step;
        // Absorb rounding so that e.g. 0.0..=1.0 by 0.1 yields 11 values.
        let spans = (spans + SPAN_TOLERANCE).floor();
        // `usize::MAX as f64` rounds up past every representable usize.
        if !spans.is_finite() || spans >= usize::MAX as f64 {
            return None;
        }
        (spans as usize).checked_add(1)
    }

    /// Returns `true` if the range contains no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k`-th value of the range.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self, k: usize) -> f64 {
        (self.lower_boundary + k as f64 * self.step).min(self.upper_boundary)
    }
}

/// Slack, in steps, applied when counting how many steps fit into a range.
const SPAN_TOLERANCE: f64 = 1e-9;
