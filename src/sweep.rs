//! Exhaustive parameter sweeps.
//!
//! A sweep specification is an ordered list of [`SweepRange`]s, one per
//! hyper-parameter. [`expand`] turns it into the full cross product of
//! [`Configuration`]s in nested-loop order: the first parameter varies
//! slowest, the last one fastest.
//!
//! ```
//! use optimizer_engine::parameter::SweepRange;
//! use optimizer_engine::sweep;
//!
//! let ranges = [SweepRange::new(0.0, 1.0, 1.0), SweepRange::new(0.0, 1.0, 1.0)];
//! let configs = sweep::expand(&ranges, "demo").unwrap();
//! assert_eq!(
//!     configs,
//!     vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]]
//! );
//! ```

use crate::error::{Error, Result};
use crate::parameter::{Configuration, SweepRange};

/// Validates every range of a sweep specification.
///
/// # Errors
///
/// Returns [`Error::InvalidSweepSpec`] for the first range with a
/// non-positive step or non-finite field.
pub fn validate(ranges: &[SweepRange], algorithm: &str) -> Result<()> {
    for (i, range) in ranges.iter().enumerate() {
        range.validate(algorithm).map_err(|e| match e {
            Error::InvalidSweepSpec { algorithm, reason } => Error::InvalidSweepSpec {
                algorithm,
                reason: format!("parameter {i}: {reason}"),
            },
            other => other,
        })?;
    }
    Ok(())
}

/// Largest number of configurations reserved up front by [`expand`].
const PREALLOCATE_MAX: usize = 1 << 16;

/// Number of configurations `ranges` expands to, or `None` if that number
/// does not fit in a `usize`.
///
/// Equals the product of every range's [`len`](SweepRange::len). An empty
/// slice has exactly one (empty) configuration; any empty range makes the
/// whole product zero.
#[must_use]
pub fn count(ranges: &[SweepRange]) -> Option<usize> {
    if ranges.iter().any(SweepRange::is_empty) {
        return Some(0);
    }
    ranges
        .iter()
        .try_fold(1usize, |acc, r| acc.checked_mul(r.checked_len()?))
}

/// Expands a sweep specification into all of its configurations.
///
/// Ranges are validated before anything is generated. A range with
/// `lower > upper` contributes no values, so the whole expansion is empty.
///
/// # Errors
///
/// Returns [`Error::InvalidSweepSpec`] if any range is invalid or the
/// number of configurations does not fit in a `usize`.
pub fn expand(ranges: &[SweepRange], algorithm: &str) -> Result<Vec<Configuration>> {
    expand_with_limit(ranges, algorithm, usize::MAX)
}

/// Like [`expand`], but refuses specifications with more than `limit`
/// configurations.
///
/// # Errors
///
/// Returns [`Error::InvalidSweepSpec`] if any range is invalid or the
/// expansion would exceed `limit` (or `usize::MAX`).
pub fn expand_with_limit(
    ranges: &[SweepRange],
    algorithm: &str,
    limit: usize,
) -> Result<Vec<Configuration>> {
    validate(ranges, algorithm)?;

    let too_large = |reason: String| Error::InvalidSweepSpec {
        algorithm: algorithm.to_owned(),
        reason,
    };
    let total = match count(ranges) {
        Some(total) if total <= limit => total,
        Some(total) => {
            return Err(too_large(format!(
                "sweep expands to {total} configurations, limit is {limit}"
            )));
        }
        None => {
            return Err(too_large(format!(
                "sweep expands to more than {} configurations, limit is {limit}",
                usize::MAX
            )));
        }
    };

    let mut out = Vec::with_capacity(total.min(PREALLOCATE_MAX));
    let mut current = Vec::with_capacity(ranges.len());
    expand_recursive(ranges, &mut current, &mut out);
    Ok(out)
}

fn expand_recursive(
    ranges: &[SweepRange],
    current: &mut Vec<f64>,
    out: &mut Vec<Configuration>,
) {
    let Some((range, rest)) = ranges.split_first() else {
        out.push(current.clone());
        return;
    };

    for k in 0..range.len() {
        current.push(range.value(k));
        expand_recursive(rest, current, out);
        current.pop();
    }
}

/// Appends the trailing population size and iteration count to a swept
/// configuration, producing the full parameter vector handed to `solve`.
#[must_use]
pub fn extend_with_budget(configuration: &[f64], population: f64, iterations: f64) -> Vec<f64> {
    let mut params = Vec::with_capacity(configuration.len() + 2);
    params.extend_from_slice(configuration);
    params.push(population);
    params.push(iterations);
    params
}
