//! Search-space domains and their JSON wire format.
//!
//! A [`Domain`] is a rectangular matrix with one row per optimization
//! dimension. Rows conventionally hold `[lower, upper]`, but any column count
//! of at least one is accepted as long as every row has the same length.
//!
//! On the wire a domain is a JSON array of equal-length numeric arrays:
//!
//! ```
//! use optimizer_engine::domain;
//!
//! let d = domain::decode("[[-5, 5], [-5, 5]]").unwrap();
//! assert_eq!(d.dimension(), 2);
//! assert_eq!(domain::encode(&d), "[[-5.0,5.0],[-5.0,5.0]]");
//! ```
//!
//! `lower <= upper` is not checked here; it is the caller's responsibility.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A rectangular matrix of per-dimension bounds, stored row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Domain {
    data: Vec<f64>,
    cols: usize,
}

impl Domain {
    /// Build a domain from `(lower, upper)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DomainMalformed`] if `bounds` is empty or contains a
    /// non-finite value.
    pub fn from_bounds(bounds: &[(f64, f64)]) -> Result<Self> {
        Self::from_rows(bounds.iter().map(|&(lo, hi)| vec![lo, hi]).collect())
    }

    /// Build a domain from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DomainMalformed`] if there are no rows, a row is
    /// empty, rows differ in length, or a value is not finite.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::DomainMalformed(
                "domain must contain at least one row".into(),
            ));
        };
        let cols = first.len();
        if cols == 0 {
            return Err(Error::DomainMalformed(
                "domain rows must contain at least one column".into(),
            ));
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::DomainMalformed(format!(
                    "row {i} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            if let Some(v) = row.iter().find(|v| !v.is_finite()) {
                return Err(Error::DomainMalformed(format!(
                    "row {i} contains a non-finite value ({v})"
                )));
            }
            data.extend_from_slice(row);
        }

        Ok(Self { data, cols })
    }

    /// Number of optimization dimensions (rows).
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.data.len() / self.cols
    }

    /// Number of columns per row.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.cols
    }

    /// The `i`-th row.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.dimension()`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols)
    }

    /// The lower bound of dimension `i` (first column).
    #[must_use]
    pub fn lower(&self, i: usize) -> f64 {
        self.row(i)[0]
    }

    /// The upper bound of dimension `i` (last column).
    ///
    /// For single-column domains this equals [`lower`](Self::lower).
    #[must_use]
    pub fn upper(&self, i: usize) -> f64 {
        self.row(i)[self.cols - 1]
    }

    /// Clamp `x` into `[lower, upper]` of dimension `i`.
    #[must_use]
    pub fn clamp(&self, i: usize, x: f64) -> f64 {
        let (lo, hi) = (self.lower(i), self.upper(i));
        if lo <= hi { x.clamp(lo, hi) } else { x }
    }

    /// Copy the matrix back into nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for Domain {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<Domain> for Vec<Vec<f64>> {
    fn from(domain: Domain) -> Self {
        domain.to_rows()
    }
}

/// Parse a domain from its JSON wire format.
///
/// # Errors
///
/// Returns [`Error::DomainMalformed`] if `serialized` is not valid JSON, is
/// not an array of numeric arrays, is empty, or is not rectangular.
pub fn decode(serialized: &str) -> Result<Domain> {
    let rows: Vec<Vec<f64>> =
        serde_json::from_str(serialized).map_err(|e| Error::DomainMalformed(e.to_string()))?;
    Domain::from_rows(rows)
}

/// Serialize a domain into its JSON wire format.
#[must_use]
pub fn encode(domain: &Domain) -> String {
    let rows = domain.to_rows();
    // A Vec<Vec<f64>> of finite values always serializes.
    serde_json::to_string(&rows).unwrap_or_default()
}
