//! The bound evaluator an algorithm calls during `solve`.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::Domain;
use crate::error::{Error, EvaluationError, Result};
use crate::plugin::{EvaluatorShape, FitnessFunction};

/// A fitness function bound to the evaluator shape an algorithm expects.
///
/// Counts every evaluated point; the count becomes the run's
/// `evaluation_count`. Every point must have exactly
/// [`dimension`](Self::dimension) coordinates.
pub struct Evaluator<'a> {
    fitness: &'a dyn FitnessFunction,
    shape: EvaluatorShape,
    dimension: usize,
    evaluations: AtomicUsize,
}

impl<'a> Evaluator<'a> {
    /// Binds `fitness` for an algorithm expecting `shape`, over `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleEvaluator`] if the fitness function's
    /// signature has a different shape, or a fixed dimension different from
    /// the domain's.
    pub fn bind(
        algorithm: &str,
        shape: EvaluatorShape,
        fitness_function: &str,
        fitness: &'a dyn FitnessFunction,
        domain: &Domain,
    ) -> Result<Self> {
        let signature = fitness.signature();
        let incompatible = |reason: String| Error::IncompatibleEvaluator {
            algorithm: algorithm.to_owned(),
            fitness_function: fitness_function.to_owned(),
            reason,
        };

        if signature.shape != shape {
            return Err(incompatible(format!(
                "algorithm calls a {shape:?} evaluator, function offers {:?}",
                signature.shape
            )));
        }
        if let Some(dimension) = signature.dimension {
            if dimension != domain.dimension() {
                return Err(incompatible(format!(
                    "function takes {dimension} coordinates, domain has {}",
                    domain.dimension()
                )));
            }
        }

        Ok(Self {
            fitness,
            shape,
            dimension: domain.dimension(),
            evaluations: AtomicUsize::new(0),
        })
    }

    /// Evaluates one point.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::DimensionMismatch`] for a point of the
    /// wrong length, or whatever the fitness function returns.
    pub fn evaluate(&self, x: &[f64]) -> core::result::Result<f64, EvaluationError> {
        self.check_dimension(x)?;
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.fitness.evaluate(x)
    }

    /// Evaluates a batch of points, returning one value per point.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::DimensionMismatch`] if any point has the
    /// wrong length, or whatever the fitness function returns.
    pub fn evaluate_batch(
        &self,
        xs: &[Vec<f64>],
    ) -> core::result::Result<Vec<f64>, EvaluationError> {
        for x in xs {
            self.check_dimension(x)?;
        }
        self.evaluations.fetch_add(xs.len(), Ordering::Relaxed);

        let values = match self.shape {
            EvaluatorShape::Batch => self.fitness.evaluate_batch(xs)?,
            EvaluatorShape::Point => xs
                .iter()
                .map(|x| self.fitness.evaluate(x))
                .collect::<core::result::Result<Vec<_>, _>>()?,
        };
        if values.len() != xs.len() {
            return Err(EvaluationError::Other(format!(
                "batch of {} points returned {} values",
                xs.len(),
                values.len()
            )));
        }
        Ok(values)
    }

    /// Number of points evaluated so far.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// Number of coordinates every point must have.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The shape this evaluator was bound with.
    #[must_use]
    pub fn shape(&self) -> EvaluatorShape {
        self.shape
    }

    fn check_dimension(&self, x: &[f64]) -> core::result::Result<(), EvaluationError> {
        if x.len() == self.dimension {
            Ok(())
        } else {
            Err(EvaluationError::DimensionMismatch {
                expected: self.dimension,
                got: x.len(),
            })
        }
    }
}
