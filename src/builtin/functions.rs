//! Standard test functions as fitness-function plugins.

use core::f64::consts::{E, PI};

use crate::error::EvaluationError;
use crate::plugin::{FitnessFunction, Signature};

type Value = core::result::Result<f64, EvaluationError>;

/// Sphere function: unimodal, convex. Global minimum f(0,...,0) = 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sphere;

impl FitnessFunction for Sphere {
    fn evaluate(&self, x: &[f64]) -> Value {
        Ok(x.iter().map(|xi| xi * xi).sum())
    }
}

/// Rosenbrock function: narrow valley. Global minimum f(1,...,1) = 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rosenbrock;

impl FitnessFunction for Rosenbrock {
    fn evaluate(&self, x: &[f64]) -> Value {
        Ok(x.windows(2)
            .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
            .sum())
    }
}

/// Rastrigin function: highly multimodal. Global minimum f(0,...,0) = 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rastrigin;

impl FitnessFunction for Rastrigin {
    #[allow(clippy::cast_precision_loss)]
    fn evaluate(&self, x: &[f64]) -> Value {
        let n = x.len() as f64;
        Ok(10.0 * n
            + x.iter()
                .map(|xi| xi * xi - 10.0 * (2.0 * PI * xi).cos())
                .sum::<f64>())
    }
}

/// Ackley function: nearly flat with a deep well. Global minimum f(0,...,0) = 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ackley;

impl FitnessFunction for Ackley {
    #[allow(clippy::cast_precision_loss)]
    fn evaluate(&self, x: &[f64]) -> Value {
        if x.is_empty() {
            return Err(EvaluationError::DimensionMismatch {
                expected: 1,
                got: 0,
            });
        }
        let n = x.len() as f64;
        let sum_sq: f64 = x.iter().map(|xi| xi * xi).sum();
        let sum_cos: f64 = x.iter().map(|xi| (2.0 * PI * xi).cos()).sum();
        Ok(-20.0 * (-0.2 * (sum_sq / n).sqrt()).exp() - (sum_cos / n).exp() + 20.0 + E)
    }
}

/// Branin function (2D only). Three global minima with f* ≈ 0.397887.
#[derive(Clone, Copy, Debug, Default)]
pub struct Branin;

impl FitnessFunction for Branin {
    fn signature(&self) -> Signature {
        Signature::point().with_dimension(2)
    }

    fn evaluate(&self, x: &[f64]) -> Value {
        let &[x1, x2] = x else {
            return Err(EvaluationError::DimensionMismatch {
                expected: 2,
                got: x.len(),
            });
        };
        let b = 5.1 / (4.0 * PI * PI);
        let c = 5.0 / PI;
        let t = 1.0 / (8.0 * PI);
        Ok((x2 - b * x1 * x1 + c * x1 - 6.0).powi(2) + 10.0 * (1.0 - t) * x1.cos() + 10.0)
    }
}
