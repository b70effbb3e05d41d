//! Differential Evolution (DE/rand/1/bin) as an algorithm plugin.
//!
//! Each generation, for every population member *xᵢ*:
//! 1. **Mutation**: `v = x_r1 + F * (x_r2 - x_r3)` with `r1`, `r2`, `r3`
//!    distinct and different from `i`, clamped to the domain.
//! 2. **Crossover**: take each coordinate from *v* with probability CR, and
//!    at least one coordinate always.
//! 3. **Selection**: replace *xᵢ* with the trial vector if it is no worse.
//!
//! # Parameters
//!
//! | Position | Name | Range | Default |
//! |----------|------|-------|---------|
//! | 0 | `F` (mutation factor) | `[0, 2]` | 0.8 |
//! | 1 | `CR` (crossover rate) | `[0, 1]` | 0.9 |
//! | 2 | population size | `>= 4` | 20 |
//! | 3 | iterations | `>= 0` | 100 |
//!
//! Missing trailing parameters take their defaults, so a single run may pass
//! an empty slice.

use crate::domain::Domain;
use crate::error::EvaluationError;
use crate::evaluator::Evaluator;
use crate::parameter::ParameterDescriptor;
use crate::plugin::{Algorithm, Solution};
use crate::select::BestTracker;

const DEFAULT_MUTATION_FACTOR: f64 = 0.8;
const DEFAULT_CROSSOVER_RATE: f64 = 0.9;
const DEFAULT_POPULATION: f64 = 20.0;
const DEFAULT_ITERATIONS: f64 = 100.0;
const MIN_POPULATION: usize = 4;

/// Differential Evolution over a box domain.
///
/// # Examples
///
/// ```
/// use optimizer_engine::builtin::DifferentialEvolution;
/// use optimizer_engine::plugin::Algorithm;
///
/// let de = DifferentialEvolution::with_seed(42);
/// assert_eq!(de.name(), "DifferentialEvolution");
/// assert_eq!(de.parameter_descriptors().len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct DifferentialEvolution {
    seed: Option<u64>,
}

impl DifferentialEvolution {
    /// Creates an instance with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an instance with a fixed RNG seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

/// Hyper-parameters decoded from the positional parameter vector.
struct Settings {
    mutation_factor: f64,
    crossover_rate: f64,
    population: usize,
    iterations: usize,
}

impl Settings {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn parse(parameters: &[f64]) -> core::result::Result<Self, EvaluationError> {
        let at = |i: usize, default: f64| parameters.get(i).copied().unwrap_or(default);
        let mutation_factor = at(0, DEFAULT_MUTATION_FACTOR);
        let crossover_rate = at(1, DEFAULT_CROSSOVER_RATE);
        let population = at(2, DEFAULT_POPULATION);
        let iterations = at(3, DEFAULT_ITERATIONS);

        if !(0.0..=2.0).contains(&mutation_factor) {
            return Err(EvaluationError::InvalidParameters(format!(
                "F must be in [0, 2], got {mutation_factor}"
            )));
        }
        if !(0.0..=1.0).contains(&crossover_rate) {
            return Err(EvaluationError::InvalidParameters(format!(
                "CR must be in [0, 1], got {crossover_rate}"
            )));
        }
        if !population.is_finite() || population.round() < MIN_POPULATION as f64 {
            return Err(EvaluationError::InvalidParameters(format!(
                "population must be at least {MIN_POPULATION}, got {population}"
            )));
        }
        if !iterations.is_finite() || iterations < 0.0 {
            return Err(EvaluationError::InvalidParameters(format!(
                "iterations must be non-negative, got {iterations}"
            )));
        }

        Ok(Self {
            mutation_factor,
            crossover_rate,
            population: population.round() as usize,
            iterations: iterations.round() as usize,
        })
    }
}

fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Select three distinct random indices from `0..n`, all different from `exclude`.
fn pick_three(rng: &mut fastrand::Rng, n: usize, exclude: usize) -> [usize; 3] {
    let mut picked = [exclude; 3];
    let mut filled = 0;
    while filled < 3 {
        let idx = rng.usize(0..n);
        if idx != exclude && !picked[..filled].contains(&idx) {
            picked[filled] = idx;
            filled += 1;
        }
    }
    picked
}

impl Algorithm for DifferentialEvolution {
    fn name(&self) -> &str {
        "DifferentialEvolution"
    }

    fn parameter_descriptors(&self) -> Vec<ParameterDescriptor> {
        vec![
            ParameterDescriptor::new("F", "Mutation factor", 0.0, 2.0),
            ParameterDescriptor::new("CR", "Crossover rate", 0.0, 1.0),
        ]
    }

    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        domain: &Domain,
        parameters: &[f64],
    ) -> core::result::Result<Solution, EvaluationError> {
        let settings = Settings::parse(parameters)?;
        let mut rng = self.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let dim = domain.dimension();

        let mut population: Vec<Vec<f64>> = (0..settings.population)
            .map(|_| {
                (0..dim)
                    .map(|d| f64_range(&mut rng, domain.lower(d), domain.upper(d)))
                    .collect()
            })
            .collect();
        let mut values = evaluator.evaluate_batch(&population)?;

        let mut best = BestTracker::new();
        for (i, &v) in values.iter().enumerate() {
            best.offer(i, v);
        }
        let mut best_point = best.best().map(|(i, _)| population[i].clone());

        for _ in 0..settings.iterations {
            for i in 0..settings.population {
                let [r1, r2, r3] = pick_three(&mut rng, settings.population, i);
                let j_rand = rng.usize(0..dim);
                let trial: Vec<f64> = (0..dim)
                    .map(|d| {
                        if d == j_rand || rng.f64() < settings.crossover_rate {
                            let spread = population[r2][d] - population[r3][d];
                            let v = population[r1][d] + settings.mutation_factor * spread;
                            domain.clamp(d, v)
                        } else {
                            population[i][d]
                        }
                    })
                    .collect();

                let value = evaluator.evaluate(&trial)?;
                if value <= values[i] || values[i].is_nan() {
                    if best.offer(usize::MAX, value) {
                        best_point = Some(trial.clone());
                    }
                    population[i] = trial;
                    values[i] = value;
                }
            }
        }

        match (best_point, best.best()) {
            (Some(best_point), Some((_, best_value))) => Ok(Solution {
                best_point,
                best_value,
            }),
            _ => Err(EvaluationError::Other(
                "no candidate produced a comparable value".into(),
            )),
        }
    }
}
