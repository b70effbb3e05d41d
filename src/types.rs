//! Request and result types shared by the engine entry points.

use serde::{Deserialize, Serialize};

use crate::parameter::Configuration;

/// The outcome of one `solve` invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// The best point found.
    pub best_point: Vec<f64>,
    /// The fitness at `best_point`.
    pub best_value: f64,
    /// How many points were evaluated.
    pub evaluation_count: usize,
}

/// The best configuration found for one algorithm in a sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmResult {
    /// The algorithm's display name.
    pub algorithm_name: String,
    /// The swept hyper-parameters (without population and iterations) that
    /// produced `best_value`.
    pub best_configuration: Configuration,
    /// The smallest objective value over all configurations.
    pub best_value: f64,
    /// The point at which `best_value` was reached.
    pub best_point: Vec<f64>,
    /// Number of configurations that were run.
    pub configurations_run: usize,
}

/// One configuration of a sweep together with the run it produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepTrial {
    /// Position of the configuration in sweep order.
    pub index: usize,
    /// The swept hyper-parameters.
    pub configuration: Configuration,
    /// The run's result.
    pub result: RunResult,
}

/// A fitness function named by the caller, with the domain to search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessFunctionSpec {
    /// Unit name of the fitness function.
    pub name: String,
    /// Domain in its JSON wire format, e.g. `"[[-5,5],[-5,5]]"`.
    pub domain: String,
}

impl FitnessFunctionSpec {
    /// Creates a new spec.
    #[must_use]
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }
}

/// An algorithm to sweep, with one step per hyper-parameter.
///
/// Lower and upper bounds of each swept range come from the algorithm's own
/// parameter descriptors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmSweepSpec {
    /// Unit name of the algorithm.
    pub name: String,
    /// Step per hyper-parameter, aligned with the descriptors.
    pub steps: Vec<f64>,
}

impl AlgorithmSweepSpec {
    /// Creates a new spec.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

/// What a sweep does when a configuration fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Abort the whole request on the first failure.
    #[default]
    Abort,
    /// Log the failure, skip the configuration, and continue.
    SkipFailed,
}
