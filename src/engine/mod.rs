//! The execution engine.
//!
//! [`Engine`] turns requests naming algorithms and fitness functions into
//! results. Every request runs in two phases:
//!
//! 1. **Prepare**: resolve every plugin, decode every domain, check evaluator
//!    compatibility, and expand every sweep. Any failure here aborts the
//!    request before a single `solve` call.
//! 2. **Execute**: run the configurations in order, select the best, hand
//!    each result to the report sink.
//!
//! Within one algorithm configurations always run sequentially, in sweep
//! order. With the `async` feature,
//! [`run_multi_algorithm_sweep_parallel`](Engine::run_multi_algorithm_sweep_parallel)
//! runs different algorithms concurrently.

#[cfg(feature = "async")]
mod async_impl;
mod builder;

use core::panic::AssertUnwindSafe;
use std::sync::Arc;

pub use builder::EngineBuilder;

use crate::cancel::CancellationToken;
use crate::domain::{self, Domain};
use crate::error::{Error, EvaluationError, Result};
use crate::evaluator::Evaluator;
use crate::parameter::{Configuration, ParameterDescriptor, SweepRange};
use crate::plugin::PluginStore;
use crate::registry::{AlgorithmHandle, FitnessFunctionHandle, PluginRegistry, panic_message};
use crate::report::{self, Report, ReportSink};
use crate::select::BestTracker;
use crate::sweep;
use crate::types::{
    AlgorithmResult, AlgorithmSweepSpec, FailurePolicy, FitnessFunctionSpec, RunResult, SweepTrial,
};

/// Default cap on the number of configurations a single sweep may expand to.
pub const DEFAULT_MAX_CONFIGURATIONS: usize = 1_000_000;

/// Dispatches optimization requests to plugins.
///
/// Cheap to clone; clones share the plugin store, report sink, and
/// cancellation token.
///
/// # Examples
///
/// ```
/// use optimizer_engine::prelude::*;
///
/// let engine = Engine::new(builtin::store());
/// let results = engine
///     .run_single_algorithm_against_functions(
///         "DifferentialEvolution",
///         &[FitnessFunctionSpec::new("Sphere", "[[-5,5],[-5,5]]")],
///         &[0.8, 0.9, 20.0, 50.0],
///     )
///     .unwrap();
///
/// assert_eq!(results.len(), 1);
/// assert!(results[0].best_value < 1.0);
/// ```
#[derive(Clone)]
pub struct Engine {
    pub(crate) registry: PluginRegistry,
    pub(crate) sink: Arc<dyn ReportSink>,
    pub(crate) failure_policy: FailurePolicy,
    pub(crate) max_configurations: usize,
    pub(crate) token: CancellationToken,
    /// Stop flag scoped to one request, set when a sibling sweep fails.
    pub(crate) request_abort: Option<CancellationToken>,
}

/// A resolved algorithm together with its expanded sweep.
pub(crate) struct SweepPlan {
    pub(crate) unit: String,
    pub(crate) algorithm: AlgorithmHandle,
    pub(crate) descriptors: Vec<ParameterDescriptor>,
    pub(crate) configurations: Vec<Configuration>,
}

/// Everything a multi-algorithm sweep needs before it starts executing.
pub(crate) struct PreparedSweep {
    pub(crate) plans: Vec<SweepPlan>,
    pub(crate) fitness: FitnessFunctionHandle,
    pub(crate) domain: Domain,
}

impl Engine {
    /// Creates an engine over `store` with default settings.
    #[must_use]
    pub fn new(store: impl PluginStore + 'static) -> Self {
        Self::builder().store(store).build()
    }

    /// Returns a builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The registry resolving plugin names.
    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// The engine's cancellation token. Clones control the same flag.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// The configured failure policy.
    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Names of all algorithm units, sorted.
    #[must_use]
    pub fn algorithm_names(&self) -> Vec<String> {
        self.registry.store().algorithm_names()
    }

    /// Names of all fitness-function units, sorted.
    #[must_use]
    pub fn fitness_function_names(&self) -> Vec<String> {
        self.registry.store().fitness_function_names()
    }

    /// The tunable hyper-parameters of the algorithm unit `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PluginNotFound`] or [`Error::PluginInvalid`] if the
    /// algorithm cannot be resolved.
    pub fn parameter_descriptors(&self, name: &str) -> Result<Vec<ParameterDescriptor>> {
        Ok(self.registry.resolve_algorithm(name)?.parameter_descriptors())
    }

    /// Runs `algorithm` once against `fitness` over `domain`.
    ///
    /// Binds the fitness function to the algorithm's evaluator shape, calls
    /// `solve` with `parameters`, and counts every evaluated point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleEvaluator`] before `solve` is invoked if
    /// the fitness function cannot be bound, and
    /// [`Error::EvaluationFailure`] if `solve` fails or panics.
    pub fn run_once(
        &self,
        algorithm: &mut AlgorithmHandle,
        fitness: &FitnessFunctionHandle,
        domain: &Domain,
        parameters: &[f64],
    ) -> Result<RunResult> {
        let unit = algorithm.unit_name().to_owned();
        let evaluator = Evaluator::bind(
            &unit,
            algorithm.evaluator_shape(),
            fitness.name(),
            fitness.function(),
            domain,
        )?;

        let solved = std::panic::catch_unwind(AssertUnwindSafe(|| {
            algorithm
                .algorithm_mut()
                .solve(&evaluator, domain, parameters)
        }));
        let solution = match solved {
            Ok(Ok(solution)) => solution,
            Ok(Err(source)) => {
                return Err(Error::EvaluationFailure {
                    algorithm: unit,
                    source,
                });
            }
            Err(payload) => {
                return Err(Error::EvaluationFailure {
                    algorithm: unit,
                    source: EvaluationError::Panicked(panic_message(&*payload)),
                });
            }
        };

        Ok(RunResult {
            best_point: solution.best_point,
            best_value: solution.best_value,
            evaluation_count: evaluator.evaluations(),
        })
    }

    /// Runs every configuration of a sweep and returns the best one.
    ///
    /// Each configuration is extended with `population` and `iterations`
    /// before it is passed to [`run_once`](Self::run_once). Configurations
    /// run in the given order; ties keep the earliest.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptySweep`] if `configurations` is empty.
    /// - [`Error::IncompatibleEvaluator`] before any invocation.
    /// - [`Error::Cancelled`] if the cancellation token is stopped between
    ///   configurations.
    /// - [`Error::EvaluationFailure`] on the first failing configuration
    ///   under [`FailurePolicy::Abort`].
    /// - [`Error::NoCompletedConfigurations`] if no configuration produced a
    ///   comparable value. Under either policy this includes a sweep where
    ///   every configuration ran and returned `NaN`.
    pub fn run_sweep(
        &self,
        algorithm: &mut AlgorithmHandle,
        fitness: &FitnessFunctionHandle,
        domain: &Domain,
        configurations: &[Configuration],
        population: f64,
        iterations: f64,
    ) -> Result<AlgorithmResult> {
        self.execute_sweep(
            algorithm,
            fitness,
            domain,
            configurations,
            population,
            iterations,
        )
        .map(|(result, _)| result)
    }

    pub(crate) fn execute_sweep(
        &self,
        algorithm: &mut AlgorithmHandle,
        fitness: &FitnessFunctionHandle,
        domain: &Domain,
        configurations: &[Configuration],
        population: f64,
        iterations: f64,
    ) -> Result<(AlgorithmResult, Vec<SweepTrial>)> {
        let unit = algorithm.unit_name().to_owned();
        if configurations.is_empty() {
            return Err(Error::EmptySweep { algorithm: unit });
        }
        Evaluator::bind(
            &unit,
            algorithm.evaluator_shape(),
            fitness.name(),
            fitness.function(),
            domain,
        )?;

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "sweep",
            algorithm = %unit,
            configurations = configurations.len()
        )
        .entered();

        let mut trials = Vec::with_capacity(configurations.len());
        let mut best = BestTracker::new();

        for (index, configuration) in configurations.iter().enumerate() {
            self.check_cancelled()?;

            let parameters = sweep::extend_with_budget(configuration, population, iterations);
            match self.run_once(algorithm, fitness, domain, &parameters) {
                Ok(result) => {
                    trace_debug!(index, value = result.best_value, "configuration completed");
                    best.offer(trials.len(), result.best_value);
                    trials.push(SweepTrial {
                        index,
                        configuration: configuration.clone(),
                        result,
                    });
                }
                Err(err @ Error::EvaluationFailure { .. })
                    if self.failure_policy == FailurePolicy::SkipFailed =>
                {
                    trace_warn!(index, error = %err, "configuration failed, skipping");
                    #[cfg(not(feature = "tracing"))]
                    let _ = err;
                }
                Err(err) => return Err(err),
            }
        }

        let Some((best_idx, _)) = best.best() else {
            return Err(Error::NoCompletedConfigurations { algorithm: unit });
        };
        let winner = &trials[best_idx];
        let result = AlgorithmResult {
            algorithm_name: algorithm.name().to_owned(),
            best_configuration: winner.configuration.clone(),
            best_value: winner.result.best_value,
            best_point: winner.result.best_point.clone(),
            configurations_run: trials.len(),
        };
        trace_info!(
            algorithm = %unit,
            best_value = result.best_value,
            completed = trials.len(),
            "sweep finished"
        );
        Ok((result, trials))
    }

    /// Runs one algorithm against several fitness functions with a fixed
    /// parameter vector.
    ///
    /// The algorithm is resolved first, then every fitness function, then
    /// every domain is decoded; only then do the runs start, in input
    /// order. Every result is handed to the report sink.
    ///
    /// # Errors
    ///
    /// Returns the first resolution, decoding, binding, or evaluation error.
    /// No partial results are returned.
    pub fn run_single_algorithm_against_functions(
        &self,
        algorithm: &str,
        fitness_functions: &[FitnessFunctionSpec],
        parameters: &[f64],
    ) -> Result<Vec<RunResult>> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "run_single_algorithm",
            algorithm,
            functions = fitness_functions.len()
        )
        .entered();

        self.check_cancelled()?;

        let mut handle = self.registry.resolve_algorithm(algorithm)?;
        let functions = fitness_functions
            .iter()
            .map(|spec| self.registry.resolve_fitness_function(&spec.name))
            .collect::<Result<Vec<_>>>()?;
        let domains = fitness_functions
            .iter()
            .map(|spec| domain::decode(&spec.domain))
            .collect::<Result<Vec<_>>>()?;
        for (fitness, domain) in functions.iter().zip(&domains) {
            Evaluator::bind(
                algorithm,
                handle.evaluator_shape(),
                fitness.name(),
                fitness.function(),
                domain,
            )?;
        }

        let mut results = Vec::with_capacity(functions.len());
        for (fitness, domain) in functions.iter().zip(&domains) {
            self.check_cancelled()?;
            let result = self.run_once(&mut handle, fitness, domain, parameters)?;
            trace_info!(
                algorithm,
                fitness_function = fitness.name(),
                best_value = result.best_value,
                evaluations = result.evaluation_count,
                "run finished"
            );

            self.emit(
                &Report::Run {
                    algorithm,
                    fitness_function: fitness.name(),
                    parameters,
                    result: &result,
                },
                &report::run_destination(fitness.name(), algorithm, chrono::Utc::now()),
            );
            results.push(result);
        }
        Ok(results)
    }

    /// Sweeps the hyper-parameters of several algorithms against one fitness
    /// function and returns each algorithm's best configuration, in request
    /// order.
    ///
    /// Swept ranges take their bounds from each algorithm's parameter
    /// descriptors and their steps from the request. Every algorithm is
    /// resolved before the fitness function, the fitness function before
    /// the domain is decoded, and every sweep is validated and expanded
    /// before the first configuration runs. Algorithms then run one after
    /// another.
    ///
    /// # Errors
    ///
    /// - [`Error::PluginNotFound`] / [`Error::PluginInvalid`] from resolution.
    /// - [`Error::DomainMalformed`] for a bad domain.
    /// - [`Error::InvalidSweepSpec`] for a step count that does not match the
    ///   descriptors, a non-positive step, or an expansion above the
    ///   configured limit.
    /// - [`Error::EmptySweep`] if any sweep expands to nothing.
    /// - Any error from [`run_sweep`](Self::run_sweep).
    pub fn run_multi_algorithm_sweep(
        &self,
        algorithms: &[AlgorithmSweepSpec],
        fitness_function: &FitnessFunctionSpec,
        population: f64,
        iterations: f64,
    ) -> Result<Vec<AlgorithmResult>> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "run_multi_algorithm_sweep",
            algorithms = algorithms.len(),
            fitness_function = %fitness_function.name
        )
        .entered();

        self.check_cancelled()?;
        let PreparedSweep {
            plans,
            fitness,
            domain,
        } = self.prepare_sweep(algorithms, fitness_function)?;

        let mut results = Vec::with_capacity(plans.len());
        for mut plan in plans {
            let (result, trials) = self.execute_sweep(
                &mut plan.algorithm,
                &fitness,
                &domain,
                &plan.configurations,
                population,
                iterations,
            )?;
            self.emit_sweep(&plan, fitness.name(), &result, &trials);
            results.push(result);
        }
        Ok(results)
    }

    pub(crate) fn prepare_sweep(
        &self,
        algorithms: &[AlgorithmSweepSpec],
        fitness_function: &FitnessFunctionSpec,
    ) -> Result<PreparedSweep> {
        let handles = algorithms
            .iter()
            .map(|spec| self.registry.resolve_algorithm(&spec.name))
            .collect::<Result<Vec<_>>>()?;
        let fitness = self
            .registry
            .resolve_fitness_function(&fitness_function.name)?;
        let domain = domain::decode(&fitness_function.domain)?;

        let mut plans = Vec::with_capacity(handles.len());
        for (spec, algorithm) in algorithms.iter().zip(handles) {
            let descriptors = algorithm.parameter_descriptors();
            if spec.steps.len() != descriptors.len() {
                return Err(Error::InvalidSweepSpec {
                    algorithm: spec.name.clone(),
                    reason: format!(
                        "expected {} steps, one per parameter, got {}",
                        descriptors.len(),
                        spec.steps.len()
                    ),
                });
            }
            let ranges: Vec<SweepRange> = descriptors
                .iter()
                .zip(&spec.steps)
                .map(|(d, &step)| d.sweep(step))
                .collect();
            let configurations =
                sweep::expand_with_limit(&ranges, &spec.name, self.max_configurations)?;
            if configurations.is_empty() {
                return Err(Error::EmptySweep {
                    algorithm: spec.name.clone(),
                });
            }
            Evaluator::bind(
                &spec.name,
                algorithm.evaluator_shape(),
                fitness.name(),
                fitness.function(),
                &domain,
            )?;
            trace_debug!(
                algorithm = %spec.name,
                configurations = configurations.len(),
                "sweep expanded"
            );

            plans.push(SweepPlan {
                unit: spec.name.clone(),
                algorithm,
                descriptors,
                configurations,
            });
        }

        Ok(PreparedSweep {
            plans,
            fitness,
            domain,
        })
    }

    pub(crate) fn emit_sweep(
        &self,
        plan: &SweepPlan,
        fitness_function: &str,
        result: &AlgorithmResult,
        trials: &[SweepTrial],
    ) {
        self.emit(
            &Report::Sweep {
                fitness_function,
                result,
                trials,
                descriptors: &plan.descriptors,
            },
            &report::sweep_destination(fitness_function, &plan.unit, chrono::Utc::now()),
        );
    }

    /// Hands a report to the sink. Failures are logged, never returned.
    fn emit(&self, report: &Report<'_>, destination: &str) {
        if let Err(err) = self.sink.render(report, destination) {
            trace_warn!(destination, error = %err, "report sink failed");
            #[cfg(not(feature = "tracing"))]
            let _ = err;
        }
    }

    pub(crate) fn check_cancelled(&self) -> Result<()> {
        let aborted = self
            .request_abort
            .as_ref()
            .is_some_and(CancellationToken::is_stopped);
        if self.token.is_stopped() || aborted {
            trace_info!("request cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}
