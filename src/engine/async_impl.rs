use std::sync::Arc;

use super::{Engine, PreparedSweep, SweepPlan};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::types::{AlgorithmResult, AlgorithmSweepSpec, FitnessFunctionSpec, SweepTrial};

type SweepOutcome = (usize, SweepPlan, Result<(AlgorithmResult, Vec<SweepTrial>)>);

impl Engine {
    /// Like [`run_multi_algorithm_sweep`](Self::run_multi_algorithm_sweep),
    /// but sweeps up to `concurrency` algorithms at the same time.
    ///
    /// Preparation (resolution, decoding, expansion) happens exactly as in
    /// the sequential version and finishes before any sweep starts. Each
    /// algorithm's sweep then runs on its own
    /// [`spawn_blocking`](tokio::task::spawn_blocking) task; configurations
    /// inside one sweep stay sequential. Results come back in request order.
    /// A `concurrency` of zero is treated as one.
    ///
    /// The first failing sweep aborts the whole request: no further sweep is
    /// started, running sweeps stop before their next configuration, and no
    /// report is emitted. Reports are only emitted once every sweep has
    /// succeeded.
    ///
    /// # Errors
    ///
    /// Returns the same errors as the sequential version. If several sweeps
    /// fail, the error that aborted the request is returned. Returns
    /// `Error::TaskError` if a blocking task panics or the semaphore closes.
    ///
    /// # Examples
    ///
    /// ```
    /// use optimizer_engine::prelude::*;
    ///
    /// # #[cfg(feature = "async")]
    /// # async fn example() -> optimizer_engine::Result<()> {
    /// let engine = Engine::new(builtin::store());
    /// let results = engine
    ///     .run_multi_algorithm_sweep_parallel(
    ///         &[AlgorithmSweepSpec::new("DifferentialEvolution", vec![1.0, 0.5])],
    ///         &FitnessFunctionSpec::new("Sphere", "[[-5,5],[-5,5]]"),
    ///         10.0,
    ///         20.0,
    ///         4,
    ///     )
    ///     .await?;
    /// assert_eq!(results.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_multi_algorithm_sweep_parallel(
        &self,
        algorithms: &[AlgorithmSweepSpec],
        fitness_function: &FitnessFunctionSpec,
        population: f64,
        iterations: f64,
        concurrency: usize,
    ) -> Result<Vec<AlgorithmResult>> {
        use tokio::sync::Semaphore;
        use tokio::task::JoinSet;

        let concurrency = concurrency.max(1);
        trace_info!(
            algorithms = algorithms.len(),
            concurrency,
            "parallel sweep started"
        );

        self.check_cancelled()?;

        let engine = self.clone();
        let specs = algorithms.to_vec();
        let spec = fitness_function.clone();
        let PreparedSweep {
            plans,
            fitness,
            domain,
        } = tokio::task::spawn_blocking(move || engine.prepare_sweep(&specs, &spec))
            .await
            .map_err(|e| Error::TaskError(e.to_string()))??;

        let abort = CancellationToken::new();
        let request = Engine {
            request_abort: Some(abort.clone()),
            ..self.clone()
        };
        let fitness = Arc::new(fitness);
        let domain = Arc::new(domain);
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut join_set: JoinSet<SweepOutcome> = JoinSet::new();
        let mut slots: Vec<Option<(SweepPlan, AlgorithmResult, Vec<SweepTrial>)>> =
            core::iter::repeat_with(|| None).take(plans.len()).collect();

        for (index, mut plan) in plans.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| Error::TaskError(e.to_string()))?;
            if abort.is_stopped() {
                break;
            }

            let engine = request.clone();
            let abort = abort.clone();
            let fitness = Arc::clone(&fitness);
            let domain = Arc::clone(&domain);
            join_set.spawn_blocking(move || {
                let outcome = engine.execute_sweep(
                    &mut plan.algorithm,
                    &fitness,
                    &domain,
                    &plan.configurations,
                    population,
                    iterations,
                );
                // Set before the permit is released, so no new sweep starts.
                if outcome.is_err() {
                    abort.stop();
                }
                drop(permit);
                (index, plan, outcome)
            });
        }

        let mut failure: Option<Error> = None;
        while let Some(joined) = join_set.join_next().await {
            let err = match joined {
                Ok((index, plan, Ok((result, trials)))) => {
                    slots[index] = Some((plan, result, trials));
                    continue;
                }
                Ok((_, _, Err(err))) => err,
                Err(e) => {
                    abort.stop();
                    Error::TaskError(e.to_string())
                }
            };
            // Siblings stopped by the abort report `Cancelled`; keep the cause.
            failure = match failure {
                None | Some(Error::Cancelled) => Some(err),
                kept => kept,
            };
        }
        if let Some(err) = failure {
            trace_warn!(error = %err, "parallel sweep aborted");
            return Err(err);
        }

        let mut results = Vec::with_capacity(slots.len());
        for slot in slots {
            let (plan, result, trials) =
                slot.ok_or_else(|| Error::TaskError("sweep produced no result".into()))?;
            self.emit_sweep(&plan, fitness.name(), &result, &trials);
            results.push(result);
        }
        Ok(results)
    }
}
