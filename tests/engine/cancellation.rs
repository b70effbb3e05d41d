use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use optimizer_engine::domain::Domain;
use optimizer_engine::parameter::ParameterDescriptor;
use optimizer_engine::plugin::{Algorithm, Solution};
use optimizer_engine::{
    AlgorithmSweepSpec, CancellationToken, Error, EvaluationError, Evaluator, FitnessFunctionSpec,
};

use crate::common::Fixture;

fn sweep_recorder(engine: &optimizer_engine::Engine) -> optimizer_engine::Result<usize> {
    engine
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5])],
            &FitnessFunctionSpec::new("Sphere", "[[-1,1]]"),
            10.0,
            20.0,
        )
        .map(|results| results.len())
}

#[test]
fn test_stopped_token_rejects_requests() {
    let fx = Fixture::new();
    let engine = fx.engine();
    engine.cancellation_token().stop();

    assert!(matches!(sweep_recorder(&engine), Err(Error::Cancelled)));
    let err = engine
        .run_single_algorithm_against_functions(
            "Recorder",
            &[FitnessFunctionSpec::new("Sphere", "[[-1,1]]")],
            &[],
        )
        .unwrap_err();
    assert_eq!(err.code(), "cancelled");
    assert_eq!(err.to_string(), "calculations were stopped");
    assert!(fx.calls().is_empty());
}

#[test]
fn test_resume_allows_new_requests() {
    let fx = Fixture::new();
    let engine = fx.engine();
    let token = engine.cancellation_token();

    token.stop();
    assert!(sweep_recorder(&engine).is_err());
    token.resume();
    assert_eq!(sweep_recorder(&engine).unwrap(), 1);
    assert_eq!(fx.calls().len(), 9);
}

/// Stops the shared token from inside its second `solve` call.
struct StopsOnSecondCall {
    token: CancellationToken,
    calls: Arc<AtomicUsize>,
}

impl Algorithm for StopsOnSecondCall {
    fn name(&self) -> &str {
        "StopsOnSecondCall"
    }

    fn parameter_descriptors(&self) -> Vec<ParameterDescriptor> {
        vec![ParameterDescriptor::new("x", "knob", 0.0, 4.0)]
    }

    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        domain: &Domain,
        parameters: &[f64],
    ) -> Result<Solution, EvaluationError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 1 {
            self.token.stop();
        }
        let point: Vec<f64> = (0..domain.dimension()).map(|d| domain.lower(d)).collect();
        let value = evaluator.evaluate(&point)? + parameters[0];
        Ok(Solution {
            best_point: point,
            best_value: value,
        })
    }
}

#[test]
fn test_stop_between_configurations() {
    let fx = Fixture::new();
    let token = CancellationToken::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let (t, c) = (token.clone(), Arc::clone(&calls));
    fx.store.register_algorithm("StopsOnSecondCall", move || StopsOnSecondCall {
        token: t.clone(),
        calls: Arc::clone(&c),
    });

    let engine = fx.builder().cancellation_token(token.clone()).build();
    let err = engine
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("StopsOnSecondCall", vec![1.0])],
            &FitnessFunctionSpec::new("Sphere", "[[0,1]]"),
            4.0,
            1.0,
        )
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    // The in-flight call finishes; the third configuration never starts.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(token.is_stopped());
}

#[test]
fn test_engine_clones_share_token() {
    let fx = Fixture::new();
    let engine = fx.engine();
    let clone = engine.clone();

    clone.cancellation_token().stop();
    assert!(engine.cancellation_token().is_stopped());
    assert!(matches!(sweep_recorder(&engine), Err(Error::Cancelled)));
}

#[test]
fn test_one_token_many_engines() {
    let fx = Fixture::new();
    let token = CancellationToken::new();
    let first = fx.builder().cancellation_token(token.clone()).build();
    let second = fx.builder().cancellation_token(token.clone()).build();

    token.stop();
    assert!(sweep_recorder(&first).is_err());
    assert!(sweep_recorder(&second).is_err());
}
