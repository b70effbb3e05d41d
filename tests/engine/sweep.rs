use optimizer_engine::domain::Domain;
use optimizer_engine::parameter::ParameterDescriptor;
use optimizer_engine::plugin::{Algorithm, Solution};
use optimizer_engine::{
    AlgorithmSweepSpec, Engine, Error, EvaluationError, Evaluator, FitnessFunctionSpec,
};

use crate::common::Fixture;

fn sphere() -> FitnessFunctionSpec {
    FitnessFunctionSpec::new("Sphere", "[[-1,1],[-1,1]]")
}

#[test]
fn test_recorder_sweep_finds_predicted_best() {
    let fx = Fixture::new();
    let results = fx
        .engine()
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5])],
            &sphere(),
            10.0,
            20.0,
        )
        .expect("sweep should succeed");

    assert_eq!(results.len(), 1);
    let best = &results[0];
    assert_eq!(best.algorithm_name, "Recorder");
    assert_eq!(best.best_configuration, vec![1.0, 0.5]);
    assert_eq!(best.best_value, 0.0);
    assert_eq!(best.best_point, vec![0.0, 0.0]);
    assert_eq!(best.configurations_run, 9);
}

#[test]
fn test_configurations_run_in_sweep_order_with_budget_appended() {
    let fx = Fixture::new();
    fx.engine()
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5])],
            &sphere(),
            10.0,
            20.0,
        )
        .unwrap();

    let calls = fx.calls();
    assert_eq!(calls.len(), 9);
    assert_eq!(calls[0], vec![0.0, 0.0, 10.0, 20.0]);
    assert_eq!(calls[1], vec![0.0, 0.5, 10.0, 20.0]);
    assert_eq!(calls[2], vec![0.0, 1.0, 10.0, 20.0]);
    assert_eq!(calls[3], vec![1.0, 0.0, 10.0, 20.0]);
    assert_eq!(calls[8], vec![2.0, 1.0, 10.0, 20.0]);
}

#[test]
fn test_ties_keep_earliest_configuration() {
    let fx = Fixture::new();
    // a in {0, 2}, b in {0, 1}: every configuration scores 1.25.
    let results = fx
        .engine()
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("Recorder", vec![2.0, 1.0])],
            &sphere(),
            4.0,
            1.0,
        )
        .unwrap();

    assert_eq!(results[0].best_configuration, vec![0.0, 0.0]);
    assert_eq!(results[0].best_value, 1.25);
    assert_eq!(results[0].configurations_run, 4);
}

#[test]
fn test_results_follow_request_order() {
    let fx = Fixture::new();
    let results = fx
        .engine()
        .run_multi_algorithm_sweep(
            &[
                AlgorithmSweepSpec::new("DifferentialEvolution", vec![1.0, 0.5]),
                AlgorithmSweepSpec::new("Recorder", vec![1.0, 1.0]),
            ],
            &sphere(),
            8.0,
            5.0,
        )
        .unwrap();

    let names: Vec<_> = results.iter().map(|r| r.algorithm_name.as_str()).collect();
    assert_eq!(names, vec!["DifferentialEvolution", "Recorder"]);
    assert_eq!(results[0].configurations_run, 9);
    assert_eq!(results[1].configurations_run, 6);
}

#[test]
fn test_step_count_must_match_descriptors() {
    let fx = Fixture::new();
    let err = fx
        .engine()
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("Recorder", vec![1.0])],
            &sphere(),
            10.0,
            20.0,
        )
        .unwrap_err();

    assert!(matches!(err, Error::InvalidSweepSpec { .. }), "{err:?}");
    assert!(fx.calls().is_empty());
}

#[test]
fn test_non_positive_step_runs_nothing() {
    let fx = Fixture::new();
    for step in [0.0, -0.5, f64::NAN] {
        let err = fx
            .engine()
            .run_multi_algorithm_sweep(
                &[
                    AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5]),
                    AlgorithmSweepSpec::new("Recorder", vec![1.0, step]),
                ],
                &sphere(),
                10.0,
                20.0,
            )
            .unwrap_err();
        assert_eq!(err.code(), "invalid_sweep_spec");
    }
    assert!(fx.calls().is_empty(), "no configuration may run");
}

#[test]
fn test_expansion_limit() {
    let fx = Fixture::new();
    let engine = fx.builder().max_configurations(8).build();
    let err = engine
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5])],
            &sphere(),
            10.0,
            20.0,
        )
        .unwrap_err();

    match err {
        Error::InvalidSweepSpec { reason, .. } => assert!(reason.contains("limit is 8")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(fx.calls().is_empty());
}

#[test]
fn test_tiny_step_is_rejected_not_overflowed() {
    let fx = Fixture::new();
    for engine in [fx.engine(), fx.builder().max_configurations(usize::MAX).build()] {
        let err = engine
            .run_multi_algorithm_sweep(
                &[AlgorithmSweepSpec::new("Recorder", vec![1e-20, 0.5])],
                &FitnessFunctionSpec::new("Sphere", "[[-1,1]]"),
                10.0,
                20.0,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSweepSpec { .. }), "{err:?}");
    }
    assert!(fx.calls().is_empty());
}

struct Inverted;

impl Algorithm for Inverted {
    fn name(&self) -> &str {
        "Inverted"
    }

    fn parameter_descriptors(&self) -> Vec<ParameterDescriptor> {
        vec![ParameterDescriptor::new("x", "upside down", 1.0, 0.0)]
    }

    fn solve(
        &mut self,
        _evaluator: &Evaluator<'_>,
        _domain: &Domain,
        _parameters: &[f64],
    ) -> Result<Solution, EvaluationError> {
        unreachable!("an empty sweep never runs")
    }
}

#[test]
fn test_inverted_descriptor_is_empty_sweep() {
    let fx = Fixture::new();
    fx.store.register_algorithm("Inverted", || Inverted);

    let err = fx
        .engine()
        .run_multi_algorithm_sweep(
            &[
                AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5]),
                AlgorithmSweepSpec::new("Inverted", vec![0.1]),
            ],
            &sphere(),
            10.0,
            20.0,
        )
        .unwrap_err();

    assert!(matches!(err, Error::EmptySweep { ref algorithm } if algorithm == "Inverted"));
    assert!(fx.calls().is_empty());
}

#[test]
fn test_run_sweep_building_block() {
    let fx = Fixture::new();
    let engine: Engine = fx.engine();
    let mut algorithm = engine.registry().resolve_algorithm("Recorder").unwrap();
    let fitness = engine.registry().resolve_fitness_function("Sphere").unwrap();
    let domain = optimizer_engine::domain::decode("[[2,4]]").unwrap();

    let configurations = vec![vec![0.0, 0.0], vec![1.0, 0.5], vec![2.0, 1.0]];
    let best = engine
        .run_sweep(&mut algorithm, &fitness, &domain, &configurations, 3.0, 7.0)
        .unwrap();
    // Centre of [2, 4] is 3, so every value carries a base of 9.
    assert_eq!(best.best_configuration, vec![1.0, 0.5]);
    assert_eq!(best.best_value, 9.0);
    assert_eq!(fx.calls()[1], vec![1.0, 0.5, 3.0, 7.0]);

    let err = engine
        .run_sweep(&mut algorithm, &fitness, &domain, &[], 3.0, 7.0)
        .unwrap_err();
    assert!(matches!(err, Error::EmptySweep { .. }));
}

#[test]
fn test_batch_algorithm_sweeps_batch_function() {
    let fx = Fixture::new();
    let results = fx
        .engine()
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("BatchRecorder", vec![1.0, 0.5])],
            &FitnessFunctionSpec::new("BatchSphere", "[[1,3]]"),
            2.0,
            2.0,
        )
        .unwrap();
    assert_eq!(results[0].best_value, 4.0);
    assert_eq!(results[0].best_point, vec![2.0]);
}
