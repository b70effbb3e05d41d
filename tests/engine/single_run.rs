use optimizer_engine::{Error, EvaluationError, FitnessFunctionSpec};

use crate::common::Fixture;

#[test]
fn test_one_result_per_function_in_input_order() {
    let fx = Fixture::new();
    let results = fx
        .engine()
        .run_single_algorithm_against_functions(
            "DifferentialEvolution",
            &[
                FitnessFunctionSpec::new("Sphere", "[[-5,5],[-5,5]]"),
                FitnessFunctionSpec::new("Rastrigin", "[[-5.12,5.12],[-5.12,5.12],[-5.12,5.12]]"),
                FitnessFunctionSpec::new("Ackley", "[[-32,32]]"),
            ],
            &[0.8, 0.9, 15.0, 30.0],
        )
        .expect("runs should succeed");

    let dims: Vec<_> = results.iter().map(|r| r.best_point.len()).collect();
    assert_eq!(dims, vec![2, 3, 1]);
    for result in &results {
        // 15 initial points plus 15 trial vectors per iteration.
        assert_eq!(result.evaluation_count, 15 + 15 * 30);
        assert!(result.best_value.is_finite());
    }
}

#[test]
fn test_parameters_pass_through_unchanged() {
    let fx = Fixture::new();
    let results = fx
        .engine()
        .run_single_algorithm_against_functions(
            "Recorder",
            &[
                FitnessFunctionSpec::new("Sphere", "[[1,3]]"),
                FitnessFunctionSpec::new("Rosenbrock", "[[0,2],[0,2]]"),
            ],
            &[0.3, 0.7],
        )
        .unwrap();

    assert_eq!(fx.calls(), vec![vec![0.3, 0.7], vec![0.3, 0.7]]);
    assert_eq!(results[0].evaluation_count, 1);
    assert_eq!(results[0].best_point, vec![2.0]);
}

#[test]
fn test_no_functions_yields_no_results() {
    let fx = Fixture::new();
    let results = fx
        .engine()
        .run_single_algorithm_against_functions("Recorder", &[], &[])
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_run_once_building_block() {
    let fx = Fixture::new();
    let engine = fx.engine();
    let mut algorithm = engine.registry().resolve_algorithm("Recorder").unwrap();
    let fitness = engine.registry().resolve_fitness_function("Sphere").unwrap();
    let domain = optimizer_engine::domain::decode("[[-2,2],[0,4]]").unwrap();

    let result = engine
        .run_once(&mut algorithm, &fitness, &domain, &[1.0, 0.5])
        .unwrap();
    assert_eq!(result.best_point, vec![0.0, 2.0]);
    assert_eq!(result.best_value, 4.0);
    assert_eq!(result.evaluation_count, 1);
}

#[test]
fn test_solve_error_is_evaluation_failure() {
    let fx = Fixture::new();
    let err = fx
        .engine()
        .run_single_algorithm_against_functions(
            "Flaky",
            &[FitnessFunctionSpec::new("Sphere", "[[0,1]]")],
            &[1.0],
        )
        .unwrap_err();

    match err {
        Error::EvaluationFailure { algorithm, source } => {
            assert_eq!(algorithm, "Flaky");
            assert_eq!(source, EvaluationError::Other("cannot handle k = 1".into()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_panic_in_solve_is_caught() {
    let fx = Fixture::new();
    let err = fx
        .engine()
        .run_single_algorithm_against_functions(
            "Panicky",
            &[FitnessFunctionSpec::new("Sphere", "[[0,1]]")],
            &[1.0],
        )
        .unwrap_err();

    match err {
        Error::EvaluationFailure {
            source: EvaluationError::Panicked(message),
            ..
        } => assert!(message.contains("exploded on k = 1"), "{message}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_invalid_algorithm_parameters_surface_as_failure() {
    let fx = Fixture::new();
    let err = fx
        .engine()
        .run_single_algorithm_against_functions(
            "DifferentialEvolution",
            &[FitnessFunctionSpec::new("Sphere", "[[0,1]]")],
            &[5.0],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::EvaluationFailure {
            source: EvaluationError::InvalidParameters(_),
            ..
        }
    ));
}

#[test]
fn test_descriptor_lookup() {
    let fx = Fixture::new();
    let engine = fx.engine();

    let descriptors = engine.parameter_descriptors("DifferentialEvolution").unwrap();
    let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["F", "CR"]);
    assert_eq!(descriptors[0].upper_boundary, 2.0);

    assert_eq!(
        engine.parameter_descriptors("Nope").unwrap_err().code(),
        "plugin_not_found"
    );
}

#[test]
fn test_name_listing() {
    let fx = Fixture::new();
    let engine = fx.engine();
    assert_eq!(
        engine.algorithm_names(),
        vec!["BatchRecorder", "DifferentialEvolution", "Flaky", "Panicky", "Recorder"]
    );
    assert_eq!(
        engine.fitness_function_names(),
        vec![
            "Ackley",
            "BatchSphere",
            "Branin",
            "Counted",
            "Rastrigin",
            "Rosenbrock",
            "Sphere"
        ]
    );
}
