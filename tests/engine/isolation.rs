use optimizer_engine::plugin::Capability;
use optimizer_engine::{AlgorithmSweepSpec, Error, FitnessFunctionSpec};

use crate::common::Fixture;

#[test]
fn test_unknown_algorithm_skips_function_resolution_and_decoding() {
    let fx = Fixture::new();
    // The domain is garbage: decoding it would fail with `DomainMalformed`.
    let err = fx
        .engine()
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("GTOA", vec![1.0])],
            &FitnessFunctionSpec::new("Counted", "not json"),
            10.0,
            20.0,
        )
        .unwrap_err();

    assert!(
        matches!(
            err,
            Error::PluginNotFound {
                kind: Capability::Algorithm,
                ref name
            } if name == "GTOA"
        ),
        "{err:?}"
    );
    assert_eq!(fx.function_loads(), 0);
}

#[test]
fn test_unknown_algorithm_anywhere_in_request_runs_nothing() {
    let fx = Fixture::new();
    let err = fx
        .engine()
        .run_multi_algorithm_sweep(
            &[
                AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5]),
                AlgorithmSweepSpec::new("Missing", vec![1.0]),
            ],
            &FitnessFunctionSpec::new("Counted", "[[-1,1]]"),
            10.0,
            20.0,
        )
        .unwrap_err();

    assert_eq!(err.code(), "plugin_not_found");
    assert_eq!(fx.function_loads(), 0);
    assert!(fx.calls().is_empty());
}

#[test]
fn test_single_algorithm_path_resolves_algorithm_first() {
    let fx = Fixture::new();
    let err = fx
        .engine()
        .run_single_algorithm_against_functions(
            "Missing",
            &[FitnessFunctionSpec::new("Counted", "[[")],
            &[],
        )
        .unwrap_err();
    assert_eq!(err.code(), "plugin_not_found");
    assert_eq!(fx.function_loads(), 0);
}

#[test]
fn test_unknown_fitness_function() {
    let fx = Fixture::new();
    let err = fx
        .engine()
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5])],
            &FitnessFunctionSpec::new("Nope", "[[-1,1]]"),
            10.0,
            20.0,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::PluginNotFound {
            kind: Capability::FitnessFunction,
            ..
        }
    ));
    assert_eq!(err.to_string(), "fitness function 'Nope' was not found");
}

#[test]
fn test_malformed_domain_runs_nothing() {
    let fx = Fixture::new();
    for domain in ["", "[]", "[[1,2],[3]]", "{\"a\":1}", "[[1,\"x\"]]"] {
        let err = fx
            .engine()
            .run_multi_algorithm_sweep(
                &[AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5])],
                &FitnessFunctionSpec::new("Sphere", domain),
                10.0,
                20.0,
            )
            .unwrap_err();
        assert!(matches!(err, Error::DomainMalformed(_)), "{domain}: {err:?}");
    }
    assert!(fx.calls().is_empty());
}

#[test]
fn test_later_bad_domain_aborts_before_first_run() {
    let fx = Fixture::new();
    let err = fx
        .engine()
        .run_single_algorithm_against_functions(
            "Recorder",
            &[
                FitnessFunctionSpec::new("Sphere", "[[-1,1]]"),
                FitnessFunctionSpec::new("Sphere", "[[-1,1],"),
            ],
            &[1.0, 0.5],
        )
        .unwrap_err();
    assert!(matches!(err, Error::DomainMalformed(_)));
    assert!(fx.calls().is_empty());
}

#[test]
fn test_shape_mismatch_fails_before_solve() {
    let fx = Fixture::new();
    let engine = fx.engine();

    let err = engine
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5])],
            &FitnessFunctionSpec::new("BatchSphere", "[[-1,1]]"),
            10.0,
            20.0,
        )
        .unwrap_err();
    assert!(matches!(err, Error::IncompatibleEvaluator { .. }), "{err:?}");

    let err = engine
        .run_single_algorithm_against_functions(
            "BatchRecorder",
            &[FitnessFunctionSpec::new("Sphere", "[[-1,1]]")],
            &[],
        )
        .unwrap_err();
    assert_eq!(err.code(), "incompatible_evaluator");

    assert!(fx.calls().is_empty());
}

#[test]
fn test_fixed_dimension_mismatch() {
    let fx = Fixture::new();
    let err = fx
        .engine()
        .run_single_algorithm_against_functions(
            "DifferentialEvolution",
            &[FitnessFunctionSpec::new("Branin", "[[-5,10],[0,15],[0,1]]")],
            &[],
        )
        .unwrap_err();
    assert!(matches!(err, Error::IncompatibleEvaluator { .. }));

    let ok = fx
        .engine()
        .run_single_algorithm_against_functions(
            "DifferentialEvolution",
            &[FitnessFunctionSpec::new("Branin", "[[-5,10],[0,15]]")],
            &[0.8, 0.9, 10.0, 10.0],
        )
        .unwrap();
    assert_eq!(ok[0].best_point.len(), 2);
}
