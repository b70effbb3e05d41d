use std::sync::Arc;

use optimizer_engine::report::HtmlReportSink;
use optimizer_engine::{AlgorithmSweepSpec, FitnessFunctionSpec};

use crate::common::{BrokenSink, Fixture, RecordingSink};

/// Splits `"{fitness}-{algorithm}-{stamp}-report"` style names.
fn assert_stamped(destination: &str, prefix: &str) {
    let rest = destination
        .strip_prefix(prefix)
        .unwrap_or_else(|| panic!("{destination} does not start with {prefix}"));
    let stamp = rest
        .strip_suffix("-report")
        .unwrap_or_else(|| panic!("{destination} does not end with -report"));
    // %Y%m%d_%H%M%S
    assert_eq!(stamp.len(), 15, "{stamp}");
    assert_eq!(&stamp[8..9], "_");
    assert!(
        stamp
            .chars()
            .enumerate()
            .all(|(i, c)| i == 8 || c.is_ascii_digit())
    );
}

#[test]
fn test_every_run_is_reported() {
    let fx = Fixture::new();
    let sink = Arc::new(RecordingSink::default());
    let engine = fx.builder().shared_report_sink(sink.clone()).build();

    engine
        .run_single_algorithm_against_functions(
            "Recorder",
            &[
                FitnessFunctionSpec::new("Sphere", "[[-1,1]]"),
                FitnessFunctionSpec::new("Rastrigin", "[[-1,1]]"),
            ],
            &[1.0, 0.5],
        )
        .unwrap();

    let destinations = sink.destinations.lock().clone();
    assert_eq!(destinations.len(), 2);
    assert_stamped(&destinations[0], "Sphere-Recorder-");
    assert_stamped(&destinations[1], "Rastrigin-Recorder-");
}

#[test]
fn test_every_sweep_is_reported() {
    let fx = Fixture::new();
    let sink = Arc::new(RecordingSink::default());
    let engine = fx.builder().shared_report_sink(sink.clone()).build();

    engine
        .run_multi_algorithm_sweep(
            &[
                AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5]),
                AlgorithmSweepSpec::new("BatchRecorder", vec![2.0, 1.0]),
            ],
            &FitnessFunctionSpec::new("BatchSphere", "[[-1,1]]"),
            10.0,
            20.0,
        )
        .unwrap_err();
    // Recorder cannot use a batch-only function, so nothing ran or was reported.
    assert!(sink.destinations.lock().is_empty());

    engine
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("BatchRecorder", vec![2.0, 1.0])],
            &FitnessFunctionSpec::new("BatchSphere", "[[-1,1]]"),
            10.0,
            20.0,
        )
        .unwrap();
    let destinations = sink.destinations.lock().clone();
    assert_eq!(destinations.len(), 1);
    assert_stamped(&destinations[0], "BatchSphere-BatchRecorder-best-params-");
}

#[test]
fn test_failed_request_emits_no_report() {
    let fx = Fixture::new();
    let sink = Arc::new(RecordingSink::default());
    let engine = fx.builder().shared_report_sink(sink.clone()).build();

    engine
        .run_single_algorithm_against_functions(
            "Flaky",
            &[FitnessFunctionSpec::new("Sphere", "[[0,1]]")],
            &[1.0],
        )
        .unwrap_err();
    assert!(sink.destinations.lock().is_empty());
}

#[test]
fn test_sink_failure_does_not_fail_request() {
    let fx = Fixture::new();
    let engine = fx.builder().report_sink(BrokenSink).build();

    let results = engine
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5])],
            &FitnessFunctionSpec::new("Sphere", "[[-1,1]]"),
            10.0,
            20.0,
        )
        .unwrap();
    assert_eq!(results[0].best_value, 0.0);

    let runs = engine
        .run_single_algorithm_against_functions(
            "Recorder",
            &[FitnessFunctionSpec::new("Sphere", "[[-1,1]]")],
            &[1.0, 0.5],
        )
        .unwrap();
    assert_eq!(runs.len(), 1);
}

#[test]
fn test_html_sink_writes_files() {
    let dir = std::env::temp_dir().join(format!("optimizer-engine-reports-{}", fastrand::u64(..)));
    let fx = Fixture::new();
    let engine = fx.builder().report_sink(HtmlReportSink::new(&dir)).build();

    engine
        .run_multi_algorithm_sweep(
            &[AlgorithmSweepSpec::new("Recorder", vec![1.0, 0.5])],
            &FitnessFunctionSpec::new("Sphere", "[[-1,1],[-1,1]]"),
            10.0,
            20.0,
        )
        .unwrap();

    let files: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("Sphere-Recorder-best-params-"), "{name}");
    assert!(name.ends_with("-report.html"), "{name}");

    let html = std::fs::read_to_string(&files[0]).unwrap();
    assert!(html.contains("plotly"));
    assert!(html.contains("Recorder"));

    std::fs::remove_dir_all(&dir).unwrap();
}
