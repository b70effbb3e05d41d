//! Report sinks.
//!
//! Every run and sweep result is handed to a [`ReportSink`] after it has been
//! computed. Rendering is fire-and-forget: the engine logs a failing sink and
//! still returns its numeric result.
//!
//! | Sink | Output |
//! |------|--------|
//! | [`NopReportSink`] | Nothing (the default) |
//! | [`HtmlReportSink`] | One self-contained Plotly.js HTML file per report |

mod html;

use chrono::{DateTime, Utc};
pub use html::HtmlReportSink;

use crate::parameter::ParameterDescriptor;
use crate::types::{AlgorithmResult, RunResult, SweepTrial};

/// A computed result ready to be rendered.
#[derive(Clone, Copy, Debug)]
pub enum Report<'a> {
    /// One algorithm run against one fitness function.
    Run {
        /// Unit name of the algorithm.
        algorithm: &'a str,
        /// Unit name of the fitness function.
        fitness_function: &'a str,
        /// The parameter vector passed to `solve`.
        parameters: &'a [f64],
        /// The run's outcome.
        result: &'a RunResult,
    },
    /// The best configuration of one algorithm's sweep.
    Sweep {
        /// Unit name of the fitness function.
        fitness_function: &'a str,
        /// The selected best configuration.
        result: &'a AlgorithmResult,
        /// Every configuration that completed, in sweep order.
        trials: &'a [SweepTrial],
        /// Descriptors of the swept hyper-parameters.
        descriptors: &'a [ParameterDescriptor],
    },
}

/// Errors a [`ReportSink`] may return.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Writing the rendered report failed.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// The sink refused the report.
    #[error("report rejected: {0}")]
    Rejected(String),
}

/// Renders results to some destination.
pub trait ReportSink: Send + Sync {
    /// Renders `report` under `destination`, a file-name-safe base name
    /// without extension.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if rendering fails. The engine logs it and
    /// carries on.
    fn render(&self, report: &Report<'_>, destination: &str) -> Result<(), ReportError>;
}

/// A sink that discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NopReportSink;

impl ReportSink for NopReportSink {
    fn render(&self, _report: &Report<'_>, _destination: &str) -> Result<(), ReportError> {
        Ok(())
    }
}

fn stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Destination name for a single run: `{fitness}-{algorithm}-{timestamp}-report`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use optimizer_engine::report::run_destination;
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
/// assert_eq!(
///     run_destination("Sphere", "DE", at),
///     "Sphere-DE-20240309_140507-report"
/// );
/// ```
#[must_use]
pub fn run_destination(fitness_function: &str, algorithm: &str, at: DateTime<Utc>) -> String {
    format!("{fitness_function}-{algorithm}-{}-report", stamp(at))
}

/// Destination name for a sweep's best configuration:
/// `{fitness}-{algorithm}-best-params-{timestamp}-report`.
#[must_use]
pub fn sweep_destination(fitness_function: &str, algorithm: &str, at: DateTime<Utc>) -> String {
    format!(
        "{fitness_function}-{algorithm}-best-params-{}-report",
        stamp(at)
    )
}
