#![deny(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Plugin-dispatched optimization engine with exhaustive hyper-parameter
//! sweeps. Optimization algorithms and fitness functions are third-party
//! plugins resolved by name; the engine binds them together, runs single
//! evaluations or whole grids of algorithm configurations, and picks the
//! best configuration per algorithm.
//!
//! # Getting Started
//!
//! ```
//! use optimizer_engine::prelude::*;
//!
//! let engine = Engine::new(builtin::store());
//!
//! // Sweep F in [0, 2] step 1 and CR in [0, 1] step 0.5: 3 x 3 configurations.
//! let results = engine
//!     .run_multi_algorithm_sweep(
//!         &[AlgorithmSweepSpec::new("DifferentialEvolution", vec![1.0, 0.5])],
//!         &FitnessFunctionSpec::new("Sphere", "[[-5,5],[-5,5]]"),
//!         10.0, // population
//!         20.0, // iterations
//!     )
//!     .unwrap();
//!
//! let best = &results[0];
//! println!("best configuration {:?} -> {}", best.best_configuration, best.best_value);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Engine`] | Entry points: single runs, multi-algorithm sweeps, descriptor lookup. |
//! | [`Algorithm`](plugin::Algorithm) | A plugin that minimizes an [`Evaluator`] over a [`Domain`](domain::Domain). |
//! | [`FitnessFunction`](plugin::FitnessFunction) | A plugin mapping a point to the value being minimized. |
//! | [`PluginStore`](plugin::PluginStore) | Where units come from: [`MemoryPluginStore`](plugin::MemoryPluginStore) or, with `dylib`, `DylibPluginStore`. |
//! | [`SweepRange`](parameter::SweepRange) | One swept hyper-parameter: bounds plus step. |
//! | [`ReportSink`](report::ReportSink) | Receives every result for rendering. |
//!
//! # Error codes
//!
//! Every [`Error`] carries a stable [`code`](Error::code) next to its
//! message: `plugin_not_found`, `plugin_invalid`, `incompatible_evaluator`,
//! `domain_malformed`, `invalid_sweep_spec`, `empty_sweep`,
//! `evaluation_failure`, `no_completed_configurations`, `cancelled`.
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `async` | [`Engine::run_multi_algorithm_sweep_parallel`] via tokio | off |
//! | `dylib` | `DylibPluginStore`: units loaded from dynamic libraries | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at request, sweep, and plugin-loading points | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod builtin;
mod cancel;
pub mod domain;
mod engine;
mod error;
mod evaluator;
pub mod parameter;
pub mod plugin;
mod registry;
pub mod report;
pub mod select;
pub mod sweep;
mod types;

pub use cancel::CancellationToken;
pub use engine::{DEFAULT_MAX_CONFIGURATIONS, Engine, EngineBuilder};
pub use error::{Error, EvaluationError, Result};
pub use evaluator::Evaluator;
pub use registry::{AlgorithmHandle, FitnessFunctionHandle, PluginRegistry};
pub use types::{
    AlgorithmResult, AlgorithmSweepSpec, FailurePolicy, FitnessFunctionSpec, RunResult, SweepTrial,
};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use optimizer_engine::prelude::*;
/// ```
pub mod prelude {
    pub use crate::builtin;
    pub use crate::cancel::CancellationToken;
    pub use crate::domain::Domain;
    pub use crate::engine::{Engine, EngineBuilder};
    pub use crate::error::{Error, EvaluationError, Result};
    pub use crate::evaluator::Evaluator;
    pub use crate::parameter::{Configuration, ParameterDescriptor, SweepRange};
    #[cfg(feature = "dylib")]
    pub use crate::plugin::DylibPluginStore;
    pub use crate::plugin::{
        Algorithm, Capability, EvaluatorShape, FitnessFunction, MemoryPluginStore, PluginStore,
        Signature, Solution,
    };
    pub use crate::report::{HtmlReportSink, NopReportSink, Report, ReportError, ReportSink};
    pub use crate::types::{
        AlgorithmResult, AlgorithmSweepSpec, FailurePolicy, FitnessFunctionSpec, RunResult,
        SweepTrial,
    };
}
