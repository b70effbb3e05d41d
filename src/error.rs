use crate::plugin::Capability;

/// Errors returned by the engine.
///
/// Every variant maps to a stable, machine-readable [`code`](Error::code) in
/// addition to its human-readable `Display` message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no loadable unit matches the requested name.
    #[error("{kind} '{name}' was not found")]
    PluginNotFound {
        /// What the caller asked for.
        kind: Capability,
        /// The requested unit name.
        name: String,
    },

    /// Returned when a unit loads but does not provide exactly one usable
    /// entry for the requested capability.
    #[error("{kind} '{name}' is not a valid plugin: {reason}")]
    PluginInvalid {
        /// What the caller asked for.
        kind: Capability,
        /// The requested unit name.
        name: String,
        /// Why the unit was rejected.
        reason: String,
    },

    /// Returned when a fitness function cannot be bound to the evaluator an
    /// algorithm expects.
    #[error("fitness function '{fitness_function}' is incompatible with algorithm '{algorithm}': {reason}")]
    IncompatibleEvaluator {
        /// The algorithm's name.
        algorithm: String,
        /// The fitness function's name.
        fitness_function: String,
        /// What did not match.
        reason: String,
    },

    /// Returned when a serialized domain is not a non-empty array of
    /// equal-length numeric arrays.
    #[error("malformed domain: {0}")]
    DomainMalformed(String),

    /// Returned when a sweep specification cannot be expanded.
    #[error("invalid sweep specification for '{algorithm}': {reason}")]
    InvalidSweepSpec {
        /// The algorithm the sweep belongs to.
        algorithm: String,
        /// What is wrong with the sweep.
        reason: String,
    },

    /// Returned when a sweep specification expands to zero configurations.
    #[error("sweep for '{algorithm}' produced no configurations")]
    EmptySweep {
        /// The algorithm the sweep belongs to.
        algorithm: String,
    },

    /// Returned when third-party solve or evaluate code fails or panics.
    #[error("evaluation failed in '{algorithm}': {source}")]
    EvaluationFailure {
        /// The algorithm that was running.
        algorithm: String,
        /// The underlying failure.
        #[source]
        source: EvaluationError,
    },

    /// Returned when every configuration of a best-effort sweep failed or
    /// produced an incomparable (`NaN`) objective value.
    #[error("no configuration of '{algorithm}' completed with a comparable objective value")]
    NoCompletedConfigurations {
        /// The algorithm the sweep belongs to.
        algorithm: String,
    },

    /// Returned when the engine's cancellation token is set.
    #[error("calculations were stopped")]
    Cancelled,

    /// Returned when an async task fails.
    #[cfg(feature = "async")]
    #[error("async task error: {0}")]
    TaskError(String),
}

impl Error {
    /// Return a stable identifier for this error's kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use optimizer_engine::Error;
    ///
    /// let err = Error::DomainMalformed("empty".into());
    /// assert_eq!(err.code(), "domain_malformed");
    /// ```
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PluginNotFound { .. } => "plugin_not_found",
            Self::PluginInvalid { .. } => "plugin_invalid",
            Self::IncompatibleEvaluator { .. } => "incompatible_evaluator",
            Self::DomainMalformed(_) => "domain_malformed",
            Self::InvalidSweepSpec { .. } => "invalid_sweep_spec",
            Self::EmptySweep { .. } => "empty_sweep",
            Self::EvaluationFailure { .. } => "evaluation_failure",
            Self::NoCompletedConfigurations { .. } => "no_completed_configurations",
            Self::Cancelled => "cancelled",
            #[cfg(feature = "async")]
            Self::TaskError(_) => "task_error",
        }
    }
}

/// A convenient alias for `Result<T, optimizer_engine::Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// A failure raised inside plugin code while solving or evaluating.
///
/// Plugins return this from [`Algorithm::solve`](crate::plugin::Algorithm::solve)
/// and [`FitnessFunction::evaluate`](crate::plugin::FitnessFunction::evaluate);
/// the engine wraps it into [`Error::EvaluationFailure`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    /// The point handed to a fitness function has the wrong length.
    #[error("expected a point with {expected} coordinates, got {got}")]
    DimensionMismatch {
        /// The expected number of coordinates.
        expected: usize,
        /// The actual number of coordinates.
        got: usize,
    },

    /// The parameter vector handed to `solve` is unusable.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Plugin code panicked.
    #[error("plugin panicked: {0}")]
    Panicked(String),

    /// Any other plugin-defined failure.
    #[error("{0}")]
    Other(String),
}

impl From<String> for EvaluationError {
    fn from(message: String) -> Self {
        Self::Other(message)
    }
}

impl From<&str> for EvaluationError {
    fn from(message: &str) -> Self {
        Self::Other(message.to_owned())
    }
}
