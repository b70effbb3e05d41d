use std::sync::Arc;

use super::{DEFAULT_MAX_CONFIGURATIONS, Engine};
use crate::cancel::CancellationToken;
use crate::plugin::{MemoryPluginStore, PluginStore};
use crate::registry::PluginRegistry;
use crate::report::{NopReportSink, ReportSink};
use crate::types::FailurePolicy;

/// A builder for constructing [`Engine`] instances with a fluent API.
///
/// Created via [`Engine::builder()`].
///
/// # Defaults
///
/// - Store: an empty [`MemoryPluginStore`]
/// - Report sink: [`NopReportSink`]
/// - Failure policy: [`FailurePolicy::Abort`]
/// - Max configurations per sweep: [`DEFAULT_MAX_CONFIGURATIONS`]
/// - Cancellation token: a fresh, running token
///
/// # Examples
///
/// ```
/// use optimizer_engine::prelude::*;
///
/// let engine = Engine::builder()
///     .store(builtin::store())
///     .failure_policy(FailurePolicy::SkipFailed)
///     .max_configurations(10_000)
///     .build();
///
/// assert_eq!(engine.failure_policy(), FailurePolicy::SkipFailed);
/// assert!(engine.algorithm_names().contains(&"DifferentialEvolution".to_string()));
/// ```
#[must_use]
pub struct EngineBuilder {
    store: Option<Arc<dyn PluginStore>>,
    sink: Option<Arc<dyn ReportSink>>,
    failure_policy: FailurePolicy,
    max_configurations: usize,
    token: Option<CancellationToken>,
}

impl EngineBuilder {
    pub(super) fn new() -> Self {
        Self {
            store: None,
            sink: None,
            failure_policy: FailurePolicy::Abort,
            max_configurations: DEFAULT_MAX_CONFIGURATIONS,
            token: None,
        }
    }

    /// Set the plugin store.
    pub fn store(mut self, store: impl PluginStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a plugin store that is shared with other owners, e.g. a
    /// [`MemoryPluginStore`] the caller keeps registering units into.
    pub fn shared_store(mut self, store: Arc<dyn PluginStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the sink every result is rendered to.
    pub fn report_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Set a report sink shared with other owners.
    pub fn shared_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set what a sweep does when a configuration fails.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the largest number of configurations one sweep may expand to.
    pub fn max_configurations(mut self, limit: usize) -> Self {
        self.max_configurations = limit;
        self
    }

    /// Use an existing cancellation token, e.g. one shared by several
    /// engines.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Build the [`Engine`] with the configured options.
    #[must_use]
    pub fn build(self) -> Engine {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryPluginStore::new()));
        let sink = self.sink.unwrap_or_else(|| Arc::new(NopReportSink));

        Engine {
            registry: PluginRegistry::new(store),
            sink,
            failure_policy: self.failure_policy,
            max_configurations: self.max_configurations,
            token: self.token.unwrap_or_default(),
            request_abort: None,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
