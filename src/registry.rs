//! Resolves unit names to instantiated algorithms and fitness functions.

use core::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::parameter::ParameterDescriptor;
use crate::plugin::{
    Algorithm, Capability, EvaluatorShape, FitnessFunction, LoadedUnit, PluginStore, UnitEntry,
    UnitGuard,
};

/// A freshly instantiated algorithm.
///
/// Owned by a single request. The instance is dropped before the unit it
/// came from.
pub struct AlgorithmHandle {
    instance: Box<dyn Algorithm>,
    unit_name: String,
    _unit: UnitGuard,
}

impl AlgorithmHandle {
    /// The name of the unit this algorithm was loaded from.
    #[must_use]
    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// The algorithm's own display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.instance.name()
    }

    /// The algorithm's tunable hyper-parameters.
    #[must_use]
    pub fn parameter_descriptors(&self) -> Vec<ParameterDescriptor> {
        self.instance.parameter_descriptors()
    }

    /// The evaluator shape the algorithm calls.
    #[must_use]
    pub fn evaluator_shape(&self) -> EvaluatorShape {
        self.instance.evaluator_shape()
    }

    pub(crate) fn algorithm_mut(&mut self) -> &mut dyn Algorithm {
        self.instance.as_mut()
    }
}

/// A freshly instantiated fitness function.
pub struct FitnessFunctionHandle {
    instance: Box<dyn FitnessFunction>,
    unit_name: String,
    _unit: UnitGuard,
}

impl FitnessFunctionHandle {
    /// The name of the unit this function was loaded from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.unit_name
    }

    /// The fitness function itself.
    #[must_use]
    pub fn function(&self) -> &dyn FitnessFunction {
        self.instance.as_ref()
    }
}

/// Resolves names through a [`PluginStore`].
///
/// Every resolution loads the unit and instantiates a new object; nothing is
/// cached between calls.
#[derive(Clone)]
pub struct PluginRegistry {
    store: Arc<dyn PluginStore>,
}

impl PluginRegistry {
    /// Creates a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn PluginStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn PluginStore {
        self.store.as_ref()
    }

    /// Loads and instantiates the algorithm unit called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PluginNotFound`] if the store has no such unit, and
    /// [`Error::PluginInvalid`] if the unit declares no algorithm, declares
    /// more than one, or its factory panics.
    pub fn resolve_algorithm(&self, name: &str) -> Result<AlgorithmHandle> {
        let unit = self.store.load_unit(Capability::Algorithm, name)?;
        let instance = match single_entry(&unit, Capability::Algorithm, name)? {
            UnitEntry::Algorithm(factory) => instantiate(factory, Capability::Algorithm, name)?,
            UnitEntry::FitnessFunction(_) => {
                return Err(invalid(Capability::Algorithm, name, "entry kind mismatch"));
            }
        };
        trace_debug!(unit = name, algorithm = instance.name(), "algorithm resolved");

        Ok(AlgorithmHandle {
            instance,
            unit_name: name.to_owned(),
            _unit: unit.keep_alive(),
        })
    }

    /// Loads and instantiates the fitness-function unit called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PluginNotFound`] if the store has no such unit, and
    /// [`Error::PluginInvalid`] if the unit declares no fitness function,
    /// declares more than one, or its factory panics.
    pub fn resolve_fitness_function(&self, name: &str) -> Result<FitnessFunctionHandle> {
        let unit = self.store.load_unit(Capability::FitnessFunction, name)?;
        let instance = match single_entry(&unit, Capability::FitnessFunction, name)? {
            UnitEntry::FitnessFunction(factory) => {
                instantiate(factory, Capability::FitnessFunction, name)?
            }
            UnitEntry::Algorithm(_) => {
                return Err(invalid(Capability::FitnessFunction, name, "entry kind mismatch"));
            }
        };
        trace_debug!(unit = name, "fitness function resolved");

        Ok(FitnessFunctionHandle {
            instance,
            unit_name: name.to_owned(),
            _unit: unit.keep_alive(),
        })
    }
}

fn invalid(kind: Capability, name: &str, reason: impl Into<String>) -> Error {
    Error::PluginInvalid {
        kind,
        name: name.to_owned(),
        reason: reason.into(),
    }
}

/// Finds the one entry of `kind` in the unit's manifest.
fn single_entry<'u>(unit: &'u LoadedUnit, kind: Capability, name: &str) -> Result<&'u UnitEntry> {
    let mut matching = unit
        .manifest()
        .entries
        .iter()
        .filter(|e| e.capability() == kind);

    match (matching.next(), matching.next()) {
        (Some(entry), None) => Ok(entry),
        (None, _) => Err(invalid(kind, name, format!("unit declares no {kind}"))),
        (Some(_), Some(_)) => Err(invalid(
            kind,
            name,
            format!("unit declares more than one {kind}"),
        )),
    }
}

fn instantiate<T>(factory: impl FnOnce() -> T, kind: Capability, name: &str) -> Result<T> {
    std::panic::catch_unwind(AssertUnwindSafe(factory)).map_err(|payload| {
        invalid(
            kind,
            name,
            format!("factory panicked: {}", panic_message(&*payload)),
        )
    })
}

/// Extracts the message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn core::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}
