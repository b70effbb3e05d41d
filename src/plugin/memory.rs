use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Capability, LoadedUnit, PluginStore, UnitEntry, UnitManifest};
use crate::error::{Error, Result};

/// In-process plugin store (the default).
///
/// Keeps algorithm and fitness-function units in two name-keyed maps behind
/// read-write locks, so units can be registered and removed while other
/// threads resolve them.
///
/// # Examples
///
/// ```
/// use optimizer_engine::builtin::Sphere;
/// use optimizer_engine::plugin::{MemoryPluginStore, PluginStore};
///
/// let store = MemoryPluginStore::new();
/// store.register_fitness_function("Sphere", || Sphere);
/// assert_eq!(store.fitness_function_names(), vec!["Sphere".to_string()]);
/// ```
#[derive(Default)]
pub struct MemoryPluginStore {
    algorithms: RwLock<BTreeMap<String, Arc<UnitManifest>>>,
    fitness_functions: RwLock<BTreeMap<String, Arc<UnitManifest>>>,
}

impl MemoryPluginStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn units(&self, kind: Capability) -> &RwLock<BTreeMap<String, Arc<UnitManifest>>> {
        match kind {
            Capability::Algorithm => &self.algorithms,
            Capability::FitnessFunction => &self.fitness_functions,
        }
    }

    /// Stores `manifest` in the `kind` collection under its own name,
    /// replacing any unit of the same name.
    pub fn insert(&self, kind: Capability, manifest: UnitManifest) {
        self.units(kind)
            .write()
            .insert(manifest.name.clone(), Arc::new(manifest));
    }

    /// Registers a single-entry algorithm unit.
    pub fn register_algorithm<A, F>(&self, name: impl Into<String>, factory: F)
    where
        A: super::Algorithm + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        let manifest = UnitManifest::new(name).with_entry(UnitEntry::algorithm(factory));
        self.insert(Capability::Algorithm, manifest);
    }

    /// Registers a single-entry fitness-function unit.
    pub fn register_fitness_function<T, F>(&self, name: impl Into<String>, factory: F)
    where
        T: super::FitnessFunction + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let manifest = UnitManifest::new(name).with_entry(UnitEntry::fitness_function(factory));
        self.insert(Capability::FitnessFunction, manifest);
    }

    /// Removes a unit. Returns `true` if it existed.
    #[must_use]
    pub fn remove(&self, kind: Capability, name: &str) -> bool {
        self.units(kind).write().remove(name).is_some()
    }
}

impl PluginStore for MemoryPluginStore {
    fn algorithm_names(&self) -> Vec<String> {
        self.algorithms.read().keys().cloned().collect()
    }

    fn fitness_function_names(&self) -> Vec<String> {
        self.fitness_functions.read().keys().cloned().collect()
    }

    fn load_unit(&self, kind: Capability, name: &str) -> Result<LoadedUnit> {
        self.units(kind)
            .read()
            .get(name)
            .map(|manifest| LoadedUnit::new(Arc::clone(manifest)))
            .ok_or_else(|| Error::PluginNotFound {
                kind,
                name: name.to_owned(),
            })
    }
}
