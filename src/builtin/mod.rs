//! Reference plugins.
//!
//! [`DifferentialEvolution`] and a handful of standard test functions,
//! implemented against the public plugin contract exactly as a third-party
//! unit would be. [`store`] registers all of them under their type names.

mod de;
mod functions;

pub use de::DifferentialEvolution;
pub use functions::{Ackley, Branin, Rastrigin, Rosenbrock, Sphere};

use crate::plugin::MemoryPluginStore;

/// Returns a [`MemoryPluginStore`] with every reference plugin registered.
///
/// # Examples
///
/// ```
/// use optimizer_engine::builtin;
/// use optimizer_engine::plugin::PluginStore;
///
/// let store = builtin::store();
/// assert_eq!(store.algorithm_names(), vec!["DifferentialEvolution"]);
/// assert!(store.fitness_function_names().contains(&"Sphere".to_string()));
/// ```
#[must_use]
pub fn store() -> MemoryPluginStore {
    let store = MemoryPluginStore::new();
    store.register_algorithm("DifferentialEvolution", DifferentialEvolution::new);
    store.register_fitness_function("Sphere", || Sphere);
    store.register_fitness_function("Rosenbrock", || Rosenbrock);
    store.register_fitness_function("Rastrigin", || Rastrigin);
    store.register_fitness_function("Ackley", || Ackley);
    store.register_fitness_function("Branin", || Branin);
    store
}
