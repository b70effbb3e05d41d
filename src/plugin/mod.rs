//! The plugin contract between the engine and third-party code.
//!
//! An **algorithm** implements [`Algorithm`]; a **fitness function**
//! implements [`FitnessFunction`]. Both are packaged into loadable units:
//! a [`LoadedUnit`] carries a manifest of entries, each naming the
//! [`Capability`] it provides and a factory that instantiates it. Units are
//! served by a [`PluginStore`].
//!
//! # Parameter convention for algorithm authors
//!
//! The engine calls [`Algorithm::solve`] with a flat parameter vector:
//!
//! | Position | Meaning |
//! |----------|---------|
//! | `0..n` | hyper-parameters, in the order of [`Algorithm::parameter_descriptors`] |
//! | `n` | population size (sweep runs) |
//! | `n + 1` | iteration count (sweep runs) |
//!
//! Single runs pass the caller's parameter vector through unchanged.
//!
//! # Available stores
//!
//! | Store | Description | Feature flag |
//! |-------|-------------|-------------|
//! | [`MemoryPluginStore`] | Units registered in-process (the default) | always |
//! | `DylibPluginStore` | Units loaded from dynamic libraries in two directories | `dylib` |

#[cfg(feature = "dylib")]
pub mod dylib;
mod memory;

use core::fmt;
use std::sync::Arc;

#[cfg(feature = "dylib")]
pub use dylib::{DylibPluginStore, PluginDeclaration, UnitBuilder};
pub use memory::MemoryPluginStore;
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{EvaluationError, Result};
use crate::evaluator::Evaluator;
use crate::parameter::ParameterDescriptor;

/// The kind of capability a unit entry provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// An optimization algorithm.
    Algorithm,
    /// A fitness (objective) function.
    FitnessFunction,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Algorithm => f.write_str("algorithm"),
            Self::FitnessFunction => f.write_str("fitness function"),
        }
    }
}

/// How an algorithm calls its evaluator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluatorShape {
    /// One point per call: `f(x) -> f64`.
    #[default]
    Point,
    /// A whole population per call: `f(xs) -> Vec<f64>`.
    Batch,
}

/// The evaluation signature a fitness function offers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// The calling convention the function implements.
    pub shape: EvaluatorShape,
    /// The fixed input dimension, or `None` if any dimension is accepted.
    pub dimension: Option<usize>,
}

impl Signature {
    /// Point-shaped signature accepting any dimension.
    #[must_use]
    pub fn point() -> Self {
        Self::default()
    }

    /// Batch-shaped signature accepting any dimension.
    #[must_use]
    pub fn batch() -> Self {
        Self {
            shape: EvaluatorShape::Batch,
            dimension: None,
        }
    }

    /// Restrict the signature to a fixed dimension.
    #[must_use]
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }
}

/// The best point an algorithm found in one `solve` call.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// The best point found.
    pub best_point: Vec<f64>,
    /// The fitness at `best_point`.
    pub best_value: f64,
}

/// An optimization algorithm.
///
/// A fresh instance is created for every request, so `solve` may keep
/// scratch state on `self`. Instances are never shared between threads
/// concurrently.
pub trait Algorithm: Send {
    /// Display name of the algorithm.
    fn name(&self) -> &str;

    /// The tunable hyper-parameters, in positional order.
    fn parameter_descriptors(&self) -> Vec<ParameterDescriptor>;

    /// The evaluator shape this algorithm calls. Defaults to
    /// [`EvaluatorShape::Point`].
    fn evaluator_shape(&self) -> EvaluatorShape {
        EvaluatorShape::Point
    }

    /// Minimize the evaluator over `domain`.
    ///
    /// `parameters` follows the positional convention described in the
    /// [module docs](self).
    ///
    /// # Errors
    ///
    /// Returns any [`EvaluationError`] raised by the evaluator or by the
    /// algorithm itself.
    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        domain: &Domain,
        parameters: &[f64],
    ) -> core::result::Result<Solution, EvaluationError>;
}

/// A fitness function to be minimized.
pub trait FitnessFunction: Send + Sync {
    /// The signature this function offers. Defaults to a point-shaped
    /// signature of any dimension.
    fn signature(&self) -> Signature {
        Signature::point()
    }

    /// Evaluate a single point.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] if the point cannot be evaluated.
    fn evaluate(&self, x: &[f64]) -> core::result::Result<f64, EvaluationError>;

    /// Evaluate a batch of points.
    ///
    /// The default evaluates each point with [`evaluate`](Self::evaluate).
    ///
    /// # Errors
    ///
    /// Returns the first [`EvaluationError`] encountered.
    fn evaluate_batch(&self, xs: &[Vec<f64>]) -> core::result::Result<Vec<f64>, EvaluationError> {
        xs.iter().map(|x| self.evaluate(x)).collect()
    }
}

/// Factory producing a fresh algorithm instance.
pub type AlgorithmFactory = Box<dyn Fn() -> Box<dyn Algorithm> + Send + Sync>;

/// Factory producing a fresh fitness-function instance.
pub type FitnessFunctionFactory = Box<dyn Fn() -> Box<dyn FitnessFunction> + Send + Sync>;

/// One capability declared in a unit's manifest.
pub enum UnitEntry {
    /// An algorithm factory.
    Algorithm(AlgorithmFactory),
    /// A fitness-function factory.
    FitnessFunction(FitnessFunctionFactory),
}

impl UnitEntry {
    /// Wraps an algorithm constructor.
    #[must_use]
    pub fn algorithm<A, F>(factory: F) -> Self
    where
        A: Algorithm + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self::Algorithm(Box::new(move || -> Box<dyn Algorithm> { Box::new(factory()) }))
    }

    /// Wraps a fitness-function constructor.
    #[must_use]
    pub fn fitness_function<T, F>(factory: F) -> Self
    where
        T: FitnessFunction + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::FitnessFunction(Box::new(move || -> Box<dyn FitnessFunction> {
            Box::new(factory())
        }))
    }

    /// The capability this entry provides.
    #[must_use]
    pub fn capability(&self) -> Capability {
        match self {
            Self::Algorithm(_) => Capability::Algorithm,
            Self::FitnessFunction(_) => Capability::FitnessFunction,
        }
    }
}

impl fmt::Debug for UnitEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnitEntry").field(&self.capability()).finish()
    }
}

/// A loadable unit: a name plus the manifest of capabilities it provides.
#[derive(Debug)]
pub struct UnitManifest {
    /// The unit's name.
    pub name: String,
    /// Declared capabilities, in declaration order.
    pub entries: Vec<UnitEntry>,
}

impl UnitManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Adds an entry.
    #[must_use]
    pub fn with_entry(mut self, entry: UnitEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

/// A unit handed out by a [`PluginStore`].
///
/// Holds the manifest and, for units backed by a dynamic library, the
/// library itself so that it outlives every instance created from it.
#[derive(Clone, Debug)]
pub struct LoadedUnit {
    manifest: Arc<UnitManifest>,
    #[cfg(feature = "dylib")]
    library: Option<Arc<libloading::Library>>,
}

impl LoadedUnit {
    /// Wraps a shared manifest.
    #[must_use]
    pub fn new(manifest: Arc<UnitManifest>) -> Self {
        Self {
            manifest,
            #[cfg(feature = "dylib")]
            library: None,
        }
    }

    #[cfg(feature = "dylib")]
    pub(crate) fn with_library(
        manifest: Arc<UnitManifest>,
        library: Arc<libloading::Library>,
    ) -> Self {
        Self {
            manifest,
            library: Some(library),
        }
    }

    /// The unit's manifest.
    #[must_use]
    pub fn manifest(&self) -> &UnitManifest {
        &self.manifest
    }

    /// A guard keeping the unit's code mapped while instances are alive.
    pub(crate) fn keep_alive(&self) -> UnitGuard {
        UnitGuard {
            _manifest: Arc::clone(&self.manifest),
            #[cfg(feature = "dylib")]
            _library: self.library.clone(),
        }
    }
}

/// Keeps a unit (and its library, if any) alive. Must be dropped after every
/// instance created from the unit.
#[derive(Debug)]
pub(crate) struct UnitGuard {
    _manifest: Arc<UnitManifest>,
    #[cfg(feature = "dylib")]
    _library: Option<Arc<libloading::Library>>,
}

/// Source of loadable units.
///
/// The set of units is external mutable state: units may appear or vanish
/// between [`algorithm_names`](Self::algorithm_names) and
/// [`load_unit`](Self::load_unit). Implementations must then fail with
/// [`Error::PluginNotFound`](crate::Error::PluginNotFound) rather than panic.
pub trait PluginStore: Send + Sync {
    /// Names of all algorithm units, sorted.
    fn algorithm_names(&self) -> Vec<String>;

    /// Names of all fitness-function units, sorted.
    fn fitness_function_names(&self) -> Vec<String>;

    /// Load the unit called `name` from the `kind` collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PluginNotFound`](crate::Error::PluginNotFound) if no
    /// such unit exists, or
    /// [`Error::PluginInvalid`](crate::Error::PluginInvalid) if it exists but
    /// cannot be loaded.
    fn load_unit(&self, kind: Capability, name: &str) -> Result<LoadedUnit>;
}
