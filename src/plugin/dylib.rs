//! Units loaded from dynamic libraries.
//!
//! Each unit is a `cdylib` built against the same version of this crate and
//! the same compiler. It exports a [`PluginDeclaration`] via
//! [`export_plugin!`](crate::export_plugin), whose `register` function fills a
//! [`UnitBuilder`] with the unit's capabilities:
//!
//! ```ignore
//! use optimizer_engine::plugin::UnitBuilder;
//!
//! fn register(unit: &mut UnitBuilder) {
//!     unit.fitness_function(|| MyFunction);
//! }
//!
//! optimizer_engine::export_plugin!(register);
//! ```
//!
//! Loading a unit executes its code in-process. This is a trust boundary,
//! not a security control: only load libraries you trust.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{
    Algorithm, Capability, FitnessFunction, LoadedUnit, PluginStore, UnitEntry, UnitManifest,
};
use crate::error::{Error, Result};

/// Version string a unit must have been built against.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the exported declaration static.
pub const DECLARATION_SYMBOL: &str = "OPTIMIZER_ENGINE_PLUGIN";

/// The static every unit exports under [`DECLARATION_SYMBOL`].
#[derive(Clone, Copy, Debug)]
pub struct PluginDeclaration {
    /// [`CORE_VERSION`] of the crate the unit was built against.
    pub core_version: &'static str,
    /// Registers the unit's capabilities.
    pub register: fn(&mut UnitBuilder),
}

/// Collects the capabilities a unit registers.
#[derive(Debug, Default)]
pub struct UnitBuilder {
    entries: Vec<UnitEntry>,
}

impl UnitBuilder {
    /// Declares an algorithm.
    pub fn algorithm<A, F>(&mut self, factory: F) -> &mut Self
    where
        A: Algorithm + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        self.entries.push(UnitEntry::algorithm(factory));
        self
    }

    /// Declares a fitness function.
    pub fn fitness_function<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: FitnessFunction + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.entries.push(UnitEntry::fitness_function(factory));
        self
    }
}

/// Exports a [`PluginDeclaration`] from a unit crate.
///
/// Takes the path of a `fn(&mut UnitBuilder)`.
#[macro_export]
macro_rules! export_plugin {
    ($register:path) => {
        #[unsafe(no_mangle)]
        pub static OPTIMIZER_ENGINE_PLUGIN: $crate::plugin::PluginDeclaration =
            $crate::plugin::PluginDeclaration {
                core_version: $crate::plugin::dylib::CORE_VERSION,
                register: $register,
            };
    };
}

/// A plugin store reading units from two directories of dynamic libraries.
///
/// A unit's name is its file name without the platform library prefix and
/// extension, so `libsphere.so`, `sphere.so`, and `sphere.dll` are all
/// named `sphere`.
///
/// # Examples
///
/// ```no_run
/// use optimizer_engine::plugin::{DylibPluginStore, PluginStore};
///
/// let store = DylibPluginStore::new("plugins/algorithms", "plugins/functions");
/// println!("{:?}", store.algorithm_names());
/// ```
#[derive(Clone, Debug)]
pub struct DylibPluginStore {
    algorithms_dir: PathBuf,
    fitness_functions_dir: PathBuf,
}

impl DylibPluginStore {
    /// Creates a store over the given directories.
    #[must_use]
    pub fn new(
        algorithms_dir: impl AsRef<Path>,
        fitness_functions_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            algorithms_dir: algorithms_dir.as_ref().to_path_buf(),
            fitness_functions_dir: fitness_functions_dir.as_ref().to_path_buf(),
        }
    }

    fn dir(&self, kind: Capability) -> &Path {
        match kind {
            Capability::Algorithm => &self.algorithms_dir,
            Capability::FitnessFunction => &self.fitness_functions_dir,
        }
    }

    fn list(&self, kind: Capability) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.dir(kind)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(core::result::Result::ok)
            .filter_map(|entry| unit_name(&entry.path()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn locate(&self, kind: Capability, name: &str) -> Option<PathBuf> {
        let dir = self.dir(kind);
        let ext = std::env::consts::DLL_EXTENSION;
        [
            dir.join(format!("{}{name}.{ext}", std::env::consts::DLL_PREFIX)),
            dir.join(format!("{name}.{ext}")),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }
}

fn unit_name(path: &Path) -> Option<String> {
    if path.extension()? != std::env::consts::DLL_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let stem = stem
        .strip_prefix(std::env::consts::DLL_PREFIX)
        .filter(|s| !s.is_empty())
        .unwrap_or(stem);
    Some(stem.to_owned())
}

impl PluginStore for DylibPluginStore {
    fn algorithm_names(&self) -> Vec<String> {
        self.list(Capability::Algorithm)
    }

    fn fitness_function_names(&self) -> Vec<String> {
        self.list(Capability::FitnessFunction)
    }

    fn load_unit(&self, kind: Capability, name: &str) -> Result<LoadedUnit> {
        let not_found = || Error::PluginNotFound {
            kind,
            name: name.to_owned(),
        };
        let invalid = |reason: String| Error::PluginInvalid {
            kind,
            name: name.to_owned(),
            reason,
        };

        let path = self.locate(kind, name).ok_or_else(not_found)?;
        trace_debug!(path = %path.display(), "loading unit");

        let library = match open_library(&path) {
            Ok(lib) => lib,
            // The file may have been deleted after it was located.
            Err(_) if !path.exists() => return Err(not_found()),
            Err(e) => return Err(invalid(e.to_string())),
        };
        let declaration = read_declaration(&library).map_err(|e| invalid(e.to_string()))?;
        if declaration.core_version != CORE_VERSION {
            return Err(invalid(format!(
                "built against version {}, expected {CORE_VERSION}",
                declaration.core_version
            )));
        }

        let mut builder = UnitBuilder::default();
        (declaration.register)(&mut builder);
        let manifest = UnitManifest {
            name: name.to_owned(),
            entries: builder.entries,
        };

        Ok(LoadedUnit::with_library(
            Arc::new(manifest),
            Arc::new(library),
        ))
    }
}

#[allow(unsafe_code)]
fn open_library(path: &Path) -> core::result::Result<libloading::Library, libloading::Error> {
    // SAFETY: loading runs the library's initializers. Units are trusted code
    // by contract.
    unsafe { libloading::Library::new(path) }
}

#[allow(unsafe_code)]
fn read_declaration(
    library: &libloading::Library,
) -> core::result::Result<PluginDeclaration, libloading::Error> {
    // SAFETY: units export `OPTIMIZER_ENGINE_PLUGIN` through `export_plugin!`,
    // which fixes its type to `PluginDeclaration`. The copied value only
    // refers to code and data inside `library`, which the caller keeps alive
    // for as long as the declaration is used.
    unsafe {
        let symbol = library.get::<*const PluginDeclaration>(DECLARATION_SYMBOL.as_bytes())?;
        Ok(**symbol)
    }
}
