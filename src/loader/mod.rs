//! Module loading and trigger extraction.
//!
//! There is no way to `require` an arbitrary source file into a compiled
//! binary, so loading goes through [`ModuleLoader`]. Two loaders ship with
//! the crate: [`ModuleRegistry`] for modules registered up front, and
//! [`ManifestLoader`] for JSON/TOML manifests read from disk.

mod manifest;
mod registry;

pub use manifest::ManifestLoader;
pub use registry::{ModuleRegistry, RegisteredModule};

use crate::error::LoadError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::error;

/// Name of the export read by the default trigger extractor.
pub const DEFAULT_EXPORT: &str = "default";

/// Loads the module living at an absolute path.
pub trait ModuleLoader {
    type Module;

    fn load(&self, path: &Path) -> Result<Self::Module, LoadError>;
}

/// Modules that carry a default export.
pub trait DefaultExport {
    type Trigger;

    /// Take the default export, or `None` if there is nothing to export.
    fn default_export(self) -> Option<Self::Trigger>;
}

impl DefaultExport for serde_json::Value {
    type Trigger = serde_json::Value;

    fn default_export(self) -> Option<serde_json::Value> {
        match self {
            serde_json::Value::Object(mut map) => {
                map.remove(DEFAULT_EXPORT).filter(|value| !value.is_null())
            }
            _ => None,
        }
    }
}

/// Pulls the trigger out of a loaded module.
///
/// Receives the running instance name when not in deployment mode.
pub type TriggerExtractor<M, T> = Box<dyn Fn(M, Option<&str>) -> Option<T>>;

/// The extractor used when none is configured.
pub fn default_extractor<M>() -> TriggerExtractor<M, M::Trigger>
where
    M: DefaultExport + 'static,
{
    Box::new(|module: M, _instance: Option<&str>| module.default_export())
}

/// Result of loading one function file.
#[derive(Debug)]
pub enum LoadOutcome<T> {
    Loaded(T),
    /// The module loaded but exported nothing.
    Empty,
    /// The module failed to load. Already reported.
    Failed(LoadError),
}

impl<T> LoadOutcome<T> {
    pub fn into_trigger(self) -> Option<T> {
        match self {
            LoadOutcome::Loaded(trigger) => Some(trigger),
            _ => None,
        }
    }
}

/// Load a module and extract its trigger, isolating any failure.
///
/// Loader errors and panics (from the loader or the extractor) are logged
/// and returned as [`LoadOutcome::Failed`]; they never abort the caller.
///
/// The process panic hook still runs before the panic is caught, so with the
/// default hook a `thread ... panicked` block reaches stderr as well. Binaries
/// that want clean output install their own hook, as `exportfns` does.
pub fn load_trigger<L, T>(
    loader: &L,
    extract: &dyn Fn(L::Module, Option<&str>) -> Option<T>,
    path: &Path,
    instance: Option<&str>,
) -> LoadOutcome<T>
where
    L: ModuleLoader + ?Sized,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        loader.load(path).map(|module| extract(module, instance))
    }));

    let err = match result {
        Ok(Ok(Some(trigger))) => return LoadOutcome::Loaded(trigger),
        Ok(Ok(None)) => return LoadOutcome::Empty,
        Ok(Err(err)) => err,
        Err(payload) => LoadError::Panicked {
            path: path.to_path_buf(),
            message: panic_message(payload.as_ref()),
        },
    };

    error!("Failed to load function module {}: {}", path.display(), err);
    LoadOutcome::Failed(err)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
