//! Modules registered ahead of time, keyed by file path.

use super::{DefaultExport, ModuleLoader};
use crate::error::LoadError;
use crate::paths;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// A module value with an optional default export and named exports.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredModule<T> {
    default: Option<T>,
    named: BTreeMap<String, T>,
}

impl<T> Default for RegisteredModule<T> {
    fn default() -> Self {
        Self {
            default: None,
            named: BTreeMap::new(),
        }
    }
}

impl<T> RegisteredModule<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A module with only a default export.
    pub fn with_default(trigger: T) -> Self {
        Self {
            default: Some(trigger),
            named: BTreeMap::new(),
        }
    }

    pub fn export(mut self, name: impl Into<String>, trigger: T) -> Self {
        self.named.insert(name.into(), trigger);
        self
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.named.get(name)
    }

    /// Take a named export, consuming the module.
    pub fn into_export(mut self, name: &str) -> Option<T> {
        self.named.remove(name)
    }
}

impl<T> DefaultExport for RegisteredModule<T> {
    type Trigger = T;

    fn default_export(self) -> Option<T> {
        self.default
    }
}

/// In-memory loader for modules registered by path.
///
/// Lookups ignore the file extension, so a module registered as
/// `handlers/users.ts` is found when the search discovers `handlers/users.js`.
#[derive(Debug, Clone)]
pub struct ModuleRegistry<M> {
    modules: HashMap<PathBuf, M>,
}

impl<M> Default for ModuleRegistry<M> {
    fn default() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }
}

impl<M> ModuleRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module` for the file at `path`. Re-registering replaces.
    pub fn register(&mut self, path: impl AsRef<Path>, module: M) -> &mut Self {
        self.modules.insert(Self::key(path.as_ref()), module);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn key(path: &Path) -> PathBuf {
        paths::strip_extension(&paths::normalize(path))
    }
}

impl<M: Clone> ModuleLoader for ModuleRegistry<M> {
    type Module = M;

    fn load(&self, path: &Path) -> Result<M, LoadError> {
        self.modules
            .get(&Self::key(path))
            .cloned()
            .ok_or_else(|| LoadError::NotRegistered(path.to_path_buf()))
    }
}
