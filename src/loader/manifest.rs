//! Function manifests read from disk.

use super::ModuleLoader;
use crate::error::LoadError;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Loads `.json` and `.toml` files as modules.
///
/// A manifest's top-level table is the module; its `default` key is the
/// default export.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    pub fn new() -> Self {
        Self
    }

    fn parse(path: &Path, content: &str) -> Result<Value, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "json" => serde_json::from_str(content).map_err(|e| LoadError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            "toml" => toml::from_str(content).map_err(|e| LoadError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl ModuleLoader for ManifestLoader {
    type Module = Value;

    fn load(&self, path: &Path) -> Result<Value, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }
}
