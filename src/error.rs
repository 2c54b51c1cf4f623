//! Error types for discovery and module loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an export run.
///
/// Only discovery can fail a run. Per-file load problems are reported as
/// [`LoadError`] and never escape [`crate::export_functions`].
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to search {}: {source}", .root.display())]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("File search failed: {0}")]
    Search(String),
}

/// Errors raised while loading a single module.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read module {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse module {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("No module registered for {}", .0.display())]
    NotRegistered(PathBuf),

    #[error("Unsupported module format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Module {} failed to load: {reason}", .path.display())]
    Failed { path: PathBuf, reason: String },

    #[error("Module {} panicked while loading: {message}", .path.display())]
    Panicked { path: PathBuf, message: String },
}

impl LoadError {
    /// Build a generic failure for custom loaders.
    pub fn failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Failed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
