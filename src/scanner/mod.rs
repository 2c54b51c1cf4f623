//! File discovery for function modules.
//!
//! This module provides the glob search the exporter runs once per call.
//! The search is a seam: anything implementing [`FileSearch`] can replace
//! the default walkdir + globset implementation.

use crate::error::ExportError;
use crate::paths;
use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Returns files under `cwd` matching `pattern`, as paths relative to `cwd`.
pub trait FileSearch {
    fn search(&self, pattern: &str, cwd: &Path) -> Result<Vec<String>, ExportError>;
}

impl<F> FileSearch for F
where
    F: Fn(&str, &Path) -> Result<Vec<String>, ExportError>,
{
    fn search(&self, pattern: &str, cwd: &Path) -> Result<Vec<String>, ExportError> {
        self(pattern, cwd)
    }
}

/// Default glob search.
///
/// Matches `/`-separated relative paths; `*` does not cross `/`, `**/`
/// matches zero or more directories. Hidden entries are skipped, symlinks
/// are not followed and directories are never returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobSearch {
    /// Include entries whose name starts with `.`.
    pub include_hidden: bool,
}

impl GlobSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a pattern, ignoring a leading `./`.
    pub fn compile(pattern: &str) -> Result<GlobMatcher, ExportError> {
        let normalized = normalize_pattern(pattern);
        GlobBuilder::new(normalized)
            .literal_separator(true)
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|source| ExportError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    fn is_excluded(&self, entry: &DirEntry, hidden: &HiddenSegments) -> bool {
        if self.include_hidden || entry.depth() == 0 {
            return false;
        }
        match entry.file_name().to_str() {
            Some(name) if name.starts_with('.') => !hidden.allows(name),
            _ => false,
        }
    }
}

/// Hidden segments a pattern names on purpose.
///
/// Wildcards never match a leading `.`, but a segment written as `.well-known`
/// or `.*` opts hidden entries back in.
#[derive(Debug, Default)]
struct HiddenSegments {
    any: bool,
    names: Vec<String>,
}

impl HiddenSegments {
    fn from_pattern(pattern: &str) -> Self {
        let mut hidden = Self::default();
        for segment in normalize_pattern(pattern).split('/') {
            if !segment.starts_with('.') || segment == "." || segment == ".." {
                continue;
            }
            if segment.contains(['*', '?', '[', '{']) {
                hidden.any = true;
            } else {
                hidden.names.push(segment.to_string());
            }
        }
        hidden
    }

    fn allows(&self, name: &str) -> bool {
        self.any || self.names.iter().any(|n| n == name)
    }
}

impl FileSearch for GlobSearch {
    fn search(&self, pattern: &str, cwd: &Path) -> Result<Vec<String>, ExportError> {
        let matcher = Self::compile(pattern)?;
        let hidden = HiddenSegments::from_pattern(pattern);
        let mut files = Vec::new();

        let walker = WalkDir::new(cwd)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry, &hidden));

        for entry in walker {
            let entry = entry.map_err(|source| ExportError::Discovery {
                root: cwd.to_path_buf(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let rel_path = match entry.path().strip_prefix(cwd) {
                Ok(rel) => paths::to_slash(rel),
                Err(_) => continue,
            };

            if matcher.is_match(&rel_path) {
                files.push(rel_path);
            }
        }

        debug!(
            "Glob '{}' matched {} files under {}",
            pattern,
            files.len(),
            cwd.display()
        );
        Ok(files)
    }
}

/// Strip any leading `./` so `./**/*.js` behaves like `**/*.js`.
pub fn normalize_pattern(pattern: &str) -> &str {
    let mut pattern = pattern;
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    pattern
}
