//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.exportfns.toml` files.

use crate::cli::{Args, OutputFormat};
use anyhow::{Context, Result};
use exportfns::exporter::DEFAULT_FUNCTION_DIR;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".exportfns.toml";

/// Default glob for the CLI, matching what `ManifestLoader` can read.
pub const DEFAULT_MANIFEST_GLOB: &str = "**/*.{json,toml}";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Log discovery and load timings.
    #[serde(default)]
    pub timings: bool,
}

/// Function discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Function directory, relative to the root directory.
    #[serde(default = "default_function_dir")]
    pub function_dir: String,

    /// Glob pattern selecting function files.
    #[serde(default = "default_glob")]
    pub glob: String,

    /// Include hidden files and directories.
    #[serde(default)]
    pub include_hidden: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            function_dir: default_function_dir(),
            glob: default_glob(),
            include_hidden: false,
        }
    }
}

fn default_function_dir() -> String {
    DEFAULT_FUNCTION_DIR.to_string()
}

fn default_glob() -> String {
    DEFAULT_MANIFEST_GLOB.to_string()
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Export relative file paths instead of loaded triggers.
    #[serde(default)]
    pub path_mode: bool,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path_mode: false,
            format: OutputFormat::default(),
            pretty: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref dir) = args.dir {
            self.search.function_dir = dir.clone();
        }
        if let Some(ref glob) = args.glob {
            self.search.glob = glob.clone();
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }

        // Flags always override
        if args.include_hidden {
            self.search.include_hidden = true;
        }
        if args.path_mode {
            self.output.path_mode = true;
        }
        if args.compact {
            self.output.pretty = false;
        }
        if args.timings {
            self.general.timings = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
