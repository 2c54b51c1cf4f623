//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// exportfns - aggregate function triggers from a directory tree
///
/// Searches ROOT for function files, names each one from its relative path
/// and prints the resulting exports structure.
///
/// Examples:
///   exportfns ./functions --glob '**/*.func.json'
///   exportfns ./functions --path-mode --format tree
///   FUNCTION_NAME=auth-onCreate exportfns ./functions --glob '**/*.func.json'
///   exportfns --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Root directory the function directory is relative to
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: PathBuf,

    /// File that is excluded from its own exports
    ///
    /// Defaults to ROOT/index.js.
    #[arg(long, value_name = "FILE")]
    pub caller: Option<PathBuf>,

    /// Function directory, relative to ROOT
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<String>,

    /// Glob pattern selecting function files
    ///
    /// Example: --glob '**/*.func.json'
    #[arg(short, long, value_name = "PATTERN")]
    pub glob: Option<String>,

    /// Export relative file paths instead of loading modules
    #[arg(long)]
    pub path_mode: bool,

    /// Include hidden files and directories in the search
    #[arg(long)]
    pub include_hidden: bool,

    /// Output format (json, tree)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Print JSON on a single line
    #[arg(long)]
    pub compact: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Running function instance (single-instance mode)
    #[arg(long, value_name = "NAME", env = "FUNCTION_NAME")]
    pub function_name: Option<String>,

    /// Running service name, used when FUNCTION_NAME is not set
    #[arg(long, value_name = "NAME", env = "K_SERVICE")]
    pub k_service: Option<String>,

    /// Log discovery and load timings
    #[arg(long)]
    pub timings: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .exportfns.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .exportfns.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the exports structure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON document (default)
    #[default]
    Json,
    /// Indented tree, one function per line
    Tree,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The caller file, defaulting to `ROOT/index.js`.
    pub fn caller_file(&self) -> PathBuf {
        self.caller
            .clone()
            .unwrap_or_else(|| self.root.join("index.js"))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref glob) = self.glob {
            if glob.trim().is_empty() {
                return Err("Glob pattern must not be empty".to_string());
            }
        }

        if !self.root.exists() {
            return Err(format!(
                "Root directory does not exist: {}",
                self.root.display()
            ));
        }
        if !self.root.is_dir() {
            return Err(format!(
                "Root path is not a directory: {}",
                self.root.display()
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
