//! exportfns - aggregate function triggers from a directory tree.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments, configuration or search failure

mod cli;
mod config;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use exportfns::{
    export_functions, ExportConfig, Exports, GlobSearch, InstanceResolver, ManifestLoader,
    TracingLogger,
};
use std::path::Path;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The config file may turn on verbose logging, so it is read first.
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(log_level(&args, &config));
    install_panic_hook();
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {}", config_source);

    if let Err(e) = run(&args, &config) {
        error!("Export failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Handle --init-config: generate a default .exportfns.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("Created {} with default settings.", CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so the exports document on stdout stays clean.
fn init_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}

/// Route panic reports through tracing.
///
/// Loader panics are caught and reported at ERROR by the exporter, so the
/// hook's own report only shows up with --verbose.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| debug!("{}", info)));
}

/// CLI verbosity flags win; otherwise the config file decides.
fn log_level(args: &Args, config: &Config) -> Level {
    if !args.quiet && config.general.verbose {
        Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Aggregate the exports and write them out.
fn run(args: &Args, config: &Config) -> Result<()> {
    let instance = InstanceResolver::from_signals([
        args.function_name.clone(),
        args.k_service.clone(),
    ]);
    match instance.current_instance() {
        Some(name) => info!("Single-instance mode: {}", name),
        None => debug!("Deployment mode"),
    }

    let export_config = ExportConfig::new(args.caller_file(), ManifestLoader::new())
        .base_dir(&args.root)
        .function_dir(&config.search.function_dir)
        .search_glob(config.search.glob.clone())
        .export_path_mode(config.output.path_mode)
        .enable_logger(config.general.timings)
        .logger(TracingLogger::new())
        .instance(instance)
        .search(GlobSearch {
            include_hidden: config.search.include_hidden,
        });

    let mut exports = Exports::new();
    export_functions(&export_config, &mut exports).with_context(|| {
        format!(
            "Failed to export functions from {}",
            export_config.search_root().display()
        )
    })?;

    let rendered = match config.output.format {
        OutputFormat::Json => report::render_json(&exports, config.output.pretty)?,
        OutputFormat::Tree => report::render_tree(&exports),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write exports to {}", path.display()))?;
            info!(
                "Wrote {} function(s) to {}",
                exports.leaves().len(),
                path.display()
            );
        }
        None => println!("{}", rendered.trim_end()),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so it reports where the configuration came
/// from instead of logging it.
fn load_config(args: &Args) -> Result<(Config, String)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, format!("loaded from {}", config_path.display())));
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok((config, format!("loaded from {}", CONFIG_FILE))),
        Ok(None) => Ok((Config::default(), "defaults".to_string())),
        Err(e) => {
            eprintln!("Warning: failed to load config: {:#}", e);
            Ok((Config::default(), "defaults".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;

    #[test]
    fn test_log_level_from_config() {
        let args = make_args();
        let mut config = Config::default();
        assert_eq!(log_level(&args, &config), Level::INFO);

        config.general.verbose = true;
        assert_eq!(log_level(&args, &config), Level::DEBUG);

        let mut quiet = make_args();
        quiet.quiet = true;
        assert_eq!(log_level(&quiet, &config), Level::ERROR);
    }
}
