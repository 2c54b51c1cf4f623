//! exportfns - glob-driven function trigger aggregation.
//!
//! Given a root directory and a glob pattern, `exportfns` discovers function
//! files, names each one from its relative path, loads it, and assigns its
//! trigger into a nested exports structure that a serverless deployment uses
//! as its set of entry points.
//!
//! ```no_run
//! use exportfns::{export_functions, ExportConfig, Exports, InstanceResolver, ManifestLoader};
//!
//! let config = ExportConfig::new("/srv/app/index.js", ManifestLoader::new())
//!     .search_glob("**/*.func.json")
//!     .instance(InstanceResolver::from_env());
//! let mut exports = Exports::new();
//! export_functions(&config, &mut exports)?;
//! # Ok::<(), exportfns::ExportError>(())
//! ```

pub mod error;
pub mod exporter;
pub mod exports;
pub mod instance;
pub mod loader;
pub mod logger;
pub mod naming;
pub mod paths;
pub mod scanner;

pub use error::{ExportError, LoadError};
pub use exporter::{export_functions, ExportConfig};
pub use exports::{ExportNode, Exports};
pub use instance::InstanceResolver;
pub use loader::{
    DefaultExport, LoadOutcome, ManifestLoader, ModuleLoader, ModuleRegistry, RegisteredModule,
};
pub use logger::{ExportLogger, NoopLogger, TracingLogger};
pub use naming::{func_name_from_rel_path, DefaultNamer, FunctionName, FunctionNamer};
pub use scanner::{FileSearch, GlobSearch};
