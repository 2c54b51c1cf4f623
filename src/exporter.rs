//! Function trigger aggregation.
//!
//! [`export_functions`] searches a directory with a glob pattern, names each
//! match from its relative path, loads it, and assigns its trigger into the
//! caller's [`Exports`]. In a deployed instance only the file whose name
//! matches the running function is loaded.

use crate::error::ExportError;
use crate::exports::Exports;
use crate::instance::InstanceResolver;
use crate::loader::{self, DefaultExport, LoadOutcome, ModuleLoader, TriggerExtractor};
use crate::logger::{ExportLogger, NoopLogger};
use crate::naming::{DefaultNamer, FunctionName, FunctionNamer};
use crate::paths;
use crate::scanner::{FileSearch, GlobSearch};
use std::path::{Path, PathBuf};

pub const DEFAULT_FUNCTION_DIR: &str = "./";
pub const DEFAULT_SEARCH_GLOB: &str = "**/*.js";

const DIR_SEARCH_MSG: &str = "[exportfns] Directory Glob Search";
const DEPLOY_MSG: &str = "[exportfns] Load & Export Modules (Deployment)";
const COLD_MODULE_MSG: &str = "[exportfns] Load Module (Cold-Start)";

/// Settings for one [`export_functions`] call.
pub struct ExportConfig<L: ModuleLoader, T> {
    /// The file calling the exporter. It is never exported itself.
    pub caller_file: PathBuf,
    /// Directory the function directory is relative to. Defaults to the
    /// caller file's directory.
    pub base_dir: Option<PathBuf>,
    /// Directory to search, relative to the base directory.
    pub function_dir: PathBuf,
    /// Glob selecting function files inside the function directory.
    pub search_glob: String,
    pub namer: Box<dyn FunctionNamer>,
    pub extract_trigger: TriggerExtractor<L::Module, T>,
    pub enable_logger: bool,
    pub logger: Box<dyn ExportLogger>,
    /// Assign each file's relative path instead of loading it.
    pub export_path_mode: bool,
    pub instance: InstanceResolver,
    pub loader: L,
    pub search: Box<dyn FileSearch>,
}

impl<L> ExportConfig<L, <L::Module as DefaultExport>::Trigger>
where
    L: ModuleLoader,
    L::Module: DefaultExport + 'static,
{
    /// Defaults: search `./` for `**/*.js`, default naming, default export,
    /// logging off, deployment mode.
    pub fn new(caller_file: impl Into<PathBuf>, loader: L) -> Self {
        Self {
            caller_file: caller_file.into(),
            base_dir: None,
            function_dir: PathBuf::from(DEFAULT_FUNCTION_DIR),
            search_glob: DEFAULT_SEARCH_GLOB.to_string(),
            namer: Box::new(DefaultNamer),
            extract_trigger: loader::default_extractor(),
            enable_logger: false,
            logger: Box::new(NoopLogger),
            export_path_mode: false,
            instance: InstanceResolver::deployment(),
            loader,
            search: Box::new(GlobSearch::new()),
        }
    }
}

impl<L: ModuleLoader, T> ExportConfig<L, T> {
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn function_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.function_dir = dir.into();
        self
    }

    pub fn search_glob(mut self, pattern: impl Into<String>) -> Self {
        self.search_glob = pattern.into();
        self
    }

    pub fn namer(mut self, namer: impl FunctionNamer + 'static) -> Self {
        self.namer = Box::new(namer);
        self
    }

    /// Replace trigger extraction. The trigger type may change.
    pub fn extract_trigger<U>(
        self,
        extract: impl Fn(L::Module, Option<&str>) -> Option<U> + 'static,
    ) -> ExportConfig<L, U> {
        ExportConfig {
            caller_file: self.caller_file,
            base_dir: self.base_dir,
            function_dir: self.function_dir,
            search_glob: self.search_glob,
            namer: self.namer,
            extract_trigger: Box::new(extract),
            enable_logger: self.enable_logger,
            logger: self.logger,
            export_path_mode: self.export_path_mode,
            instance: self.instance,
            loader: self.loader,
            search: self.search,
        }
    }

    pub fn enable_logger(mut self, enabled: bool) -> Self {
        self.enable_logger = enabled;
        self
    }

    pub fn logger(mut self, logger: impl ExportLogger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    pub fn export_path_mode(mut self, enabled: bool) -> Self {
        self.export_path_mode = enabled;
        self
    }

    pub fn instance(mut self, instance: InstanceResolver) -> Self {
        self.instance = instance;
        self
    }

    pub fn search(mut self, search: impl FileSearch + 'static) -> Self {
        self.search = Box::new(search);
        self
    }

    /// Absolute directory the glob runs in.
    pub fn search_root(&self) -> PathBuf {
        let base = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => self
                .caller_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        let root = paths::normalize(&base.join(&self.function_dir));
        if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root
        }
    }
}

/// Discover, name, load and assign every function file.
///
/// Returns the same `exports` it was given. Only discovery errors are
/// returned; files that fail to load are logged and skipped.
pub fn export_functions<'e, L, T>(
    config: &ExportConfig<L, T>,
    exports: &'e mut Exports<T>,
) -> Result<&'e mut Exports<T>, ExportError>
where
    L: ModuleLoader,
{
    let log: &dyn ExportLogger = if config.enable_logger {
        config.logger.as_ref()
    } else {
        &NoopLogger
    };

    let cwd = config.search_root();
    log.time(DIR_SEARCH_MSG);
    let files = config.search.search(&config.search_glob, &cwd)?;
    log.time_end(DIR_SEARCH_MSG);

    let instance = config.instance.current_instance();
    let deployment = config.instance.is_deployment();
    let module_search_msg = format!(
        "[exportfns] Search for Module '{}'",
        instance.unwrap_or_default()
    );
    if deployment {
        log.time(DEPLOY_MSG);
    } else {
        log.time(&module_search_msg);
    }

    let mut exported = 0usize;
    for file in files {
        let abs_path = paths::normalize(&cwd.join(&file));
        if paths::same_module(&abs_path, &config.caller_file) {
            continue;
        }

        let rel_path = paths::relative_slash_path(&abs_path, &cwd).unwrap_or(file);
        let name = FunctionName::new(config.namer.function_name(&rel_path));
        if !config.instance.is_eligible(name.as_str()) {
            continue;
        }
        if !deployment {
            log.time_end(&module_search_msg);
        }

        let property_path = name.property_path();
        if config.export_path_mode {
            exports.set_path(&property_path, rel_path);
            exported += 1;
            continue;
        }

        if !deployment {
            log.time(COLD_MODULE_MSG);
        }
        let outcome = loader::load_trigger(
            &config.loader,
            config.extract_trigger.as_ref(),
            &abs_path,
            instance,
        );
        if !deployment {
            log.time_end(COLD_MODULE_MSG);
        }

        if let LoadOutcome::Loaded(trigger) = outcome {
            exports.set_trigger(&property_path, trigger);
            exported += 1;
        }
    }

    if deployment {
        log.time_end(DEPLOY_MSG);
    }
    log.log(&format!(
        "[exportfns] Exported {} function(s) from {}",
        exported,
        cwd.display()
    ));

    Ok(exports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exports::ExportNode;
    use crate::loader::{ManifestLoader, ModuleRegistry, RegisteredModule};
    use crate::naming::func_name_from_rel_path;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    const TEST_FILES: [&str; 5] = [
        "pretend-index.ts",
        "sample.func.ts",
        "camel-case-func.func.ts",
        "folder/new.func.ts",
        "folder/not-a-func.ts",
    ];
    const TRIGGER: i32 = 7;

    struct Fixture {
        dir: TempDir,
        registry: ModuleRegistry<RegisteredModule<i32>>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let mut registry = ModuleRegistry::new();
            for file in TEST_FILES {
                let path = dir.path().join(file);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, format!("export default {};", TRIGGER)).unwrap();
                registry.register(&path, RegisteredModule::with_default(TRIGGER));
            }
            fs::create_dir_all(dir.path().join("empty-folder")).unwrap();
            Self { dir, registry }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn config(&self) -> ExportConfig<ModuleRegistry<RegisteredModule<i32>>, i32> {
            ExportConfig::new(self.root().join("pretend-index.ts"), self.registry.clone())
                .base_dir(self.root())
                .search_glob("**/*.func.ts")
        }
    }

    fn property_path(file: &str) -> String {
        FunctionName::new(func_name_from_rel_path(file)).property_path()
    }

    fn run<L: ModuleLoader, T>(config: &ExportConfig<L, T>) -> Exports<T> {
        let mut exports = Exports::new();
        export_functions(config, &mut exports).unwrap();
        exports
    }

    #[derive(Clone, Default)]
    struct RecordingLogger(Rc<RefCell<Vec<String>>>);

    impl ExportLogger for RecordingLogger {
        fn time(&self, label: &str) {
            self.0.borrow_mut().push(format!("time {}", label));
        }

        fn time_end(&self, label: &str) {
            self.0.borrow_mut().push(format!("timeEnd {}", label));
        }

        fn log(&self, message: &str) {
            self.0.borrow_mut().push(format!("log {}", message));
        }
    }

    #[test]
    fn test_does_not_export_itself() {
        let fixture = Fixture::new();
        let config = fixture.config().search_glob("**/*.ts");
        let exports = run(&config);
        assert!(!exports.contains(&property_path("pretend-index.ts")));
        assert!(exports.contains("sample"));
    }

    #[test]
    fn test_self_exclusion_ignores_extension() {
        let fixture = Fixture::new();
        let mut config = fixture.config().search_glob("**/*.ts");
        config.caller_file = fixture.root().join("pretend-index.js");
        let exports = run(&config);
        assert!(!exports.contains("pretendIndex"));
    }

    #[test]
    fn test_exports_default_export_of_each_module() {
        let fixture = Fixture::new();
        let exports = run(&fixture.config());
        assert_eq!(exports.trigger("sample"), Some(&TRIGGER));
    }

    #[test]
    fn test_nests_modules_found_in_directories() {
        let fixture = Fixture::new();
        let exports = run(&fixture.config());
        assert_eq!(property_path("folder/new.func.ts"), "folder.new");
        assert_eq!(exports.trigger("folder.new"), Some(&TRIGGER));
    }

    #[test]
    fn test_camel_cases_kebab_file_names() {
        let fixture = Fixture::new();
        let exports = run(&fixture.config());
        assert_eq!(exports.trigger("camelCaseFunc"), Some(&TRIGGER));
        assert!(!exports.contains("camel"));
    }

    #[test]
    fn test_glob_excludes_non_matching_files() {
        let fixture = Fixture::new();
        let exports = run(&fixture.config());
        assert!(!exports.contains(&property_path("folder/not-a-func.ts")));
        assert!(!exports.contains("emptyFolder"));
    }

    #[test]
    fn test_deployment_exports_every_eligible_file() {
        let fixture = Fixture::new();
        let exports = run(&fixture.config());
        let leaves: Vec<String> = exports.leaves().into_iter().map(|(p, _)| p).collect();
        assert_eq!(leaves.len(), 3);
        for expected in ["sample", "camelCaseFunc", "folder.new"] {
            assert!(leaves.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn test_runs_custom_namer() {
        let fixture = Fixture::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let config = fixture.config().namer(move |path: &str| {
            counter.set(counter.get() + 1);
            format!("custom-{}", func_name_from_rel_path(path))
        });

        let exports = run(&config);
        assert_eq!(calls.get(), 3);
        assert_eq!(exports.trigger("custom.sample"), Some(&TRIGGER));
        assert_eq!(exports.trigger("custom.folder.new"), Some(&TRIGGER));
    }

    #[test]
    fn test_works_without_base_dir() {
        let fixture = Fixture::new();
        let mut config = fixture.config().enable_logger(true);
        config.base_dir = None;
        let exports = run(&config);
        assert_eq!(exports.trigger("sample"), Some(&TRIGGER));
    }

    #[test]
    fn test_function_dir_is_relative_to_base() {
        let fixture = Fixture::new();
        let config = fixture.config().function_dir("./folder");
        let exports = run(&config);
        assert_eq!(exports.trigger("new"), Some(&TRIGGER));
        assert!(!exports.contains("sample"));
    }

    #[test]
    fn test_search_root_keeps_leading_parent_dirs() {
        let config = ExportConfig::new("index.js", ManifestLoader::new())
            .function_dir("../../functions");
        assert_eq!(config.search_root(), PathBuf::from("../../functions"));

        let config = ExportConfig::new("/srv/app/index.js", ManifestLoader::new())
            .function_dir("../../functions");
        assert_eq!(config.search_root(), PathBuf::from("/functions"));
    }

    #[test]
    fn test_leading_dot_slash_in_glob() {
        let fixture = Fixture::new();
        let plain = run(&fixture.config());
        let dotted = run(&fixture.config().search_glob("./**/*.func.ts"));
        assert_eq!(plain, dotted);
    }

    #[test]
    fn test_single_instance_exports_only_match() {
        let fixture = Fixture::new();
        let instance = func_name_from_rel_path("sample.func.ts");
        let config = fixture
            .config()
            .instance(InstanceResolver::single(instance))
            .enable_logger(true);

        let exports = run(&config);
        assert!(exports.contains("sample"));
        assert!(!exports.contains("camelCaseFunc"));
        assert_eq!(exports.len(), 1);
    }

    #[test]
    fn test_single_instance_nested_match() {
        let fixture = Fixture::new();
        let config = fixture
            .config()
            .instance(InstanceResolver::single("folder-new"));
        let exports = run(&config);
        assert_eq!(exports.leaves().len(), 1);
        assert_eq!(exports.trigger("folder.new"), Some(&TRIGGER));
    }

    #[test]
    fn test_single_instance_without_match_is_empty() {
        let fixture = Fixture::new();
        let config = fixture
            .config()
            .instance(InstanceResolver::single("doesNotExist"));
        assert!(run(&config).is_empty());
    }

    #[test]
    fn test_path_mode_assigns_relative_paths() {
        let fixture = Fixture::new();
        let config = fixture.config().export_path_mode(true);
        let exports = run(&config);

        assert_eq!(
            exports.get("sample").and_then(ExportNode::as_path),
            Some("sample.func.ts")
        );
        assert_eq!(
            exports.get("folder.new").and_then(ExportNode::as_path),
            Some("folder/new.func.ts")
        );
        assert!(exports.leaves().iter().all(|(_, node)| node.as_trigger().is_none()));
    }

    #[test]
    fn test_failed_load_does_not_abort_run() {
        let fixture = Fixture::new();
        let mut registry = ModuleRegistry::new();
        registry.register(
            fixture.root().join("sample.func.ts"),
            RegisteredModule::with_default(TRIGGER),
        );
        // camel-case-func and folder/new are not registered and fail to load.
        let config = ExportConfig::new(fixture.root().join("pretend-index.ts"), registry)
            .search_glob("**/*.func.ts");

        let exports = run(&config);
        assert_eq!(exports.trigger("sample"), Some(&TRIGGER));
        assert_eq!(exports.leaves().len(), 1);
    }

    #[test]
    fn test_empty_default_export_is_skipped() {
        let fixture = Fixture::new();
        let mut registry = fixture.registry.clone();
        registry.register(fixture.root().join("sample.func.ts"), RegisteredModule::new());
        let config = ExportConfig::new(fixture.root().join("pretend-index.ts"), registry)
            .search_glob("**/*.func.ts");

        let exports = run(&config);
        assert!(!exports.contains("sample"));
        assert!(exports.contains("camelCaseFunc"));
    }

    #[test]
    fn test_custom_extractor_sees_instance() {
        let fixture = Fixture::new();
        let config = fixture
            .config()
            .instance(InstanceResolver::single("sample"))
            .extract_trigger(|module: RegisteredModule<i32>, instance: Option<&str>| {
                module
                    .default_export()
                    .map(|value| format!("{}:{}", instance.unwrap_or("-"), value))
            });

        let exports = run(&config);
        assert_eq!(exports.trigger("sample"), Some(&"sample:7".to_string()));
    }

    #[test]
    fn test_colliding_names_keep_one_entry() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("dup.func.json"), r#"{ "default": 1 }"#).unwrap();
        fs::write(tmp.path().join("dup.func.toml"), "default = 2\n").unwrap();

        let config = ExportConfig::new(tmp.path().join("index.js"), ManifestLoader::new())
            .search_glob("dup.func.*");
        let exports = run(&config);

        // Which file wins depends on search order; only one entry survives.
        assert_eq!(exports.leaves().len(), 1);
        let winner = exports.trigger("dup").and_then(|v| v.as_i64());
        assert!(matches!(winner, Some(1) | Some(2)));
    }

    #[test]
    fn test_missing_function_dir_is_fatal() {
        let fixture = Fixture::new();
        let config = fixture.config().function_dir("missing");
        let mut exports = Exports::new();
        let err = export_functions(&config, &mut exports).unwrap_err();
        assert!(matches!(err, ExportError::Discovery { .. }));
    }

    #[test]
    fn test_returns_the_given_exports() {
        let fixture = Fixture::new();
        let mut exports = Exports::new();
        exports.set_trigger("existing", 1);

        let returned = export_functions(&fixture.config(), &mut exports).unwrap();
        returned.set_trigger("added", 2);

        assert_eq!(exports.trigger("existing"), Some(&1));
        assert_eq!(exports.trigger("added"), Some(&2));
        assert_eq!(exports.trigger("sample"), Some(&TRIGGER));
    }

    #[test]
    fn test_manifest_modules() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("auth")).unwrap();
        fs::write(
            tmp.path().join("auth/on-create.func.json"),
            r#"{ "default": { "trigger": "auth.user.create" } }"#,
        )
        .unwrap();
        fs::write(tmp.path().join("broken.func.json"), "{").unwrap();
        fs::write(tmp.path().join("helper.func.json"), r#"{ "util": true }"#).unwrap();

        let config = ExportConfig::new(tmp.path().join("index.js"), ManifestLoader::new())
            .search_glob("**/*.func.json");
        let exports = run(&config);

        assert_eq!(
            exports.trigger("auth.onCreate"),
            Some(&serde_json::json!({ "trigger": "auth.user.create" }))
        );
        assert_eq!(exports.leaves().len(), 1);
    }

    #[test]
    fn test_logger_timers_in_deployment() {
        let fixture = Fixture::new();
        let logger = RecordingLogger::default();
        let config = fixture.config().enable_logger(true).logger(logger.clone());
        run(&config);

        let lines = logger.0.borrow();
        assert_eq!(lines[0], format!("time {}", DIR_SEARCH_MSG));
        assert_eq!(lines[1], format!("timeEnd {}", DIR_SEARCH_MSG));
        assert_eq!(lines[2], format!("time {}", DEPLOY_MSG));
        assert_eq!(lines[3], format!("timeEnd {}", DEPLOY_MSG));
        assert!(!lines.iter().any(|l| l.contains(COLD_MODULE_MSG)));
    }

    #[test]
    fn test_logger_timers_in_single_instance() {
        let fixture = Fixture::new();
        let logger = RecordingLogger::default();
        let config = fixture
            .config()
            .instance(InstanceResolver::single("sample"))
            .enable_logger(true)
            .logger(logger.clone());
        run(&config);

        let search_msg = "[exportfns] Search for Module 'sample'";
        let lines = logger.0.borrow();
        assert_eq!(lines[2], format!("time {}", search_msg));
        assert_eq!(lines[3], format!("timeEnd {}", search_msg));
        assert_eq!(lines[4], format!("time {}", COLD_MODULE_MSG));
        assert_eq!(lines[5], format!("timeEnd {}", COLD_MODULE_MSG));
        assert!(!lines.iter().any(|l| l.contains(DEPLOY_MSG)));
    }

    #[test]
    fn test_disabled_logger_records_nothing() {
        let fixture = Fixture::new();
        let logger = RecordingLogger::default();
        let config = fixture.config().logger(logger.clone());
        run(&config);
        assert!(logger.0.borrow().is_empty());
    }
}
