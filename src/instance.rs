//! Deployment vs. single-instance resolution.
//!
//! During deployment every function file is exported. Inside a deployed
//! instance the platform announces which function is running, and only that
//! one file needs to be loaded at cold start.

/// Primary instance signal, set by first-generation function runtimes.
pub const FUNCTION_NAME_VAR: &str = "FUNCTION_NAME";

/// Secondary instance signal, set by container-based runtimes.
pub const K_SERVICE_VAR: &str = "K_SERVICE";

/// Resolves the currently running function instance, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceResolver {
    instance: Option<String>,
}

impl InstanceResolver {
    /// A resolver in deployment mode.
    pub fn deployment() -> Self {
        Self::default()
    }

    /// A resolver pinned to a single instance name.
    pub fn single(instance: impl Into<String>) -> Self {
        Self::from_signals([Some(instance.into())])
    }

    /// Build from instance signals in priority order.
    ///
    /// The first present, non-empty signal wins.
    pub fn from_signals<I>(signals: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let instance = signals
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty());
        Self { instance }
    }

    /// Build from the `FUNCTION_NAME` and `K_SERVICE` environment variables.
    pub fn from_env() -> Self {
        Self::from_signals([
            std::env::var(FUNCTION_NAME_VAR).ok(),
            std::env::var(K_SERVICE_VAR).ok(),
        ])
    }

    pub fn current_instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// True when no instance signal is set.
    pub fn is_deployment(&self) -> bool {
        self.instance.is_none()
    }

    /// True when `flat_name` is exactly the running instance.
    pub fn matches_instance(&self, flat_name: &str) -> bool {
        self.instance.as_deref() == Some(flat_name)
    }

    /// True when a file with this function name should be exported.
    pub fn is_eligible(&self, flat_name: &str) -> bool {
        self.is_deployment() || self.matches_instance(flat_name)
    }
}
