//! Core types for cfgbind

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::storage::{ConfigFormat, YamlFormat};

// =============================================================================
// Environment Sources
// =============================================================================

/// Source of environment variables
///
/// The settings store reads the environment through this trait so that the
/// lookup can be redirected (tests, embedded hosts).
pub trait EnvSource: Send + Sync {
    /// Look up a variable, mirroring [`std::env::var`]
    fn var(&self, key: &str) -> Result<String, std::env::VarError>;
}

/// Reads from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnvSource;

impl EnvSource for DefaultEnvSource {
    fn var(&self, key: &str) -> Result<String, std::env::VarError> {
        std::env::var(key)
    }
}

/// Reads from a fixed map of variables
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnvSource {
    fn var(&self, key: &str) -> Result<String, std::env::VarError> {
        self.vars
            .get(key)
            .cloned()
            .ok_or(std::env::VarError::NotPresent)
    }
}

// =============================================================================
// Binder Configuration
// =============================================================================

/// Configuration for one named configuration (one manager)
pub struct BinderConfig<F: ConfigFormat = YamlFormat> {
    /// Configuration name; the config file is `<name>.<ext>`
    pub name: String,

    /// Environment variable prefix (e.g. "APP" -> APP_DATABASE_URL).
    /// An empty prefix looks up the bare transliterated key.
    pub env_prefix: String,

    /// Look up every known key in the environment
    pub automatic_env: bool,

    /// Directories searched for the config file, in order
    pub config_paths: Vec<PathBuf>,

    /// Explicit config file; bypasses the search when set
    pub config_file: Option<PathBuf>,

    /// Config file format
    pub format: F,

    /// Environment lookup
    pub env_source: Arc<dyn EnvSource>,
}

impl<F: ConfigFormat> std::fmt::Debug for BinderConfig<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinderConfig")
            .field("name", &self.name)
            .field("env_prefix", &self.env_prefix)
            .field("automatic_env", &self.automatic_env)
            .field("config_paths", &self.config_paths)
            .field("config_file", &self.config_file)
            .field("format", &self.format.extensions())
            .finish_non_exhaustive()
    }
}

impl BinderConfig<YamlFormat> {
    /// Create a config with the standard search paths and YAML files
    pub fn new(name: impl Into<String>, env_prefix: impl Into<String>) -> Self {
        BinderConfigBuilder::new(name).env_prefix(env_prefix).build()
    }

    /// Create a new builder for `BinderConfig`
    ///
    /// # Example
    /// ```rust
    /// use cfgbind::BinderConfig;
    ///
    /// let config = BinderConfig::builder("app")
    ///     .env_prefix("APP")
    ///     .config_path("/opt/app")
    ///     .build();
    /// assert_eq!(config.name, "app");
    /// ```
    pub fn builder(name: impl Into<String>) -> BinderConfigBuilder {
        BinderConfigBuilder::new(name)
    }
}

impl<F: ConfigFormat> BinderConfig<F> {
    /// File names probed in each search directory
    pub fn config_file_names(&self) -> Vec<String> {
        self.format
            .extensions()
            .iter()
            .map(|ext| format!("{}.{ext}", self.name))
            .collect()
    }
}

/// Standard search directories for a configuration name
///
/// Current directory, the user config directory, then `/etc/<name>` on Unix.
pub fn default_config_paths(name: &str) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(name));
    }
    if cfg!(unix) {
        paths.push(PathBuf::from("/etc").join(name));
    }
    paths
}

/// Builder for creating `BinderConfig` with a fluent API
#[derive(Clone)]
pub struct BinderConfigBuilder<F: ConfigFormat = YamlFormat> {
    name: String,
    env_prefix: String,
    automatic_env: bool,
    config_paths: Option<Vec<PathBuf>>,
    config_file: Option<PathBuf>,
    format: F,
    env_source: Option<Arc<dyn EnvSource>>,
}

impl<F: ConfigFormat> std::fmt::Debug for BinderConfigBuilder<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinderConfigBuilder")
            .field("name", &self.name)
            .field("env_prefix", &self.env_prefix)
            .field("automatic_env", &self.automatic_env)
            .field("config_paths", &self.config_paths)
            .field("config_file", &self.config_file)
            .field("env_source", &self.env_source.as_ref().map(|_| "Some(EnvSource)"))
            .finish()
    }
}

impl BinderConfigBuilder<YamlFormat> {
    /// Create a new builder with the required configuration name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            env_prefix: String::new(),
            automatic_env: true,
            config_paths: None,
            config_file: None,
            format: YamlFormat,
            env_source: None,
        }
    }
}

impl<F: ConfigFormat> BinderConfigBuilder<F> {
    /// Set the environment variable prefix
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Disable automatic environment lookup
    pub fn without_env(mut self) -> Self {
        self.automatic_env = false;
        self
    }

    /// Add a directory to the config file search path
    ///
    /// The first call replaces the standard search paths. Supports `~`
    /// expansion for the home directory.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = expand_home(path.into());
        self.config_paths.get_or_insert_with(Vec::new).push(path);
        self
    }

    /// Use an explicit config file instead of searching
    ///
    /// Unlike a searched file, an explicit file must exist.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(expand_home(path.into()));
        self
    }

    /// Read the environment from a custom source
    pub fn env_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.env_source = Some(Arc::new(source));
        self
    }

    /// Use a different config file format
    ///
    /// # Example
    /// ```rust
    /// use cfgbind::{BinderConfig, JsonFormat};
    ///
    /// let config = BinderConfig::builder("app").format(JsonFormat::new()).build();
    /// assert_eq!(config.config_file_names(), vec!["app.json".to_string()]);
    /// ```
    pub fn format<G: ConfigFormat>(self, format: G) -> BinderConfigBuilder<G> {
        BinderConfigBuilder {
            name: self.name,
            env_prefix: self.env_prefix,
            automatic_env: self.automatic_env,
            config_paths: self.config_paths,
            config_file: self.config_file,
            format,
            env_source: self.env_source,
        }
    }

    /// Build the `BinderConfig`
    ///
    /// If no config path was added, uses [`default_config_paths`].
    pub fn build(self) -> BinderConfig<F> {
        let config_paths = self
            .config_paths
            .unwrap_or_else(|| default_config_paths(&self.name));

        BinderConfig {
            name: self.name,
            env_prefix: self.env_prefix,
            automatic_env: self.automatic_env,
            config_paths,
            config_file: self.config_file,
            format: self.format,
            env_source: self
                .env_source
                .unwrap_or_else(|| Arc::new(DefaultEnvSource)),
        }
    }
}

fn expand_home(path: PathBuf) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap_or(&path));
        }
    }
    path
}
