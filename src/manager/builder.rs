//! Builder for Manager
//!
//! This module contains [`ManagerBuilder`] which provides a fluent API
//! for creating a [`Manager`](super::Manager).

use crate::config::{BinderConfigBuilder, EnvSource};
use crate::storage::{ConfigFormat, YamlFormat};
use std::path::PathBuf;

use super::Manager;

/// Builder for creating a [`Manager`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use cfgbind::{JsonFormat, Manager};
///
/// let manager = Manager::builder("my-app")
///     .env_prefix("MYAPP")
///     .config_path("~/.config/my-app")
///     .format(JsonFormat::new())
///     .build();
/// assert_eq!(manager.env_var_name("log.level"), "MYAPP_LOG_LEVEL");
/// ```
#[derive(Debug)]
pub struct ManagerBuilder<F: ConfigFormat = YamlFormat> {
    config_builder: BinderConfigBuilder<F>,
}

impl ManagerBuilder<YamlFormat> {
    /// Create a new builder with the required configuration name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config_builder: BinderConfigBuilder::new(name),
        }
    }
}

impl<F: ConfigFormat> ManagerBuilder<F> {
    /// Set the environment variable prefix.
    ///
    /// `MYAPP` makes `MYAPP_LOG_LEVEL` override the `log.level` setting.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.env_prefix(prefix);
        self
    }

    /// Ignore environment variables entirely.
    pub fn without_env(mut self) -> Self {
        self.config_builder = self.config_builder.without_env();
        self
    }

    /// Add a directory to search for the config file.
    ///
    /// The first call replaces the standard search paths.
    /// Supports `~` expansion for home directory.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.config_path(path);
        self
    }

    /// Read this config file instead of searching.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.config_file(path);
        self
    }

    /// Read the environment from a custom source.
    pub fn env_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.config_builder = self.config_builder.env_source(source);
        self
    }

    /// Use a different config file format.
    pub fn format<G: ConfigFormat>(self, format: G) -> ManagerBuilder<G> {
        ManagerBuilder {
            config_builder: self.config_builder.format(format),
        }
    }

    /// Build the [`Manager`].
    pub fn build(self) -> Manager<F> {
        Manager::with_config(self.config_builder.build())
    }
}
