//! Configuration manager
//!
//! This module contains the [`Manager`] struct which is the primary entry
//! point: one flag set and one settings store for one named configuration.

mod builder;

pub use builder::ManagerBuilder;

use crate::config::{BinderConfig, ConfigSchema, Field};
use crate::error::Result;
use crate::flags::FlagSet;
use crate::storage::{ConfigFormat, YamlFormat};
use crate::store::SettingsStore;
use crate::walker::walk;
use clap::{ArgMatches, Command};
use log::{debug, info};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

/// Binds a configuration schema to flags, environment variables and a
/// config file.
///
/// # Example
///
/// ```rust
/// use cfgbind::{ConfigSchema, Field, Manager, MapEnvSource};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Database {
///     max_conns: i64,
/// }
///
/// impl ConfigSchema for Database {
///     fn fields() -> Vec<Field> {
///         vec![Field::int("max_conns", "max-conns").description("Connection pool size")]
///     }
/// }
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct AppConfig {
///     database: Database,
/// }
///
/// impl ConfigSchema for AppConfig {
///     fn fields() -> Vec<Field> {
///         vec![Field::nested::<Database>("database", "database")]
///     }
/// }
///
/// let mut manager = Manager::builder("app")
///     .env_prefix("DB")
///     .env_source(MapEnvSource::new().with("DB_DATABASE_MAX_CONNS", "42"))
///     .build();
/// manager.init_flags::<AppConfig>().unwrap();
///
/// let config: AppConfig = manager.unmarshal().unwrap();
/// assert_eq!(config.database.max_conns, 42);
/// ```
#[derive(Debug)]
pub struct Manager<F: ConfigFormat = YamlFormat> {
    name: String,
    flags: FlagSet,
    store: SettingsStore<F>,
}

impl Manager<YamlFormat> {
    /// Create a manager with the standard search paths and YAML files
    ///
    /// Environment variables are looked up as `<ENV_PREFIX>_<KEY>`.
    pub fn new(name: impl Into<String>, env_prefix: impl Into<String>) -> Self {
        Self::with_config(BinderConfig::new(name, env_prefix))
    }

    /// Create a new builder
    pub fn builder(name: impl Into<String>) -> ManagerBuilder {
        ManagerBuilder::new(name)
    }
}

impl<F: ConfigFormat> Manager<F> {
    /// Create a manager from a prepared configuration
    pub fn with_config(config: BinderConfig<F>) -> Self {
        let name = config.name.clone();
        debug!("Creating manager for '{name}'");

        Self {
            flags: FlagSet::new(name.clone()),
            name,
            store: SettingsStore::new(config),
        }
    }

    /// Configuration name
    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Walk `T`'s schema and register its flags
    ///
    /// # Errors
    ///
    /// Returns a schema error (see [`Error::is_schema_error`]) when a field
    /// kind cannot be a flag or a flag cannot be registered. Nothing is
    /// registered in that case.
    ///
    /// [`Error::is_schema_error`]: crate::Error::is_schema_error
    pub fn init_flags<T: ConfigSchema>(&mut self) -> Result<()> {
        self.init_flags_from(&T::fields())
    }

    /// Walk an explicit field list and register its flags
    pub fn init_flags_from(&mut self, fields: &[Field]) -> Result<()> {
        let definitions = walk("", fields)?;

        let mut flags = self.flags.clone();
        flags.extend(definitions.iter().cloned())?;
        self.store.bind_flags(&definitions)?;
        self.flags = flags;

        info!(
            "Registered {} flags for '{}'",
            definitions.len(),
            self.name
        );
        Ok(())
    }

    /// Registered flags
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// A command holding only the registered flags
    pub fn command(&self) -> Command {
        self.flags.command()
    }

    /// Add the registered flags to an application's command
    pub fn augment(&self, command: Command) -> Command {
        self.flags.augment(command)
    }

    /// Parse arguments against the registered flags and bind the result
    ///
    /// # Errors
    ///
    /// Returns [`Error::Flags`](crate::Error::Flags) for arguments clap
    /// rejects, including `--help`.
    pub fn parse_flags<I, T>(&mut self, args: I) -> Result<ArgMatches>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.flags.try_parse_from(args)?;
        self.bind_matches(&matches);
        Ok(matches)
    }

    /// Bind flags from matches produced by an augmented command
    pub fn bind_matches(&mut self, matches: &ArgMatches) {
        self.store.bind_matches(matches);
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Read the config file, if one is found
    pub fn read_in_config(&mut self) -> Result<Option<PathBuf>> {
        self.store.read_config_file()
    }

    /// Merged flat view of all settings
    pub fn all_settings(&self) -> BTreeMap<String, Value> {
        self.store.all_settings()
    }

    /// Merged view of all settings as nested maps
    pub fn all_settings_nested(&self) -> Value {
        self.store.all_settings_nested()
    }

    /// Decode the merged settings into a new `T`
    pub fn unmarshal<T: ConfigSchema>(&self) -> Result<T> {
        self.store.unmarshal()
    }

    /// Decode the merged settings into `target`, leaving it untouched on error
    pub fn unmarshal_into<T: ConfigSchema>(&self, target: &mut T) -> Result<()> {
        self.store.unmarshal_into(target)
    }

    /// Environment variable consulted for a key
    pub fn env_var_name(&self, key: &str) -> String {
        self.store.env().var_name(key)
    }

    pub fn store(&self) -> &SettingsStore<F> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SettingsStore<F> {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldKind, MapEnvSource};
    use crate::error::Error;
    use crate::store::Layer;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use tempfile::tempdir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Database {
        max_conns: i64,
        url: String,
    }

    impl ConfigSchema for Database {
        fn fields() -> Vec<Field> {
            vec![
                Field::int("max_conns", "max-conns").short('m'),
                Field::string("url", "url"),
            ]
        }
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct AppConfig {
        database: Database,
        debug: bool,
    }

    impl ConfigSchema for AppConfig {
        fn fields() -> Vec<Field> {
            vec![
                Field::nested::<Database>("database", "database"),
                Field::bool("debug", "debug").short('d'),
            ]
        }
    }

    fn manager(dir: &std::path::Path, env: MapEnvSource) -> Manager {
        Manager::builder("app")
            .env_prefix("DB")
            .config_path(dir)
            .env_source(env)
            .build()
    }

    #[test]
    fn test_env_value_reaches_typed_field() {
        let dir = tempdir().unwrap();
        let mut manager = manager(
            dir.path(),
            MapEnvSource::new().with("DB_DATABASE_MAX_CONNS", "42"),
        );
        manager.init_flags::<AppConfig>().unwrap();

        assert!(manager.flags().get("database.max-conns").is_some());
        assert_eq!(
            manager.env_var_name("database.max-conns"),
            "DB_DATABASE_MAX_CONNS"
        );
        assert_eq!(manager.read_in_config().unwrap(), None);

        let config: AppConfig = manager.unmarshal().unwrap();
        assert_eq!(config.database.max_conns, 42);
    }

    #[test]
    fn test_flag_beats_env_and_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("app.yml"),
            "database:\n  max-conns: 5\n  url: pg://file\n",
        )
        .unwrap();

        let mut manager = manager(
            dir.path(),
            MapEnvSource::new().with("DB_DATABASE_MAX_CONNS", "7"),
        );
        manager.init_flags::<AppConfig>().unwrap();
        manager.read_in_config().unwrap();
        manager.parse_flags(["app", "-m", "9", "-d"]).unwrap();

        let config: AppConfig = manager.unmarshal().unwrap();
        assert_eq!(
            config,
            AppConfig {
                database: Database {
                    max_conns: 9,
                    url: "pg://file".to_string(),
                },
                debug: true,
            }
        );
        assert_eq!(manager.store().source("database.url"), Some(Layer::File));
    }

    #[test]
    fn test_unsupported_kind_registers_nothing() {
        let dir = tempdir().unwrap();
        let mut manager = manager(dir.path(), MapEnvSource::new());

        let fields = vec![
            Field::string("name", "name"),
            Field::new("ratio", "ratio", FieldKind::Unsupported("f64")),
        ];
        let err = manager.init_flags_from(&fields).unwrap_err();

        assert!(err.is_schema_error());
        assert!(manager.flags().is_empty());
        assert!(manager.all_settings().is_empty());
    }

    #[test]
    fn test_short_conflict_registers_nothing() {
        let dir = tempdir().unwrap();
        let mut manager = manager(dir.path(), MapEnvSource::new());
        manager.init_flags::<AppConfig>().unwrap();

        let fields = vec![
            Field::string("host", "host"),
            Field::bool("dry_run", "dry-run").short('d'),
        ];
        let err = manager.init_flags_from(&fields).unwrap_err();

        assert!(matches!(err, Error::FlagConflict { .. }));
        assert!(manager.flags().get("host").is_none());
        assert!(!manager.store().is_set("host"));
    }

    #[test]
    fn test_init_twice_is_last_wins() {
        let dir = tempdir().unwrap();
        let mut manager = manager(dir.path(), MapEnvSource::new());
        manager.init_flags::<AppConfig>().unwrap();
        manager.init_flags::<AppConfig>().unwrap();

        assert_eq!(manager.flags().len(), 3);
    }

    #[test]
    fn test_augmented_command_binding() {
        let dir = tempdir().unwrap();
        let mut manager = manager(dir.path(), MapEnvSource::new());
        manager.init_flags::<AppConfig>().unwrap();

        let command = manager.augment(Command::new("server"));
        let matches = command
            .try_get_matches_from(["server", "--database.url", "pg://cli"])
            .unwrap();
        manager.bind_matches(&matches);

        assert_eq!(
            manager.all_settings_nested(),
            json!({"database": {"max-conns": 0, "url": "pg://cli"}, "debug": false})
        );
    }

    #[test]
    fn test_binding_parent_of_augmented_subcommand() {
        let dir = tempdir().unwrap();
        let mut manager = manager(dir.path(), MapEnvSource::new());
        manager.init_flags::<AppConfig>().unwrap();
        manager.store_mut().set_default("database.url", json!("pg://default"));

        let command = Command::new("app").subcommand(manager.augment(Command::new("serve")));
        let matches = command
            .try_get_matches_from(["app", "serve", "--database.url", "pg://cli"])
            .unwrap();

        manager.bind_matches(&matches);
        assert_eq!(
            manager.store().source("database.url"),
            Some(Layer::Default)
        );

        if let Some(("serve", sub)) = matches.subcommand() {
            manager.bind_matches(sub);
        }
        let config: AppConfig = manager.unmarshal().unwrap();
        assert_eq!(config.database.url, "pg://cli");
        assert_eq!(manager.store().source("database.url"), Some(Layer::Flag));
    }

    #[test]
    fn test_help_is_a_flag_error() {
        let dir = tempdir().unwrap();
        let mut manager = manager(dir.path(), MapEnvSource::new());
        manager.init_flags::<AppConfig>().unwrap();

        let err = manager.parse_flags(["app", "--help"]).unwrap_err();
        match err {
            Error::Flags(e) => assert_eq!(e.kind(), clap::error::ErrorKind::DisplayHelp),
            other => panic!("unexpected error: {other}"),
        }
    }
}
