//! Layered settings store
//!
//! The store merges, from lowest to highest precedence:
//!
//! 1. flag zero-defaults from bound flag definitions
//! 2. explicit defaults ([`SettingsStore::set_default`])
//! 3. the config file ([`SettingsStore::read_config_file`])
//! 4. environment variables, looked up for every known key
//! 5. flags given on the command line ([`SettingsStore::bind_matches`])
//! 6. explicit overrides ([`SettingsStore::set`])
//!
//! Keys are dotted paths and case-insensitive.

mod decode;
mod env;
mod keys;

pub use decode::{coerce, parse_bool, parse_int};
pub use env::EnvironmentHandler;
pub use keys::{flatten, normalize, unflatten};

use crate::config::{BinderConfig, ConfigSchema};
use crate::error::{Error, Result};
use crate::flags::FlagDefinition;
use crate::storage::{ConfigFormat, YamlFormat};
use clap::ArgMatches;
use log::{debug, info};
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Dot-separated segments of letters, digits, `_` and `-`; no segment starts with `-`
static FLAG_NAME: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*(\.[A-Za-z0-9_][A-Za-z0-9_-]*)*$")
});

/// Source layer of a setting, ordered by precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Zero value of a bound flag
    FlagDefault,
    /// Explicit default
    Default,
    /// Config file
    File,
    /// Environment variable
    Env,
    /// Flag given on the command line
    Flag,
    /// Explicit override
    Override,
}

/// Layered key/value store for one configuration
pub struct SettingsStore<F: ConfigFormat = YamlFormat> {
    config: BinderConfig<F>,
    env: EnvironmentHandler,
    definitions: Vec<FlagDefinition>,
    flag_defaults: BTreeMap<String, Value>,
    defaults: BTreeMap<String, Value>,
    file: BTreeMap<String, Value>,
    flags: BTreeMap<String, Value>,
    overrides: BTreeMap<String, Value>,
    config_file_used: Option<PathBuf>,
}

impl<F: ConfigFormat> std::fmt::Debug for SettingsStore<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("config", &self.config)
            .field("definitions", &self.definitions.len())
            .field("config_file_used", &self.config_file_used)
            .finish_non_exhaustive()
    }
}

impl<F: ConfigFormat> SettingsStore<F> {
    /// Create an empty store
    pub fn new(config: BinderConfig<F>) -> Self {
        let env = EnvironmentHandler::new(
            config.env_prefix.clone(),
            config.automatic_env,
            config.env_source.clone(),
        );

        Self {
            config,
            env,
            definitions: Vec::new(),
            flag_defaults: BTreeMap::new(),
            defaults: BTreeMap::new(),
            file: BTreeMap::new(),
            flags: BTreeMap::new(),
            overrides: BTreeMap::new(),
            config_file_used: None,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &BinderConfig<F> {
        &self.config
    }

    /// Environment variable naming and lookup
    pub fn env(&self) -> &EnvironmentHandler {
        &self.env
    }

    /// Flag definitions bound so far
    pub fn definitions(&self) -> &[FlagDefinition] {
        &self.definitions
    }

    /// Path of the config file loaded by the last successful read, if any
    pub fn config_file_used(&self) -> Option<&Path> {
        self.config_file_used.as_deref()
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Register flag definitions as the flag layer
    ///
    /// Every definition's zero value becomes the lowest layer for its key.
    /// All names are checked before anything is registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFlag`] for an empty or malformed name.
    pub fn bind_flags(&mut self, definitions: &[FlagDefinition]) -> Result<()> {
        for definition in definitions {
            validate_flag_name(&definition.name)?;
        }

        for definition in definitions {
            let key = normalize(&definition.name);
            self.flag_defaults.insert(key, definition.default.clone());
            match self
                .definitions
                .iter_mut()
                .find(|d| d.name == definition.name)
            {
                Some(existing) => *existing = definition.clone(),
                None => self.definitions.push(definition.clone()),
            }
        }

        debug!("Bound {} flags", definitions.len());
        Ok(())
    }

    /// Take the values of bound flags given on the command line
    ///
    /// Replaces whatever an earlier call captured. Flags left at their
    /// default do not enter the flag layer.
    pub fn bind_matches(&mut self, matches: &ArgMatches) {
        self.flags = self
            .definitions
            .iter()
            .filter_map(|d| d.value_from(matches).map(|v| (normalize(&d.name), v)))
            .collect();
        debug!("Captured {} flags from the command line", self.flags.len());
    }

    // =========================================================================
    // Config File
    // =========================================================================

    /// Locate the config file
    ///
    /// The explicit file wins when set; otherwise the first
    /// `<name>.<ext>` found in the search paths.
    pub fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config.config_file {
            return Some(path.clone());
        }

        let names = self.config.config_file_names();
        self.config
            .config_paths
            .iter()
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
    }

    /// Load the config file into the file layer
    ///
    /// Returns the path that was read, or `None` when no file was found.
    /// A missing searched file is not an error; the file layer stays empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed content and
    /// [`Error::FileRead`] when an explicit config file cannot be read.
    pub fn read_config_file(&mut self) -> Result<Option<PathBuf>> {
        let Some(path) = self.find_config_file() else {
            debug!(
                "No config file named {:?} in {:?}",
                self.config.config_file_names(),
                self.config.config_paths
            );
            return Ok(None);
        };

        let value = self.config.format.read(&path)?;
        self.file = flatten(&value);
        self.config_file_used = Some(path.clone());

        info!("Loaded config file {}", path.display());
        Ok(Some(path))
    }

    /// Write the merged settings to `path` in the configured format
    pub fn write_config_as(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.config.format.write(path, &self.all_settings_nested())?;
        info!("Wrote config file {}", path.display());
        Ok(())
    }

    // =========================================================================
    // Explicit Layers
    // =========================================================================

    /// Set a default value; maps are stored as their dotted leaves
    pub fn set_default(&mut self, key: &str, value: Value) {
        insert_flattened(&mut self.defaults, key, &value);
    }

    /// Override a value above every other layer
    pub fn set(&mut self, key: &str, value: Value) {
        insert_flattened(&mut self.overrides, key, &value);
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Find the winning value and its layer for a leaf key
    fn find(&self, key: &str) -> Option<(Value, Layer)> {
        if let Some(v) = self.overrides.get(key) {
            return Some((v.clone(), Layer::Override));
        }
        if let Some(v) = self.flags.get(key) {
            return Some((v.clone(), Layer::Flag));
        }
        if let Some(v) = self.env.lookup(key) {
            return Some((v, Layer::Env));
        }
        if let Some(v) = self.file.get(key) {
            return Some((v.clone(), Layer::File));
        }
        if let Some(v) = self.defaults.get(key) {
            return Some((v.clone(), Layer::Default));
        }
        self.flag_defaults
            .get(key)
            .map(|v| (v.clone(), Layer::FlagDefault))
    }

    /// Every key any layer knows about
    fn known_keys(&self) -> BTreeSet<&String> {
        self.flag_defaults
            .keys()
            .chain(self.defaults.keys())
            .chain(self.file.keys())
            .chain(self.flags.keys())
            .chain(self.overrides.keys())
            .collect()
    }

    /// Get a value by dotted key
    ///
    /// A key naming a section returns the nested map of its merged leaves.
    pub fn get(&self, key: &str) -> Option<Value> {
        let key = normalize(key);
        if let Some((value, _)) = self.find(&key) {
            return Some(value);
        }

        let section = format!("{key}.");
        let leaves: BTreeMap<String, Value> = self
            .all_settings()
            .into_iter()
            .filter_map(|(k, v)| k.strip_prefix(&section).map(|rest| (rest.to_string(), v)))
            .collect();
        (!leaves.is_empty()).then(|| unflatten(&leaves))
    }

    /// Whether any layer provides a value for a leaf key
    pub fn is_set(&self, key: &str) -> bool {
        self.find(&normalize(key)).is_some()
    }

    /// Which layer provides the value of a leaf key
    pub fn source(&self, key: &str) -> Option<Layer> {
        self.find(&normalize(key)).map(|(_, layer)| layer)
    }

    /// Merged view of every known key, flat and dotted
    pub fn all_settings(&self) -> BTreeMap<String, Value> {
        self.known_keys()
            .into_iter()
            .filter_map(|key| self.find(key).map(|(value, _)| (key.clone(), value)))
            .collect()
    }

    /// Merged view as nested maps
    pub fn all_settings_nested(&self) -> Value {
        unflatten(&self.all_settings())
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    /// Decode the merged settings into a new `T`
    ///
    /// Values are matched by the names of `T`'s schema and weakly typed:
    /// `"42"` decodes into an integer field, `"true"` into a bool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for the first value that cannot be coerced,
    /// or [`Error::Deserialize`] when the coerced tree does not fit `T`.
    pub fn unmarshal<T: ConfigSchema>(&self) -> Result<T> {
        decode::decode(&self.all_settings())
    }

    /// Decode the merged settings into an existing value
    ///
    /// The target is replaced only when decoding succeeds.
    pub fn unmarshal_into<T: ConfigSchema>(&self, target: &mut T) -> Result<()> {
        *target = self.unmarshal()?;
        Ok(())
    }
}

fn insert_flattened(layer: &mut BTreeMap<String, Value>, key: &str, value: &Value) {
    let key = normalize(key);
    match value {
        Value::Object(map) if !map.is_empty() => {
            let mut leaves = BTreeMap::new();
            keys::flatten_into(&key, value, &mut leaves);
            layer.extend(leaves);
        }
        _ => {
            layer.insert(key, value.clone());
        }
    }
}

fn validate_flag_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidFlag {
            name: name.to_string(),
            reason: "name is empty".to_string(),
        });
    }
    let pattern = FLAG_NAME
        .as_ref()
        .map_err(|e| Error::Config(format!("Invalid flag name pattern: {e}")))?;
    if !pattern.is_match(name) {
        return Err(Error::InvalidFlag {
            name: name.to_string(),
            reason: "expected dot-separated segments of letters, digits, '_' and '-'".to_string(),
        });
    }
    Ok(())
}
