//! Environment variable handling for settings
//!
//! Helper struct to encapsulate key-to-variable naming and lookups.

use crate::config::EnvSource;
use serde_json::Value;
use std::sync::Arc;

/// Handles environment variable lookups
pub struct EnvironmentHandler {
    prefix: String,
    enabled: bool,
    source: Arc<dyn EnvSource>,
}

impl EnvironmentHandler {
    pub fn new(prefix: impl Into<String>, enabled: bool, source: Arc<dyn EnvSource>) -> Self {
        Self {
            prefix: prefix.into(),
            enabled,
            source,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get the environment variable name for a setting key
    ///
    /// Format: {PREFIX}_{KEY} with `.` and `-` turned into `_`, all uppercase.
    /// Without a prefix the bare transliterated key is used.
    pub fn var_name(&self, key: &str) -> String {
        let env_key = key.replace(['.', '-'], "_").to_uppercase();
        if self.prefix.is_empty() {
            env_key
        } else {
            format!("{}_{}", self.prefix.to_uppercase(), env_key)
        }
    }

    /// Look up a setting in the environment
    ///
    /// Values come back as strings; an empty variable still counts as set.
    /// Typing happens when settings are decoded.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        self.source.var(&self.var_name(key)).ok().map(Value::String)
    }
}
