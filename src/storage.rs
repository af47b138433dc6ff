//! Config file format trait and implementations

use crate::error::{Error, Result, create_dir, read_file};
use serde_json::Value;
use std::path::Path;

/// Trait for config file formats
///
/// A format parses file contents into a `serde_json::Value` tree and renders
/// a tree back to text. YAML is the default; JSON is always available and
/// TOML sits behind the `toml` feature.
pub trait ConfigFormat: Clone + std::fmt::Debug {
    /// File extensions probed for this format, in order (e.g. `["yml", "yaml"]`)
    fn extensions(&self) -> &'static [&'static str];

    /// Parse file contents
    fn parse(&self, content: &str) -> std::result::Result<Value, String>;

    /// Render a value tree
    fn render(&self, value: &Value) -> std::result::Result<String, String>;

    /// Read and parse a file
    ///
    /// Blank files parse as an empty mapping. A root that is not a mapping
    /// is a parse error.
    fn read(&self, path: &Path) -> Result<Value> {
        let content = read_file(path)?;
        if content.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        let value = self.parse(&content).map_err(|reason| Error::Parse {
            path: path.to_path_buf(),
            reason,
        })?;

        match value {
            Value::Object(_) => Ok(value),
            Value::Null => Ok(Value::Object(serde_json::Map::new())),
            other => Err(Error::Parse {
                path: path.to_path_buf(),
                reason: format!("expected a mapping at the top level, found {}", kind_of(&other)),
            }),
        }
    }

    /// Render and write to file
    ///
    /// Uses atomic write: writes to temp file then renames to prevent corruption.
    fn write(&self, path: &Path, value: &Value) -> Result<()> {
        let content = self.render(value).map_err(Error::Render)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir(parent)?;
            }
        }

        let file_name = path.file_name().ok_or_else(|| {
            Error::Config(format!(
                "Invalid path '{}': must have a filename",
                path.display()
            ))
        })?;
        let mut temp_filename = file_name.to_os_string();
        temp_filename.push(".tmp");
        let temp_path = path.with_file_name(temp_filename);

        std::fs::write(&temp_path, &content).map_err(|e| Error::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, path).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Name of a value's JSON kind, for error messages
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

// =============================================================================
// YAML Format
// =============================================================================

/// YAML format (default), probes `<name>.yml` then `<name>.yaml`
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl YamlFormat {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigFormat for YamlFormat {
    fn extensions(&self) -> &'static [&'static str] {
        &["yml", "yaml"]
    }

    fn parse(&self, content: &str) -> std::result::Result<Value, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    fn render(&self, value: &Value) -> std::result::Result<String, String> {
        serde_yaml::to_string(value).map_err(|e| e.to_string())
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON format
#[derive(Debug, Clone, Copy)]
pub struct JsonFormat {
    /// Pretty print JSON output
    pretty: bool,
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormat {
    /// Create a JSON format with pretty printing enabled
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a compact JSON format (no pretty printing)
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl ConfigFormat for JsonFormat {
    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn parse(&self, content: &str) -> std::result::Result<Value, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    fn render(&self, value: &Value) -> std::result::Result<String, String> {
        if self.pretty {
            serde_json::to_string_pretty(value).map_err(|e| e.to_string())
        } else {
            serde_json::to_string(value).map_err(|e| e.to_string())
        }
    }
}

// =============================================================================
// TOML Format
// =============================================================================

/// TOML format
#[cfg(feature = "toml")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormat;

#[cfg(feature = "toml")]
impl TomlFormat {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "toml")]
impl ConfigFormat for TomlFormat {
    fn extensions(&self) -> &'static [&'static str] {
        &["toml"]
    }

    fn parse(&self, content: &str) -> std::result::Result<Value, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    fn render(&self, value: &Value) -> std::result::Result<String, String> {
        toml::to_string_pretty(value).map_err(|e| e.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
