//! Configuration schema trait and field descriptors
//!
//! # Overview
//!
//! A configuration schema is a static tree of [`Field`]s. Each scalar field
//! becomes one command-line flag, one environment variable and one config
//! file key; each nested field contributes a name segment to the dotted keys
//! of its children.
//!
//! Schemas are normally generated with `#[derive(ConfigSchema)]`, but they
//! can be written by hand:
//!
//! ```rust
//! use cfgbind::{ConfigSchema, Field, FieldKind, fields};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Database {
//!     max_conns: i64,
//!     url: String,
//! }
//!
//! impl ConfigSchema for Database {
//!     fn fields() -> Vec<Field> {
//!         fields![
//!             Field::int("max_conns", "max-conns").description("Connection pool size"),
//!             Field::string("url", "url").description("Database URL").short('u'),
//!         ]
//!     }
//! }
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct AppConfig {
//!     database: Database,
//!     debug: bool,
//! }
//!
//! impl ConfigSchema for AppConfig {
//!     fn fields() -> Vec<Field> {
//!         fields![
//!             Field::nested::<Database>("database", "database"),
//!             Field::bool("debug", "debug").description("Enable debug output"),
//!         ]
//!     }
//! }
//!
//! // Keys: database.max-conns, database.url, debug
//! assert_eq!(AppConfig::fields().len(), 2);
//! ```
//!
//! # Naming Rules
//!
//! - A scalar field with an empty name, or the sentinel `"-"`, is skipped.
//! - A nested field is always walked. When its name is empty (or `"-"`) its
//!   children are flattened into the parent's namespace.

use serde::{Serialize, de::DeserializeOwned};
use std::fmt;

/// Name that marks a field as "not part of the configuration".
pub const SKIP_NAME: &str = "-";

// =============================================================================
// Field Kinds
// =============================================================================

/// Kind of a schema field
#[derive(Clone, Copy)]
pub enum FieldKind {
    /// Text value
    String,
    /// Boolean value
    Bool,
    /// Integer value (any Rust integer width)
    Int,
    /// Nested structure, walked recursively
    Nested(fn() -> Vec<Field>),
    /// A type the binder cannot represent as a flag.
    ///
    /// Carried through so the walk can fail with the offending type name.
    Unsupported(&'static str),
}

impl FieldKind {
    /// Nested kind for a type implementing [`ConfigSchema`]
    #[must_use]
    pub fn nested<T: ConfigSchema>() -> Self {
        FieldKind::Nested(T::fields)
    }

    /// Whether this kind is walked into rather than bound as a flag
    #[must_use]
    pub fn is_nested(&self) -> bool {
        matches!(self, FieldKind::Nested(_))
    }

    /// Short human-readable kind name
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Nested(_) => "struct",
            FieldKind::Unsupported(name) => name,
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Nested(children) => f
                .debug_tuple("Nested")
                .field(&children().len())
                .finish(),
            FieldKind::Unsupported(name) => f.debug_tuple("Unsupported").field(name).finish(),
            other => f.write_str(other.type_name()),
        }
    }
}

// =============================================================================
// Field
// =============================================================================

/// One field of a configuration schema
#[derive(Debug, Clone)]
pub struct Field {
    /// Serialized member name of the Rust field (its serde key)
    pub key: &'static str,
    /// Configuration name used for flags, env vars and file keys
    pub name: &'static str,
    /// Help text
    pub description: &'static str,
    /// Optional single-character flag alias
    pub short: Option<char>,
    /// Field kind
    pub kind: FieldKind,
}

impl Field {
    /// Create a field of any kind
    #[must_use]
    pub fn new(key: &'static str, name: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            name,
            description: "",
            short: None,
            kind,
        }
    }

    /// Create a string field
    #[must_use]
    pub fn string(key: &'static str, name: &'static str) -> Self {
        Self::new(key, name, FieldKind::String)
    }

    /// Create a boolean field
    #[must_use]
    pub fn bool(key: &'static str, name: &'static str) -> Self {
        Self::new(key, name, FieldKind::Bool)
    }

    /// Create an integer field
    #[must_use]
    pub fn int(key: &'static str, name: &'static str) -> Self {
        Self::new(key, name, FieldKind::Int)
    }

    /// Create a nested field whose children come from `T`
    #[must_use]
    pub fn nested<T: ConfigSchema>(key: &'static str, name: &'static str) -> Self {
        Self::new(key, name, FieldKind::nested::<T>())
    }

    /// Set the help text
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Set the single-character flag alias
    #[must_use]
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Whether the field's name opts it out of the configuration
    #[must_use]
    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty() || self.name == SKIP_NAME
    }
}

// =============================================================================
// Config Schema Trait
// =============================================================================

/// Trait for types that describe a configuration schema
///
/// The bounds match what `unmarshal` needs: `Default` and `Serialize` give
/// the baseline for fields outside the schema, `Deserialize` builds the
/// final value.
pub trait ConfigSchema: Default + Serialize + DeserializeOwned {
    /// Get the top-level fields of this schema
    fn fields() -> Vec<Field>;
}

/// Macro for building a field list
///
/// # Example
/// ```rust
/// use cfgbind::{Field, fields};
///
/// let list = fields![
///     Field::string("host", "host").description("Bind address"),
///     Field::int("port", "port").short('p'),
/// ];
/// assert_eq!(list.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    ($($field:expr),* $(,)?) => {
        vec![$($field),*]
    };
}
