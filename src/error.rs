//! Error types for cfgbind

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cfgbind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cfgbind
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse config file '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to render config: {0}")]
    Render(String),

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported type '{type_name}' for config field '{field}'")]
    UnsupportedFieldKind { field: String, type_name: String },

    #[error("Invalid flag '{name}': {reason}")]
    InvalidFlag { name: String, reason: String },

    #[error("Flag '{name}' conflicts with '{other}': {reason}")]
    FlagConflict {
        name: String,
        other: String,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Flag Parsing Errors
    // -------------------------------------------------------------------------
    #[error(transparent)]
    Flags(#[from] clap::Error),

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    #[error("Cannot decode '{key}': expected {expected}, found {found}")]
    Decode {
        key: String,
        expected: String,
        found: String,
    },

    #[error("Failed to decode settings: {0}")]
    Deserialize(String),

    // -------------------------------------------------------------------------
    // Logging Context Errors
    // -------------------------------------------------------------------------
    #[error("Cannot attach a nil logger to a log context")]
    NilLogger,

    #[error("No logger in log context")]
    MissingLogger,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error comes from a broken schema or flag definition.
    ///
    /// These are programmer mistakes and should abort startup.
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFieldKind { .. }
                | Error::InvalidFlag { .. }
                | Error::FlagConflict { .. }
        )
    }

    /// Check if this is a "file not found" error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::FileRead { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Check if this is a decode error raised by `unmarshal`
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Error::Decode { .. } | Error::Deserialize(_))
    }
}

// =============================================================================
// Filesystem Helper Functions
// =============================================================================

use std::path::Path;

/// Create a directory (and parents) with proper error handling
pub fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read a file to a string with proper error handling
pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}
