//! Logger handle passed through application context
//!
//! Code that needs a logger receives a [`LogContext`] instead of reaching for
//! a global. Attaching no logger, or asking an empty context for one, are
//! wiring mistakes and come back as typed errors.

use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Shared logger handle
pub type Logger = Arc<dyn log::Log>;

/// Create the default logger
///
/// An `env_logger` logger filtered by `RUST_LOG`, without module path or
/// target decoration.
pub fn new_logger() -> Logger {
    let logger = env_logger::Builder::from_default_env()
        .format_module_path(false)
        .format_target(false)
        .build();
    Arc::new(logger)
}

/// Context carrying an optional logger
#[derive(Clone, Default)]
pub struct LogContext {
    logger: Option<Logger>,
}

impl fmt::Debug for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogContext")
            .field("has_logger", &self.logger.is_some())
            .finish()
    }
}

impl LogContext {
    /// An empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// A context carrying `logger`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NilLogger`] when `logger` is `None`.
    pub fn with_logger(logger: Option<Logger>) -> Result<Self> {
        let logger = logger.ok_or(Error::NilLogger)?;
        Ok(Self {
            logger: Some(logger),
        })
    }

    /// The logger carried by this context
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingLogger`] when the context has none.
    pub fn logger(&self) -> Result<&Logger> {
        self.logger.as_ref().ok_or(Error::MissingLogger)
    }
}
