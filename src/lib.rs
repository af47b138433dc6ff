//! # cfgbind - Configuration Binder
//!
//! Bind one statically described configuration schema to command-line flags,
//! environment variables and a config file, then decode the merged result
//! into a typed structure.
//!
//! ## Features
//!
//! - **Schema Walk**: Every named scalar field becomes a `--dotted.name` flag
//! - **Layered Settings**: flag defaults < defaults < config file < environment < flags < overrides
//! - **Environment Binding**: `database.max-conns` under prefix `APP` reads `APP_DATABASE_MAX_CONNS`
//! - **Weak Decoding**: `"42"` from the environment decodes into an integer field
//! - **Config Formats**: YAML by default, JSON, and TOML behind the `toml` feature
//! - **Built-in Commands**: `version` and `config` subcommands for clap applications
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cfgbind::{DeriveConfigSchema, Manager};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize, DeriveConfigSchema)]
//! struct Database {
//!     #[config(name = "max-conns", description = "Connection pool size", short = 'm')]
//!     max_conns: u32,
//!     #[config(name = "url", description = "Database URL")]
//!     url: String,
//! }
//!
//! #[derive(Default, Serialize, Deserialize, DeriveConfigSchema)]
//! struct AppConfig {
//!     #[config(name = "database")]
//!     database: Database,
//!     #[config(name = "debug", description = "Enable debug output")]
//!     debug: bool,
//! }
//!
//! # fn main() -> cfgbind::Result<()> {
//! let mut manager = Manager::new("app", "APP");
//! manager.init_flags::<AppConfig>()?;
//! manager.read_in_config()?;
//! manager.parse_flags(std::env::args_os())?;
//!
//! let config: AppConfig = manager.unmarshal()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Naming
//!
//! The same dotted name addresses a value in every source:
//!
//! | Source      | `database.max-conns` with prefix `APP` |
//! |-------------|----------------------------------------|
//! | Flag        | `--database.max-conns`, `-m`           |
//! | Environment | `APP_DATABASE_MAX_CONNS`               |
//! | Config file | `database: { max-conns: 10 }`          |
//!
//! Keys are case-insensitive. An absent config file is not an error.

// Core modules
mod error;
mod manager;
pub mod flags;
pub mod storage;
pub mod walker;

// Grouped modules
pub mod commands;
pub mod config;
pub mod logging;
pub mod store;

// Re-exports from core
pub use error::{Error, Result};
pub use flags::{FlagDefinition, FlagKind, FlagSet};
pub use manager::{Manager, ManagerBuilder};
pub use storage::{ConfigFormat, JsonFormat, YamlFormat};
pub use store::{Layer, SettingsStore};
pub use walker::walk;

#[cfg(feature = "toml")]
pub use storage::TomlFormat;

// Re-exports from config
pub use config::{
    BinderConfig, BinderConfigBuilder, ConfigSchema, DefaultEnvSource, EnvSource, Field,
    FieldKind, MapEnvSource, SKIP_NAME,
};

pub use commands::BuildInfo;
pub use logging::{LogContext, Logger, new_logger};

// Derive macro re-export (requires `derive` feature)
/// Derive macro for generating `ConfigSchema` implementations.
///
/// # Example
///
/// ```rust
/// use cfgbind::{ConfigSchema, DeriveConfigSchema};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize, DeriveConfigSchema)]
/// struct Server {
///     #[config(name = "port", short = 'p')]
///     port: u16,
/// }
///
/// assert_eq!(Server::fields()[0].name, "port");
/// ```
#[cfg(feature = "derive")]
pub use cfgbind_derive::ConfigSchema as DeriveConfigSchema;
