//! Core configuration types and traits
//!
//! This module contains the foundational types for binding:
//! - `ConfigSchema` - Trait for describing a configuration as a field tree
//! - `Field` / `FieldKind` - Field descriptors walked into flags
//! - `BinderConfig` - Name, env prefix, search paths and format of one configuration

mod schema;
mod types;

pub use schema::{ConfigSchema, Field, FieldKind, SKIP_NAME};

pub use types::{
    BinderConfig, BinderConfigBuilder, DefaultEnvSource, EnvSource, MapEnvSource,
    default_config_paths,
};
