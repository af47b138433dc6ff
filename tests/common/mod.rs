//! Common test utilities for cfgbind integration tests
//!
//! Provides a shared configuration schema, an in-memory environment and a
//! temp config directory per test.

#![allow(dead_code)]

use cfgbind::{ConfigSchema, Field, Manager, MapEnvSource};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::TempDir;

// =============================================================================
// Test Configuration Schema
// =============================================================================

/// Application configuration covering every field kind and naming rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TestConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub debug: bool,
    /// Not part of the configuration
    pub build_tag: String,
}

impl ConfigSchema for TestConfig {
    fn fields() -> Vec<Field> {
        vec![
            Field::nested::<DatabaseConfig>("database", "database"),
            Field::nested::<ServerConfig>("server", "server"),
            // Unnamed nested: its fields live at the root
            Field::nested::<LoggingConfig>("logging", ""),
            Field::bool("debug", "debug")
                .description("Enable debug output")
                .short('d'),
            Field::string("build_tag", "-"),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DatabaseConfig {
    pub max_conns: u32,
    pub url: String,
}

impl ConfigSchema for DatabaseConfig {
    fn fields() -> Vec<Field> {
        vec![
            Field::int("max_conns", "max-conns")
                .description("Connection pool size")
                .short('m'),
            Field::string("url", "url").description("Database URL"),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: i64,
    pub tls: TlsConfig,
}

impl ConfigSchema for ServerConfig {
    fn fields() -> Vec<Field> {
        vec![
            Field::string("host", "host").description("Bind address"),
            Field::int("port", "port").description("Listen port").short('p'),
            Field::nested::<TlsConfig>("tls", "tls"),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TlsConfig {
    pub enabled: bool,
    pub cert: String,
}

impl ConfigSchema for TlsConfig {
    fn fields() -> Vec<Field> {
        vec![
            Field::bool("enabled", "enabled"),
            Field::string("cert", "cert"),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    pub level: String,
}

impl ConfigSchema for LoggingConfig {
    fn fields() -> Vec<Field> {
        vec![Field::string("level", "log-level").description("Log level")]
    }
}

/// Every flag the schema produces, in walk order
pub const TEST_FLAGS: &[&str] = &[
    "database.max-conns",
    "database.url",
    "server.host",
    "server.port",
    "server.tls.enabled",
    "server.tls.cert",
    "log-level",
    "debug",
];

// =============================================================================
// Helper Functions
// =============================================================================

/// Create a temp dir for config files
pub fn create_temp_dir() -> TempDir {
    let _ = env_logger::builder().is_test(true).try_init();
    TempDir::new().expect("Failed to create temp dir")
}

/// Write a config file into `dir`
pub fn write_config(dir: &Path, file_name: &str, content: &str) {
    std::fs::write(dir.join(file_name), content).expect("Failed to write config file");
}

/// Create a manager named "app" with env prefix "APP", searching only `dir`
pub fn create_manager(dir: &Path, env: MapEnvSource) -> Manager {
    Manager::builder("app")
        .env_prefix("APP")
        .config_path(dir)
        .env_source(env)
        .build()
}

/// Create a manager with the test schema's flags already registered
pub fn create_test_manager(dir: &Path, env: MapEnvSource) -> Manager {
    let mut manager = create_manager(dir, env);
    manager
        .init_flags::<TestConfig>()
        .expect("Failed to register test flags");
    manager
}
