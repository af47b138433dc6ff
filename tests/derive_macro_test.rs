//! Integration tests for cfgbind-derive macro
//!
//! Tests the `#[derive(DeriveConfigSchema)]` macro with various attribute combinations.

use cfgbind::{ConfigSchema, DeriveConfigSchema, FieldKind, Manager, MapEnvSource};
use serde::{Deserialize, Serialize};

// =============================================================================
// Basic Derive Tests
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize, DeriveConfigSchema)]
struct Database {
    #[config(name = "max-conns", description = "Connection pool size", short = 'm')]
    max_conns: u16,

    #[config(name = "url", short = "u")]
    url: String,

    #[config(name = "readonly")]
    readonly: bool,
}

#[test]
fn test_basic_derive() {
    let fields = Database::fields();
    assert_eq!(fields.len(), 3);

    assert_eq!(fields[0].key, "max_conns");
    assert_eq!(fields[0].name, "max-conns");
    assert_eq!(fields[0].description, "Connection pool size");
    assert_eq!(fields[0].short, Some('m'));
    assert!(matches!(fields[0].kind, FieldKind::Int));

    assert_eq!(fields[1].short, Some('u'));
    assert!(matches!(fields[1].kind, FieldKind::String));
    assert!(matches!(fields[2].kind, FieldKind::Bool));
}

// =============================================================================
// Nested Struct Tests
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize, DeriveConfigSchema)]
struct Logging {
    #[config(name = "log-level")]
    level: String,
}

#[derive(Debug, Default, Serialize, Deserialize, DeriveConfigSchema)]
struct AppConfig {
    #[config(name = "database")]
    database: Database,

    /// Unnamed: flattened into the root
    logging: Logging,

    #[config(name = "debug", short = 'd')]
    debug: bool,

    /// Unnamed scalar: not bound
    note: String,

    #[config(skip)]
    weights: Vec<f64>,

    #[serde(rename = "listen-port")]
    #[config(name = "port")]
    port: i64,
}

#[test]
fn test_nested_derive() {
    let fields = AppConfig::fields();
    let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["database", "", "debug", "", "port"]);

    assert!(fields[0].kind.is_nested());
    assert!(fields[1].kind.is_nested());
    assert_eq!(fields[4].key, "listen-port");
}

#[test]
fn test_derived_schema_binds_and_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = Manager::builder("app")
        .env_prefix("APP")
        .config_path(dir.path())
        .env_source(
            MapEnvSource::new()
                .with("APP_DATABASE_MAX_CONNS", "42")
                .with("APP_LOG_LEVEL", "debug")
                .with("APP_PORT", "8080"),
        )
        .build();
    manager.init_flags::<AppConfig>().unwrap();

    let names: Vec<&str> = manager
        .flags()
        .definitions()
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "database.max-conns",
            "database.url",
            "database.readonly",
            "log-level",
            "debug",
            "port",
        ]
    );

    manager.parse_flags(["app", "-u", "pg://cli", "-d"]).unwrap();
    let config: AppConfig = manager.unmarshal().unwrap();

    assert_eq!(config.database.max_conns, 42);
    assert_eq!(config.database.url, "pg://cli");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.port, 8080);
    assert!(config.debug);
    assert!(config.weights.is_empty());
}

// =============================================================================
// Serde Renames
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize, DeriveConfigSchema)]
#[serde(rename_all = "kebab-case")]
struct KebabDatabase {
    #[config(name = "max-conns")]
    max_conns: u32,

    #[serde(rename = "dsn")]
    #[config(name = "url")]
    connection_url: String,
}

#[derive(Debug, Default, Serialize, Deserialize, DeriveConfigSchema)]
#[serde(rename_all = "camelCase")]
struct RenamedConfig {
    #[config(name = "database")]
    database: KebabDatabase,

    #[config(name = "read-only")]
    read_only: bool,
}

#[test]
fn test_rename_all_sets_keys() {
    let fields = KebabDatabase::fields();
    assert_eq!(fields[0].key, "max-conns");
    assert_eq!(fields[1].key, "dsn");

    let fields = RenamedConfig::fields();
    assert_eq!(fields[0].key, "database");
    assert_eq!(fields[1].key, "readOnly");
}

#[test]
fn test_rename_all_struct_decodes_env_and_flags() {
    let mut manager = Manager::builder("app")
        .env_prefix("APP")
        .env_source(
            MapEnvSource::new()
                .with("APP_DATABASE_MAX_CONNS", "42")
                .with("APP_DATABASE_URL", "pg://env"),
        )
        .build();
    manager.init_flags::<RenamedConfig>().unwrap();
    manager.parse_flags(["app", "--read-only"]).unwrap();

    let config: RenamedConfig = manager.unmarshal().unwrap();
    assert_eq!(config.database.max_conns, 42);
    assert_eq!(config.database.connection_url, "pg://env");
    assert!(config.read_only);
}

// =============================================================================
// Path-qualified Types
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize, DeriveConfigSchema)]
struct Qualified {
    #[config(name = "host")]
    host: std::string::String,

    #[config(name = "port")]
    port: core::primitive::u32,

    #[config(name = "verbose")]
    verbose: ::std::primitive::bool,
}

#[test]
fn test_path_qualified_scalars_bind() {
    let fields = Qualified::fields();
    assert!(matches!(fields[0].kind, FieldKind::String));
    assert!(matches!(fields[1].kind, FieldKind::Int));
    assert!(matches!(fields[2].kind, FieldKind::Bool));

    let mut manager = Manager::builder("app")
        .env_prefix("APP")
        .env_source(MapEnvSource::new().with("APP_PORT", "8443"))
        .build();
    manager.init_flags::<Qualified>().unwrap();
    manager
        .parse_flags(["app", "--host", "example.org", "--verbose"])
        .unwrap();

    let config: Qualified = manager.unmarshal().unwrap();
    assert_eq!(config.host, "example.org");
    assert_eq!(config.port, 8443);
    assert!(config.verbose);
}

// =============================================================================
// Unsupported Types
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize, DeriveConfigSchema)]
struct Limits {
    #[config(name = "ratio")]
    ratio: f64,
}

#[derive(Debug, Default, Serialize, Deserialize, DeriveConfigSchema)]
struct Tagged {
    #[config(name = "tags")]
    tags: Vec<String>,
}

#[test]
fn test_unsupported_types_fail_init() {
    let fields = Limits::fields();
    assert!(matches!(fields[0].kind, FieldKind::Unsupported("f64")));

    let mut manager = Manager::new("app", "APP");
    let err = manager.init_flags::<Limits>().unwrap_err();
    assert!(err.is_schema_error());
    assert!(err.to_string().contains("ratio"));

    let err = manager.init_flags::<Tagged>().unwrap_err();
    assert!(err.to_string().contains("Vec<String>"));
    assert!(manager.flags().is_empty());
}
