// Server configuration example for cfgbind
//
// Run with: cargo run --example server -- --server.port 9000
//           APP_DATABASE_MAX_CONNS=42 cargo run --example server
//           cargo run --example server -- config

use cfgbind::{DeriveConfigSchema, LogContext, Manager, build_info, commands, new_logger};
use clap::Command;
use log::{Level, Record};
use serde::{Deserialize, Serialize};

// =============================================================================
// Configuration defined using the derive macro
// =============================================================================

/// Database connection settings
#[derive(Debug, Default, Serialize, Deserialize, DeriveConfigSchema)]
pub struct DatabaseConfig {
    #[config(name = "max-conns", description = "Connection pool size", short = 'm')]
    pub max_conns: u32,

    #[config(name = "url", description = "Database URL")]
    pub url: String,
}

/// HTTP listener settings
#[derive(Debug, Serialize, Deserialize, DeriveConfigSchema)]
pub struct ServerConfig {
    #[config(name = "host", description = "Bind address")]
    pub host: String,

    #[config(name = "port", description = "Listen port", short = 'p')]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, DeriveConfigSchema)]
pub struct AppConfig {
    #[config(name = "database")]
    pub database: DatabaseConfig,

    #[config(name = "server")]
    pub server: ServerConfig,

    #[config(name = "debug", description = "Enable debug output", short = 'd')]
    pub debug: bool,
}

fn main() -> cfgbind::Result<()> {
    let ctx = LogContext::with_logger(Some(new_logger()))?;
    let logger = ctx.logger()?;

    let mut manager = Manager::new("app", "APP");
    manager.init_flags::<AppConfig>()?;

    // Defaults for values the zero flag defaults would otherwise hide
    manager.store_mut().set_default("server.host", "127.0.0.1".into());
    manager.store_mut().set_default("server.port", 8080.into());

    let root = manager.augment(
        Command::new("app")
            .about("Example server bound to cfgbind")
            .subcommand(commands::version_command())
            .subcommand(commands::config_command()),
    );
    let matches = match root.try_get_matches() {
        Ok(matches) => matches,
        Err(e) => e.exit(),
    };

    manager.bind_matches(&matches);
    if let Some(path) = manager.read_in_config()? {
        println!("Using config file {}", path.display());
    }

    if commands::dispatch(&matches, "app", &build_info!(), &manager, &mut std::io::stdout())? {
        return Ok(());
    }

    let config: AppConfig = manager.unmarshal()?;
    logger.log(
        &Record::builder()
            .level(Level::Info)
            .args(format_args!(
                "listening on {}:{}",
                config.server.host, config.server.port
            ))
            .build(),
    );

    println!("{config:#?}");
    Ok(())
}
