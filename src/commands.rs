//! Built-in `version` and `config` subcommands
//!
//! Applications add [`version_command`] and [`config_command`] to their root
//! command and hand the parsed matches to [`dispatch`]:
//!
//! ```rust
//! use cfgbind::{Manager, build_info, commands};
//! use clap::Command;
//!
//! let manager = Manager::new("app", "APP");
//! let root = Command::new("app")
//!     .subcommand(commands::version_command())
//!     .subcommand(commands::config_command());
//!
//! let matches = root.try_get_matches_from(["app", "version"]).unwrap();
//! let mut out = Vec::new();
//! let ran = commands::dispatch(&matches, "app", &build_info!(), &manager, &mut out).unwrap();
//! assert!(ran);
//! ```

use crate::error::{Error, Result};
use crate::manager::Manager;
use crate::storage::{ConfigFormat, YamlFormat};
use clap::{ArgMatches, Command};
use std::io::Write;

/// Separator printed under each command's heading
pub const RULE: &str = "----------------";

pub const VERSION_COMMAND: &str = "version";
pub const CONFIG_COMMAND: &str = "config";

// =============================================================================
// Build Information
// =============================================================================

/// Version details shown by the `version` command
///
/// Usually created with [`build_info!`](crate::build_info), which captures the
/// calling crate's version at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub git_commit: String,
    pub build_date: String,
    /// Compiler version, when the build recorded one
    pub rustc: Option<String>,
    pub os: String,
    pub arch: String,
}

impl BuildInfo {
    /// Create build info for the current platform
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            git_commit: String::new(),
            build_date: String::new(),
            rustc: None,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    #[must_use]
    pub fn git_commit(mut self, commit: impl Into<String>) -> Self {
        self.git_commit = commit.into();
        self
    }

    #[must_use]
    pub fn build_date(mut self, date: impl Into<String>) -> Self {
        self.build_date = date.into();
        self
    }

    #[must_use]
    pub fn rustc(mut self, version: impl Into<String>) -> Self {
        self.rustc = Some(version.into());
        self
    }
}

/// Build a [`BuildInfo`] for the calling crate
///
/// Takes the version from `CARGO_PKG_VERSION` and, when they are set at
/// compile time, the commit, date and compiler version from `GIT_COMMIT`,
/// `BUILD_DATE` and `RUSTC_VERSION`.
#[macro_export]
macro_rules! build_info {
    () => {{
        let info = $crate::BuildInfo::new(env!("CARGO_PKG_VERSION"))
            .git_commit(option_env!("GIT_COMMIT").unwrap_or_default())
            .build_date(option_env!("BUILD_DATE").unwrap_or_default());
        match option_env!("RUSTC_VERSION") {
            Some(rustc) => info.rustc(rustc),
            None => info,
        }
    }};
}

// =============================================================================
// Commands
// =============================================================================

/// The `version` subcommand
pub fn version_command() -> Command {
    Command::new(VERSION_COMMAND).about("Display version information")
}

/// The `config` subcommand
pub fn config_command() -> Command {
    Command::new(CONFIG_COMMAND).about("Display raw config values")
}

/// Text printed by the `version` command
///
/// The `Rust Version` line only appears when the compiler version is known.
pub fn render_version(root: &str, info: &BuildInfo) -> String {
    let rustc = info
        .rustc
        .as_deref()
        .map(|v| format!("Rust Version: {v}\n"))
        .unwrap_or_default();
    format!(
        "{root}\n{RULE}\nVersion: {}\nGit Commit: {}\nBuild Date: {}\n{rustc}OS/Arch: {}/{}\n",
        info.version, info.git_commit, info.build_date, info.os, info.arch
    )
}

/// Text printed by the `config` command: the merged settings as YAML
pub fn render_config<F: ConfigFormat>(root: &str, manager: &Manager<F>) -> Result<String> {
    let settings = YamlFormat
        .render(&manager.all_settings_nested())
        .map_err(Error::Render)?;
    Ok(format!("{root}: Raw config values\n{RULE}\n{settings}"))
}

/// Run a built-in subcommand if one was chosen
///
/// Returns `false` when the matches name neither `version` nor `config`, so
/// the caller can carry on with its own subcommands.
pub fn dispatch<F: ConfigFormat>(
    matches: &ArgMatches,
    root: &str,
    info: &BuildInfo,
    manager: &Manager<F>,
    out: &mut impl Write,
) -> Result<bool> {
    let text = match matches.subcommand_name() {
        Some(VERSION_COMMAND) => render_version(root, info),
        Some(CONFIG_COMMAND) => render_config(root, manager)?,
        _ => return Ok(false),
    };

    out.write_all(text.as_bytes()).map_err(Error::Output)?;
    Ok(true)
}
