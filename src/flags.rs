//! Flag definitions and the flag set
//!
//! A [`FlagSet`] is the registration surface for flags produced by the schema
//! walk. It renders into a [`clap::Command`] for parsing and reads the
//! explicitly-given values back out of [`clap::ArgMatches`].

use crate::error::{Error, Result};
use clap::builder::BoolishValueParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::debug;
use serde_json::Value;

/// Long and short names owned by clap's generated help flag
const HELP_LONG: &str = "help";
const HELP_SHORT: char = 'h';

// =============================================================================
// Flag Kind
// =============================================================================

/// Value type of a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    String,
    Bool,
    Int,
}

impl FlagKind {
    /// The kind's zero value, used as every flag's default
    #[must_use]
    pub fn zero_value(self) -> Value {
        match self {
            FlagKind::String => Value::String(String::new()),
            FlagKind::Bool => Value::Bool(false),
            FlagKind::Int => Value::from(0_i64),
        }
    }

    /// Name shown as the flag's value placeholder
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            FlagKind::String => "string",
            FlagKind::Bool => "bool",
            FlagKind::Int => "int",
        }
    }
}

// =============================================================================
// Flag Definition
// =============================================================================

/// A materialized command-line flag derived from one schema leaf
#[derive(Debug, Clone, PartialEq)]
pub struct FlagDefinition {
    /// Fully-qualified dotted name (`database.max-conns`)
    pub name: String,
    /// Value type
    pub kind: FlagKind,
    /// Default value, always the kind's zero value
    pub default: Value,
    /// Help text
    pub description: String,
    /// Optional single-character alias
    pub short: Option<char>,
}

impl FlagDefinition {
    /// Create a definition with the kind's zero value as default
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: kind.zero_value(),
            description: String::new(),
            short: None,
        }
    }

    /// Set the help text
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the short alias
    #[must_use]
    pub fn short(mut self, short: Option<char>) -> Self {
        self.short = short;
        self
    }

    /// Build the clap argument for this flag
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .help(self.description.clone())
            .value_name(self.kind.type_name())
            .action(ArgAction::Set);

        if let Some(short) = self.short {
            arg = arg.short(short);
        }

        match self.kind {
            FlagKind::String => arg,
            // `--flag` alone means true; `--flag=false` is still accepted
            FlagKind::Bool => arg
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(BoolishValueParser::new()),
            FlagKind::Int => arg
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        }
    }

    /// Read this flag's value out of parsed matches
    ///
    /// Returns `None` unless the value was given on the command line, so
    /// unset flags never shadow lower layers. Matches from a command that
    /// never declared the flag (a parent of the subcommand carrying it, say)
    /// also yield `None`.
    pub fn value_from(&self, matches: &ArgMatches) -> Option<Value> {
        if !matches!(matches.try_contains_id(&self.name), Ok(true)) {
            return None;
        }
        if matches.value_source(&self.name) != Some(ValueSource::CommandLine) {
            return None;
        }

        match self.kind {
            FlagKind::String => matches
                .try_get_one::<String>(&self.name)
                .ok()
                .flatten()
                .map(|v| Value::String(v.clone())),
            FlagKind::Bool => matches
                .try_get_one::<bool>(&self.name)
                .ok()
                .flatten()
                .map(|v| Value::Bool(*v)),
            FlagKind::Int => matches
                .try_get_one::<i64>(&self.name)
                .ok()
                .flatten()
                .map(|v| Value::from(*v)),
        }
    }
}

// =============================================================================
// Flag Set
// =============================================================================

/// Ordered collection of flag definitions for one configuration
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    name: String,
    definitions: Vec<FlagDefinition>,
}

impl FlagSet {
    /// Create an empty flag set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: Vec::new(),
        }
    }

    /// Name of the flag set (the configuration name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered definitions, in registration order
    pub fn definitions(&self) -> &[FlagDefinition] {
        &self.definitions
    }

    /// Look up a definition by dotted name
    pub fn get(&self, name: &str) -> Option<&FlagDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Register one definition
    ///
    /// A definition with an already registered name replaces the earlier one
    /// in place. A short alias owned by another flag, or a name taken by the
    /// help flag, is a conflict.
    pub fn add(&mut self, definition: FlagDefinition) -> Result<()> {
        if definition.name == HELP_LONG {
            return Err(Error::FlagConflict {
                name: definition.name,
                other: HELP_LONG.to_string(),
                reason: "reserved for the help flag".to_string(),
            });
        }

        if let Some(short) = definition.short {
            if short == HELP_SHORT {
                return Err(Error::FlagConflict {
                    name: definition.name,
                    other: HELP_LONG.to_string(),
                    reason: format!("short alias '-{short}' is reserved for the help flag"),
                });
            }
            if let Some(owner) = self
                .definitions
                .iter()
                .find(|d| d.short == Some(short) && d.name != definition.name)
            {
                return Err(Error::FlagConflict {
                    name: definition.name,
                    other: owner.name.clone(),
                    reason: format!("short alias '-{short}' is already in use"),
                });
            }
        }

        match self
            .definitions
            .iter_mut()
            .find(|d| d.name == definition.name)
        {
            Some(existing) => {
                debug!("Flag --{} redefined", definition.name);
                *existing = definition;
            }
            None => self.definitions.push(definition),
        }
        Ok(())
    }

    /// Register several definitions, stopping at the first conflict
    pub fn extend(&mut self, definitions: impl IntoIterator<Item = FlagDefinition>) -> Result<()> {
        for definition in definitions {
            self.add(definition)?;
        }
        Ok(())
    }

    /// Add every flag to an existing command
    pub fn augment(&self, command: Command) -> Command {
        command.args(self.definitions.iter().map(FlagDefinition::to_arg))
    }

    /// A standalone command holding only these flags
    pub fn command(&self) -> Command {
        self.augment(Command::new(self.name.clone()))
    }

    /// Parse arguments (the first item is the program name)
    pub fn try_parse_from<I, T>(&self, args: I) -> Result<ArgMatches>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(self.command().try_get_matches_from(args)?)
    }

    /// Values of every flag given on the command line, keyed by dotted name
    pub fn changed_values(&self, matches: &ArgMatches) -> Vec<(String, Value)> {
        self.definitions
            .iter()
            .filter_map(|d| d.value_from(matches).map(|v| (d.name.clone(), v)))
            .collect()
    }
}
