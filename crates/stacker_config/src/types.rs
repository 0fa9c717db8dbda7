//! Configuration types deserialized from `blueprint.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

use stacker_common::{StackerResult, TechnicalError};

/// Well-known configuration keys.
pub mod keys {
    /// Directory receiving the linked executable.
    pub const BINARY: &str = "binary";
    /// Directory receiving object files and the build cache.
    pub const BUILD: &str = "build";
    /// Optional compiler program (defaults to `g++`).
    pub const COMPILER: &str = "compiler";
    /// Optional list of extra compilation flags.
    pub const FLAGS: &str = "flags";
    /// Include directory passed with `-I`.
    pub const INCLUDE: &str = "include";
    /// Optional list of libraries passed with `-l`.
    pub const LIBRARIES: &str = "libraries";
    /// File name of the linked executable.
    pub const OUTPUT: &str = "output";
    /// Directory scanned for source files.
    pub const SOURCES: &str = "sources";
}

/// A single configuration value.
///
/// Blueprints only hold flat scalars and lists; nested tables are rejected at
/// parse time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// A string, possibly containing `${name}` references.
    Str(String),
    /// A list of values (usually strings).
    List(Vec<ConfigValue>),
    /// An integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
}

impl ConfigValue {
    /// Returns the string if this value is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the entries if this value is a list made only of strings.
    pub fn as_string_list(&self) -> Option<Vec<&str>> {
        match self {
            ConfigValue::List(items) => items.iter().map(ConfigValue::as_str).collect(),
            _ => None,
        }
    }
}

impl ConfigValue {
    /// Builds a list of strings.
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigValue::List(items.into_iter().map(|s| ConfigValue::Str(s.into())).collect())
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Str(s.to_string())
    }
}

/// One named configuration: a flat key/value mapping.
///
/// Ordered by key so that every traversal over it is reproducible.
pub type Profile = BTreeMap<String, ConfigValue>;

/// The whole blueprint file: named configurations keyed by name.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Blueprint {
    /// Every configuration defined in the file.
    pub profiles: BTreeMap<String, Profile>,
}

impl Blueprint {
    /// Removes and returns the configuration called `name`.
    pub fn take_profile(mut self, name: &str) -> StackerResult<Profile> {
        self.profiles
            .remove(name)
            .ok_or_else(|| TechnicalError::ConfigNotFound(name.to_string()).into())
    }
}
