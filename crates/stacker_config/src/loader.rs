//! Blueprint file loading and key validation.

use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use stacker_common::{FunctionalError, StackerResult, TechnicalError};

use crate::layout::{resolve_layout, ProjectLayout};
use crate::resolve::{resolve_variables, ResolveOptions};
use crate::types::{keys, Blueprint, Profile};

/// Keys every configuration must define as strings.
const MANDATORY_STRING_KEYS: &[&str] = &[
    keys::BINARY,
    keys::BUILD,
    keys::INCLUDE,
    keys::SOURCES,
    keys::OUTPUT,
];

/// Optional keys that must hold a list of strings when present.
const OPTIONAL_LIST_KEYS: &[&str] = &[keys::FLAGS, keys::LIBRARIES];

/// Optional keys that must hold a string when present.
const OPTIONAL_STRING_KEYS: &[&str] = &[keys::COMPILER];

/// Reads and parses the blueprint file at `path`.
pub fn load_blueprint(path: &Path) -> StackerResult<Blueprint> {
    let content = std::fs::read_to_string(path).map_err(|source| TechnicalError::BlueprintRead {
        path: path.to_path_buf(),
        source,
    })?;
    load_blueprint_from_str(&content, path)
}

/// Parses a blueprint from a string. `origin` only names the source in errors.
pub fn load_blueprint_from_str(content: &str, origin: &Path) -> StackerResult<Blueprint> {
    let blueprint: Blueprint =
        toml::from_str(content).map_err(|e| TechnicalError::BlueprintParse {
            path: origin.to_path_buf(),
            reason: e.message().trim().to_string(),
        })?;
    if blueprint.profiles.is_empty() {
        return Err(TechnicalError::EmptyBlueprint(origin.to_path_buf()).into());
    }
    Ok(blueprint)
}

/// Checks presence and type of the well-known keys of a configuration.
///
/// Runs before variable resolution, so string values may still hold
/// `${name}` tokens.
pub fn validate_keys(profile: &Profile) -> StackerResult<()> {
    for key in MANDATORY_STRING_KEYS {
        string_key(profile, key)?;
    }
    for key in OPTIONAL_LIST_KEYS {
        optional_list_key(profile, key)?;
    }
    for key in OPTIONAL_STRING_KEYS {
        optional_string_key(profile, key)?;
    }
    Ok(())
}

/// Loads the blueprint at `path`, selects `profile_name`, resolves its
/// variables and adapts it into a [`ProjectLayout`] rooted at the blueprint's
/// directory.
#[instrument(skip(options), fields(max_depth = options.max_depth))]
pub fn load_project(
    path: &Path,
    profile_name: &str,
    options: &ResolveOptions,
) -> StackerResult<ProjectLayout> {
    let mut profile = load_blueprint(path)?.take_profile(profile_name)?;
    validate_keys(&profile)?;
    resolve_variables(&mut profile, options)?;
    debug!(?profile, "configuration resolved");

    let root = project_root(path)?;
    resolve_layout(&root, &profile)
}

fn project_root(blueprint: &Path) -> Result<PathBuf, TechnicalError> {
    let parent = match blueprint.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent
        .canonicalize()
        .map_err(|e| TechnicalError::io(parent, e))
}

pub(crate) fn string_key<'a>(profile: &'a Profile, key: &str) -> Result<&'a str, FunctionalError> {
    match profile.get(key) {
        None => Err(FunctionalError::MissingKey(key.to_string())),
        Some(value) => value.as_str().ok_or_else(|| FunctionalError::WrongKeyType {
            key: key.to_string(),
            expected: "a string",
        }),
    }
}

pub(crate) fn optional_string_key<'a>(
    profile: &'a Profile,
    key: &str,
) -> Result<Option<&'a str>, FunctionalError> {
    match profile.get(key) {
        None => Ok(None),
        Some(_) => string_key(profile, key).map(Some),
    }
}

pub(crate) fn optional_list_key<'a>(
    profile: &'a Profile,
    key: &str,
) -> Result<Vec<&'a str>, FunctionalError> {
    match profile.get(key) {
        None => Ok(Vec::new()),
        Some(value) => value
            .as_string_list()
            .ok_or_else(|| FunctionalError::WrongKeyType {
                key: key.to_string(),
                expected: "a list of strings",
            }),
    }
}
