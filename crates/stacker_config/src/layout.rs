//! Adaptation of a resolved configuration into concrete project paths.

use std::path::{Path, PathBuf};
use tracing::warn;

use stacker_common::{FunctionalError, StackerResult, TechnicalError};

use crate::loader::{optional_list_key, optional_string_key, string_key};
use crate::types::{keys, Profile};

/// Compiler used when the configuration names none.
pub const DEFAULT_COMPILER: &str = "g++";

/// File name of the build cache inside the build directory.
pub const CACHE_FILE_NAME: &str = "stacker_cache.json";

/// The typed, absolute project layout derived from a resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Directory holding the blueprint; relative paths are joined onto it.
    pub root: PathBuf,
    /// Directory receiving the linked executable.
    pub binary_dir: PathBuf,
    /// Directory receiving object files and the cache.
    pub build_dir: PathBuf,
    /// Include directory.
    pub include_dir: PathBuf,
    /// Source directory.
    pub sources_dir: PathBuf,
    /// Executable file name.
    pub output: String,
    /// Extra compilation flags, without duplicates.
    pub flags: Vec<String>,
    /// Libraries to link against, without duplicates.
    pub libraries: Vec<String>,
    /// Compiler program.
    pub compiler: String,
}

impl ProjectLayout {
    /// Full path of the linked executable.
    pub fn executable(&self) -> PathBuf {
        self.binary_dir.join(&self.output)
    }

    /// Full path of the build cache document.
    pub fn cache_file(&self) -> PathBuf {
        self.build_dir.join(CACHE_FILE_NAME)
    }
}

/// Turns a validated, fully resolved `profile` into a [`ProjectLayout`].
///
/// Paths are joined onto `root`. The include and source directories must
/// exist; the binary and build directories are created when missing.
pub fn resolve_layout(root: &Path, profile: &Profile) -> StackerResult<ProjectLayout> {
    let output = string_key(profile, keys::OUTPUT)?;
    check_output_name(output)?;

    let include_dir = root.join(string_key(profile, keys::INCLUDE)?);
    let sources_dir = root.join(string_key(profile, keys::SOURCES)?);
    for dir in [&include_dir, &sources_dir] {
        if !dir.is_dir() {
            return Err(TechnicalError::FolderNotFound(dir.clone()).into());
        }
    }

    let binary_dir = root.join(string_key(profile, keys::BINARY)?);
    let build_dir = root.join(string_key(profile, keys::BUILD)?);
    for dir in [&binary_dir, &build_dir] {
        ensure_dir(dir)?;
    }

    Ok(ProjectLayout {
        root: root.to_path_buf(),
        binary_dir,
        build_dir,
        include_dir,
        sources_dir,
        output: output.to_string(),
        flags: dedup(optional_list_key(profile, keys::FLAGS)?),
        libraries: dedup(optional_list_key(profile, keys::LIBRARIES)?),
        compiler: optional_string_key(profile, keys::COMPILER)?
            .unwrap_or(DEFAULT_COMPILER)
            .to_string(),
    })
}

fn check_output_name(output: &str) -> Result<(), FunctionalError> {
    let invalid = output.is_empty()
        || output == "."
        || output == ".."
        || output.contains(['/', '\\']);
    if invalid {
        return Err(FunctionalError::InvalidOutputName(output.to_string()));
    }
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), TechnicalError> {
    if dir.is_dir() {
        return Ok(());
    }
    warn!("folder \"{}\" is nonexistent, creating it", dir.display());
    std::fs::create_dir_all(dir).map_err(|e| TechnicalError::io(dir, e))
}

/// Removes repeated entries, keeping the first occurrence of each.
fn dedup(items: Vec<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}
