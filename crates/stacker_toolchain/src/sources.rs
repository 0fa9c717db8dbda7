//! Source and header discovery.

use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use stacker_common::{FileKind, TechnicalError};

/// Recursively collects the files of `dir` whose extension belongs to `kind`,
/// sorted by path.
pub fn discover(dir: &Path, kind: FileKind) -> Result<Vec<PathBuf>, TechnicalError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            TechnicalError::io(path, e.into())
        })?;
        if entry.file_type().is_file() && FileKind::of(entry.path()) == Some(kind) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Checks that every file name in `files` is a plain identifier followed by
/// one of the extensions of `kind`.
pub fn validate_filenames(files: &[PathBuf], kind: FileKind) -> Result<(), TechnicalError> {
    let extensions = kind
        .extensions()
        .iter()
        .map(|ext| regex::escape(ext))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = Regex::new(&format!(r"^\w+\.(?:{extensions})$")).expect("filename regex");

    for file in files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        if !pattern.is_match(&name) {
            return Err(TechnicalError::InvalidFilename(name.into_owned()));
        }
    }
    Ok(())
}
