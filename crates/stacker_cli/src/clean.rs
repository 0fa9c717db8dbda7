//! The `stacker clean` command.

use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

use stacker_common::{StackerResult, TechnicalError};
use stacker_config::ProjectLayout;

use crate::console::Console;
use crate::pipeline::{load_layout, relative};
use crate::GlobalArgs;

/// Entry point of `stacker clean`.
pub fn run(global: &GlobalArgs, console: &Console) -> StackerResult<usize> {
    let layout = load_layout(global, console)?;
    clean(&layout, console)
}

/// Empties the build and binary directories, returning how many entries were
/// removed. The directories themselves are kept.
#[instrument(skip_all, fields(root = %layout.root.display()))]
pub fn clean(layout: &ProjectLayout, console: &Console) -> StackerResult<usize> {
    let section = console.section("Cleaning...");
    let mut removed = 0;
    for dir in [&layout.build_dir, &layout.binary_dir] {
        removed += empty_dir(layout, dir, console)?;
    }
    section.finish(&format!("Removed {removed} entries"));
    Ok(removed)
}

fn empty_dir(layout: &ProjectLayout, dir: &Path, console: &Console) -> StackerResult<usize> {
    let entries = fs::read_dir(dir).map_err(|e| TechnicalError::io(dir, e))?;
    let mut paths = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TechnicalError::io(dir, e))?;
    paths.sort();

    let mut removed = 0;
    for path in paths {
        let file_type = fs::symlink_metadata(&path)
            .map_err(|e| TechnicalError::io(&path, e))?
            .file_type();
        let result = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else if file_type.is_file() || file_type.is_symlink() {
            fs::remove_file(&path)
        } else {
            console.warn(&format!(
                "Skipping {}: not a file or directory",
                relative(layout, &path).display()
            ));
            continue;
        };
        result.map_err(|source| TechnicalError::RemovalFailed {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "removed");
        console.info(&format!("Removed {}", relative(layout, &path).display()));
        removed += 1;
    }
    Ok(removed)
}
