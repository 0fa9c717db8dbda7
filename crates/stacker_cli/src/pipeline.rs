//! Shared steps of the `build` and `clean` commands.

use std::path::Path;

use stacker_common::StackerResult;
use stacker_config::{load_project, ProjectLayout, ResolveOptions};

use crate::console::Console;
use crate::GlobalArgs;

/// Loads the selected configuration of the blueprint and resolves it into a
/// project layout.
pub fn load_layout(global: &GlobalArgs, console: &Console) -> StackerResult<ProjectLayout> {
    let section = console.section("Loading configuration...");
    console.info(&format!(
        "Configuration \"{}\" from {}",
        global.profile,
        global.blueprint.display()
    ));
    let options = ResolveOptions {
        max_depth: global.max_depth,
    };
    let layout = load_project(&global.blueprint, &global.profile, &options)?;
    section.finish("Configuration loaded");
    Ok(layout)
}

/// `path` relative to the project root, for display.
pub fn relative<'a>(layout: &ProjectLayout, path: &'a Path) -> &'a Path {
    path.strip_prefix(&layout.root).unwrap_or(path)
}
