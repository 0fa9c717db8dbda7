//! The `stacker build` command.
//!
//! Runs the whole pass: source checks, recipe extraction, staleness
//! evaluation, parallel compilation of the stale sources, link, and finally
//! the cache write. Any failure aborts the pass before the cache is touched.

use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{info, instrument};

use stacker_cache::{evaluate, BuildCache, FileState, RecipeSet, Reference};
use stacker_common::{FileKind, StackerResult, TechnicalError};
use stacker_config::ProjectLayout;
use stacker_toolchain::{
    discover, extract_recipes, object_name, validate_filenames, CompileJob, GccToolchain, LinkJob,
    Toolchain,
};

use crate::console::Console;
use crate::pipeline::{load_layout, relative};
use crate::GlobalArgs;

/// What a build pass did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Sources that were compiled, in path order.
    pub compiled: Vec<PathBuf>,
    /// Whether the executable was linked.
    pub linked: bool,
}

/// Per-pass build settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Compare against the build cache (`true`) or the object files (`false`).
    pub use_cache: bool,
}

/// Entry point of `stacker build`.
pub fn run(global: &GlobalArgs, console: &Console) -> StackerResult<BuildReport> {
    let layout = load_layout(global, console)?;
    let toolchain = GccToolchain::new(layout.compiler.as_str());
    let options = BuildOptions {
        use_cache: !global.no_cache,
    };
    build(&layout, &toolchain, &options, console)
}

/// Builds the project described by `layout` with `toolchain`.
#[instrument(skip_all, fields(root = %layout.root.display()))]
pub fn build<T: Toolchain + ?Sized>(
    layout: &ProjectLayout,
    toolchain: &T,
    options: &BuildOptions,
    console: &Console,
) -> StackerResult<BuildReport> {
    let section = console.section("Building...");

    let sources = check_sources(layout, console)?;
    let recipes = {
        let _scan = console.section("Scanning dependencies...");
        extract_recipes(toolchain, &layout.include_dir, &sources)?
    };

    let current = FileState::scan(recipes.files())?;
    let reference = if options.use_cache {
        let cache = BuildCache::load(&layout.cache_file())?.unwrap_or_default();
        Reference::from_cache(cache, &layout.build_dir)
    } else {
        Reference::from_artifacts(&recipes, &layout.build_dir)?
    };
    let stale = evaluate(&recipes, &current, &reference);

    if stale.is_empty() {
        console.info("Nothing to (re)compile");
        section.finish("Done");
        return Ok(BuildReport::default());
    }

    let compiled: Vec<PathBuf> = stale.into_iter().collect();
    compile(layout, toolchain, &compiled, console)?;
    link(layout, toolchain, &recipes, console)?;

    if options.use_cache {
        BuildCache::new(current, recipes).save(&layout.cache_file())?;
    }
    info!(compiled = compiled.len(), "build finished");
    section.finish("Done");

    Ok(BuildReport {
        compiled,
        linked: true,
    })
}

/// Discovers the sources and checks every header and source file name.
fn check_sources(layout: &ProjectLayout, console: &Console) -> StackerResult<Vec<PathBuf>> {
    console.info("Check headers and sources");
    let headers = discover(&layout.include_dir, FileKind::Header)?;
    validate_filenames(&headers, FileKind::Header)?;
    let sources = discover(&layout.sources_dir, FileKind::Source)?;
    validate_filenames(&sources, FileKind::Source)?;
    Ok(sources)
}

fn compile<T: Toolchain + ?Sized>(
    layout: &ProjectLayout,
    toolchain: &T,
    sources: &[PathBuf],
    console: &Console,
) -> StackerResult<()> {
    let section = console.section("Compilation...");

    let results: Vec<Result<(), TechnicalError>> = sources
        .par_iter()
        .map(|source| {
            console.info(&format!("Compiling {}", relative(layout, source).display()));
            let object = layout.build_dir.join(object_name(source));
            let job = CompileJob {
                source,
                object: &object,
                include: &layout.include_dir,
                flags: &layout.flags,
            };
            toolchain
                .compile(&job)
                .map_err(|failure| TechnicalError::CompilationFailed {
                    file: source.clone(),
                    diagnostics: failure.diagnostics,
                })
        })
        .collect();
    results.into_iter().collect::<Result<(), _>>()?;

    section.finish("Success");
    Ok(())
}

fn link<T: Toolchain + ?Sized>(
    layout: &ProjectLayout,
    toolchain: &T,
    recipes: &RecipeSet,
    console: &Console,
) -> StackerResult<()> {
    let section = console.section("Linking...");

    let objects: Vec<PathBuf> = recipes
        .targets()
        .map(|target| layout.build_dir.join(target))
        .collect();
    let output = layout.executable();
    let job = LinkJob {
        objects: &objects,
        output: &output,
        libraries: &layout.libraries,
    };
    toolchain
        .link(&job)
        .map_err(|failure| TechnicalError::LinkingFailed {
            diagnostics: failure.diagnostics,
        })?;

    section.finish(&format!("Linked {}", relative(layout, &output).display()));
    Ok(())
}
