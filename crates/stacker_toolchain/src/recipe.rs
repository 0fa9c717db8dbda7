//! Recipe extraction from dependency scans.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use stacker_cache::{Recipe, RecipeSet};
use stacker_common::{StackerResult, TechnicalError};

use crate::toolchain::Toolchain;

/// Parses the `target: prereq1 prereq2 \` text of a dependency scan of
/// `source`.
///
/// Line continuations (`\` at end of line) are dropped and the
/// prerequisites are split on whitespace. An escaped space (`\ `) stays part
/// of its path.
pub fn parse_recipe(source: &Path, output: &str) -> Result<Recipe, TechnicalError> {
    let malformed = || TechnicalError::MalformedRecipe {
        file: source.to_path_buf(),
        output: output.to_string(),
    };

    let (target, prerequisites) = output.split_once(':').ok_or_else(malformed)?;
    let target = target.trim();
    if target.is_empty() {
        return Err(malformed());
    }

    let joined = prerequisites.replace("\\\r\n", " ").replace("\\\n", " ");
    let prerequisites = split_escaped(&joined).into_iter().map(PathBuf::from).collect();
    Ok(Recipe::new(target, prerequisites))
}

/// Splits `text` on unescaped whitespace, turning `\ ` into a space.
fn split_escaped(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&' ') => {
                chars.next();
                word.push(' ');
            }
            c if c.is_whitespace() => {
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
            }
            c => word.push(c),
        }
    }
    if !word.is_empty() {
        words.push(word);
    }
    words
}

/// Scans every file of `sources` in parallel and collects their recipes.
///
/// The first failure in source order aborts the whole extraction; no partial
/// set is returned. Two sources mapping to the same target are rejected.
#[instrument(skip_all, fields(sources = sources.len()))]
pub fn extract_recipes<T: Toolchain + ?Sized>(
    toolchain: &T,
    include: &Path,
    sources: &[PathBuf],
) -> StackerResult<RecipeSet> {
    let scanned: Vec<Result<Recipe, TechnicalError>> = sources
        .par_iter()
        .map(|source| {
            let output = toolchain
                .scan(include, source)
                .map_err(|failure| TechnicalError::RecipeFailed {
                    file: source.clone(),
                    diagnostics: failure.diagnostics,
                })?;
            parse_recipe(source, &output)
        })
        .collect();

    let mut producers: BTreeMap<String, &Path> = BTreeMap::new();
    let mut recipes = RecipeSet::new();
    for (source, recipe) in sources.iter().zip(scanned) {
        let recipe = recipe?;
        if let Some(first) = producers.insert(recipe.target.clone(), source.as_path()) {
            return Err(TechnicalError::DuplicateTarget {
                target: recipe.target,
                first: first.to_path_buf(),
                second: source.clone(),
            }
            .into());
        }
        debug!(object = %recipe.target, prerequisites = recipe.prerequisites.len(), "recipe");
        recipes.insert(recipe);
    }
    Ok(recipes)
}
