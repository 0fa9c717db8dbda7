//! Recipes and file states: the per-pass view of the project.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use stacker_common::{is_source, TechnicalError, Timestamp};

/// One object target and the files it is built from.
///
/// The prerequisites hold the source file and every header it depends on,
/// in the order the dependency scanner reported them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Object file name, e.g. `main.o`.
    pub target: String,
    /// Files the target is built from.
    pub prerequisites: Vec<PathBuf>,
}

impl Recipe {
    /// Creates a recipe.
    pub fn new(target: impl Into<String>, prerequisites: Vec<PathBuf>) -> Self {
        Self {
            target: target.into(),
            prerequisites,
        }
    }
}

/// Every recipe of a pass, keyed by target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeSet(BTreeMap<String, Vec<PathBuf>>);

impl RecipeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a recipe, returning the prerequisites previously stored for the
    /// same target, if any.
    pub fn insert(&mut self, recipe: Recipe) -> Option<Vec<PathBuf>> {
        self.0.insert(recipe.target, recipe.prerequisites)
    }

    /// The prerequisites of `target`.
    pub fn get(&self, target: &str) -> Option<&[PathBuf]> {
        self.0.get(target).map(Vec::as_slice)
    }

    /// Returns `true` if `target` has a recipe.
    pub fn contains(&self, target: &str) -> bool {
        self.0.contains_key(target)
    }

    /// Iterates over `(target, prerequisites)` in target order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.0.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    /// Iterates over the targets in order.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every distinct prerequisite across all recipes.
    pub fn files(&self) -> BTreeSet<&Path> {
        self.0
            .values()
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }

    /// The source files of the recipe for `target`, headers excluded.
    pub fn sources_of(&self, target: &str) -> impl Iterator<Item = &Path> {
        self.get(target)
            .unwrap_or_default()
            .iter()
            .map(PathBuf::as_path)
            .filter(|p| is_source(p))
    }

    /// Number of recipes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no recipes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Recipe> for RecipeSet {
    fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
        let mut set = RecipeSet::new();
        for recipe in iter {
            set.insert(recipe);
        }
        set
    }
}

/// Last-modified time of each tracked file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileState(BTreeMap<PathBuf, Timestamp>);

impl FileState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the current modification time of every file in `files`.
    pub fn scan<'a, I>(files: I) -> Result<Self, TechnicalError>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        files
            .into_iter()
            .map(|path| Timestamp::of_file(path).map(|time| (path.to_path_buf(), time)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }

    /// Records the time of `path`.
    pub fn insert(&mut self, path: impl Into<PathBuf>, time: Timestamp) {
        self.0.insert(path.into(), time);
    }

    /// The recorded time of `path`.
    pub fn get(&self, path: &Path) -> Option<Timestamp> {
        self.0.get(path).copied()
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no file is tracked.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<PathBuf>> FromIterator<(P, Timestamp)> for FileState {
    fn from_iter<I: IntoIterator<Item = (P, Timestamp)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(p, t)| (p.into(), t)).collect())
    }
}
