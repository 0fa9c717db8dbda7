//! Minimal rebuild set computation.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use stacker_common::{is_source, TechnicalError, Timestamp};

use crate::recipe::{FileState, RecipeSet};
use crate::store::BuildCache;

/// Source files that must be recompiled, in path order.
pub type StaleSet = BTreeSet<PathBuf>;

/// What the fresh state of a pass is compared against.
#[derive(Debug, Clone)]
pub enum Reference {
    /// The cache written by the previous pass.
    Cache {
        /// The loaded cache; empty on a first build.
        cache: BuildCache,
        /// Cached targets whose object file is still in the build directory.
        built: BTreeSet<String>,
    },
    /// No cache: modification times of the object files already built.
    Artifacts(BTreeMap<String, Timestamp>),
}

impl Reference {
    /// Uses `cache` as reference, keeping only the targets whose object file
    /// is still present in `build_dir`.
    pub fn from_cache(cache: BuildCache, build_dir: &Path) -> Self {
        let built = cache
            .objects
            .targets()
            .filter(|target| build_dir.join(target).is_file())
            .map(str::to_string)
            .collect();
        Reference::Cache { cache, built }
    }

    /// Uses the object files in `build_dir` for the targets of `recipes` as
    /// reference.
    pub fn from_artifacts(recipes: &RecipeSet, build_dir: &Path) -> Result<Self, TechnicalError> {
        let mut objects = BTreeMap::new();
        for target in recipes.targets() {
            let object = build_dir.join(target);
            if object.is_file() {
                objects.insert(target.to_string(), Timestamp::of_file(&object)?);
            }
        }
        Ok(Reference::Artifacts(objects))
    }

    /// Returns `true` if `target` was built by an earlier pass.
    fn is_built(&self, target: &str) -> bool {
        match self {
            Reference::Cache { built, .. } => built.contains(target),
            Reference::Artifacts(objects) => objects.contains_key(target),
        }
    }

    /// Returns `true` if `prerequisite` changed since `target` was built.
    fn is_newer(&self, target: &str, prerequisite: &Path, now: Option<Timestamp>) -> bool {
        let Some(now) = now else {
            return true;
        };
        let recorded = match self {
            Reference::Cache { cache, .. } => cache.files.get(prerequisite),
            Reference::Artifacts(objects) => objects.get(target).copied(),
        };
        match recorded {
            Some(recorded) => now > recorded,
            None => true,
        }
    }
}

/// Computes the sources to recompile.
///
/// A target that was never built makes all its prerequisites stale. For a
/// built target, a prerequisite is stale when its current time is newer than
/// the recorded one. A stale header, meaning any prerequisite that is not a
/// source, then marks every source of every recipe listing it. Only sources end up in the result; an empty result means the
/// project is up to date.
#[instrument(skip_all, fields(recipes = recipes.len()))]
pub fn evaluate(recipes: &RecipeSet, current: &FileState, reference: &Reference) -> StaleSet {
    let mut stale: BTreeSet<&Path> = BTreeSet::new();

    for (target, prerequisites) in recipes.iter() {
        if !reference.is_built(target) {
            debug!(object = target, "never built");
            stale.extend(prerequisites.iter().map(PathBuf::as_path));
            continue;
        }
        for prerequisite in prerequisites {
            if reference.is_newer(target, prerequisite, current.get(prerequisite)) {
                debug!(object = target, prerequisite = %prerequisite.display(), "prerequisite changed");
                stale.insert(prerequisite.as_path());
            }
        }
    }

    // Anything in a recipe that is not a source is an included file, whatever
    // its extension (`.inl`, `.tpp`, `.def`).
    let stale_headers: Vec<&Path> = stale.iter().copied().filter(|p| !is_source(p)).collect();
    for header in stale_headers {
        for (target, prerequisites) in recipes.iter() {
            if prerequisites.iter().any(|p| p == header) {
                stale.extend(recipes.sources_of(target));
            }
        }
    }

    let sources: StaleSet = stale
        .into_iter()
        .filter(|p| is_source(p))
        .map(Path::to_path_buf)
        .collect();
    debug!(stale = sources.len(), "staleness evaluated");
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Recipe;
    use std::time::{Duration, UNIX_EPOCH};

    fn ts(n: u64) -> Timestamp {
        Timestamp::from_nanos(n)
    }

    fn recipes() -> RecipeSet {
        [
            Recipe::new("main.o", vec!["src/main.cpp".into(), "include/util.h".into()]),
            Recipe::new("util.o", vec!["src/util.cpp".into(), "include/util.h".into()]),
            Recipe::new("solo.o", vec!["src/solo.cpp".into()]),
        ]
        .into_iter()
        .collect()
    }

    fn state(main: u64, util: u64, solo: u64, header: u64) -> FileState {
        [
            ("src/main.cpp", ts(main)),
            ("src/util.cpp", ts(util)),
            ("src/solo.cpp", ts(solo)),
            ("include/util.h", ts(header)),
        ]
        .into_iter()
        .collect()
    }

    fn built_cache(files: FileState) -> Reference {
        let cache = BuildCache::new(files, recipes());
        let built = cache.objects.targets().map(str::to_string).collect();
        Reference::Cache { cache, built }
    }

    fn paths(items: &[&str]) -> StaleSet {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn changed_header_marks_including_source() {
        let recipes: RecipeSet =
            [Recipe::new("main.o", vec!["main.cpp".into(), "util.h".into()])]
                .into_iter()
                .collect();
        let old: FileState = [("main.cpp", ts(10)), ("util.h", ts(10))].into_iter().collect();
        let new: FileState = [("main.cpp", ts(10)), ("util.h", ts(11))].into_iter().collect();
        let reference = Reference::Cache {
            cache: BuildCache::new(old, recipes.clone()),
            built: ["main.o".to_string()].into(),
        };

        assert_eq!(evaluate(&recipes, &new, &reference), paths(&["main.cpp"]));
    }

    #[test]
    fn changed_inline_file_marks_including_source() {
        let recipes: RecipeSet = [Recipe::new(
            "main.o",
            vec!["main.cpp".into(), "vec.h".into(), "vec.inl".into()],
        )]
        .into_iter()
        .collect();
        let old: FileState = [("main.cpp", ts(10)), ("vec.h", ts(10)), ("vec.inl", ts(10))]
            .into_iter()
            .collect();
        let new: FileState = [("main.cpp", ts(10)), ("vec.h", ts(10)), ("vec.inl", ts(99))]
            .into_iter()
            .collect();
        let reference = Reference::Cache {
            cache: BuildCache::new(old, recipes.clone()),
            built: ["main.o".to_string()].into(),
        };

        assert_eq!(evaluate(&recipes, &new, &reference), paths(&["main.cpp"]));
    }

    #[test]
    fn unchanged_tree_is_up_to_date() {
        let files = state(10, 10, 10, 10);
        let reference = built_cache(files.clone());
        assert!(evaluate(&recipes(), &files, &reference).is_empty());
    }

    #[test]
    fn header_change_propagates_to_every_includer() {
        let reference = built_cache(state(10, 10, 10, 10));
        let stale = evaluate(&recipes(), &state(10, 10, 10, 20), &reference);
        assert_eq!(stale, paths(&["src/main.cpp", "src/util.cpp"]));
    }

    #[test]
    fn source_change_only_marks_itself() {
        let reference = built_cache(state(10, 10, 10, 10));
        let stale = evaluate(&recipes(), &state(10, 10, 30, 10), &reference);
        assert_eq!(stale, paths(&["src/solo.cpp"]));
    }

    #[test]
    fn older_timestamp_is_not_stale() {
        let reference = built_cache(state(10, 10, 10, 10));
        assert!(evaluate(&recipes(), &state(5, 5, 5, 5), &reference).is_empty());
    }

    #[test]
    fn first_build_marks_every_source() {
        let reference = Reference::Cache {
            cache: BuildCache::default(),
            built: BTreeSet::new(),
        };
        // Timestamps are irrelevant when nothing was built.
        let stale = evaluate(&recipes(), &state(0, 0, 0, 0), &reference);
        assert_eq!(
            stale,
            paths(&["src/main.cpp", "src/solo.cpp", "src/util.cpp"])
        );

        let stale = evaluate(&recipes(), &state(0, 0, 0, 0), &Reference::Artifacts(BTreeMap::new()));
        assert_eq!(stale.len(), 3);
    }

    #[test]
    fn missing_object_rebuilds_target() {
        let files = state(10, 10, 10, 10);
        let reference = Reference::Cache {
            cache: BuildCache::new(files.clone(), recipes()),
            built: ["main.o".to_string(), "util.o".to_string()].into(),
        };
        assert_eq!(
            evaluate(&recipes(), &files, &reference),
            paths(&["src/solo.cpp"])
        );
    }

    #[test]
    fn new_header_in_recipe_is_stale() {
        let reference = built_cache(state(10, 10, 10, 10));
        let mut grown = recipes();
        grown.insert(Recipe::new(
            "solo.o",
            vec!["src/solo.cpp".into(), "include/extra.h".into()],
        ));
        let mut files = state(10, 10, 10, 10);
        files.insert("include/extra.h", ts(1));
        assert_eq!(
            evaluate(&grown, &files, &reference),
            paths(&["src/solo.cpp"])
        );
    }

    #[test]
    fn artifacts_reference_compares_against_object_time() {
        let objects: BTreeMap<String, Timestamp> = [
            ("main.o".to_string(), ts(50)),
            ("util.o".to_string(), ts(50)),
            ("solo.o".to_string(), ts(50)),
        ]
        .into();
        let reference = Reference::Artifacts(objects);

        assert!(evaluate(&recipes(), &state(40, 40, 40, 40), &reference).is_empty());
        assert_eq!(
            evaluate(&recipes(), &state(40, 40, 40, 60), &reference),
            paths(&["src/main.cpp", "src/util.cpp"])
        );
    }

    #[test]
    fn reference_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let object = dir.path().join("main.o");
        std::fs::write(&object, "").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&object)
            .unwrap()
            .set_modified(UNIX_EPOCH + Duration::from_secs(7))
            .unwrap();

        let from_cache = Reference::from_cache(BuildCache::new(FileState::new(), recipes()), dir.path());
        assert!(from_cache.is_built("main.o"));
        assert!(!from_cache.is_built("util.o"));

        let from_artifacts = Reference::from_artifacts(&recipes(), dir.path()).unwrap();
        match from_artifacts {
            Reference::Artifacts(objects) => {
                assert_eq!(objects.len(), 1);
                assert_eq!(objects["main.o"], ts(7_000_000_000));
            }
            other => panic!("unexpected reference: {other:?}"),
        }
    }
}
