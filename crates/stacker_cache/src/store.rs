//! The persisted build cache.
//!
//! Stored as a JSON document with exactly two top-level sections: `FILES`
//! (path to modification time) and `OBJECTS` (target to prerequisite list).
//! A damaged document is reported, never silently replaced with an empty one.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use stacker_common::{StackerResult, TechnicalError};

use crate::recipe::{FileState, RecipeSet};

/// Snapshot of one successful pass: file times and the recipes built from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildCache {
    /// Modification time of every prerequisite at the end of the pass.
    #[serde(rename = "FILES")]
    pub files: FileState,
    /// Every recipe of the pass.
    #[serde(rename = "OBJECTS")]
    pub objects: RecipeSet,
}

/// On-disk shape, with both sections optional so their absence can be named.
#[derive(Deserialize)]
struct RawCache {
    #[serde(rename = "FILES")]
    files: Option<FileState>,
    #[serde(rename = "OBJECTS")]
    objects: Option<RecipeSet>,
}

impl BuildCache {
    /// Creates a cache from a file state and a recipe set.
    pub fn new(files: FileState, objects: RecipeSet) -> Self {
        Self { files, objects }
    }

    /// Captures the current modification time of every prerequisite of
    /// `recipes`.
    pub fn capture(recipes: RecipeSet) -> StackerResult<Self> {
        let files = FileState::scan(recipes.files())?;
        Ok(Self::new(files, recipes))
    }

    /// Loads the cache at `path`.
    ///
    /// Returns `Ok(None)` when no cache exists yet. A document that is not
    /// valid JSON or lacks one of the two sections is reported as corrupted.
    pub fn load(path: &Path) -> StackerResult<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no build cache");
                return Ok(None);
            }
            Err(e) => return Err(TechnicalError::io(path, e).into()),
        };

        let corrupted = |reason: String| TechnicalError::CacheCorrupted {
            path: path.to_path_buf(),
            reason,
        };
        let raw: RawCache = serde_json::from_str(&content).map_err(|e| corrupted(e.to_string()))?;
        let files = raw
            .files
            .ok_or_else(|| corrupted("missing \"FILES\" section".to_string()))?;
        let objects = raw
            .objects
            .ok_or_else(|| corrupted("missing \"OBJECTS\" section".to_string()))?;

        debug!(
            path = %path.display(),
            files = files.len(),
            objects = objects.len(),
            "build cache loaded"
        );
        Ok(Some(Self { files, objects }))
    }

    /// Writes the cache to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> StackerResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| TechnicalError::CacheCorrupted {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| TechnicalError::io(path, e))?;
        debug!(path = %path.display(), "build cache saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Recipe;
    use stacker_common::{StackerError, Timestamp};

    fn sample() -> BuildCache {
        let objects: RecipeSet = [Recipe::new(
            "main.o",
            vec!["src/main.cpp".into(), "include/util.h".into()],
        )]
        .into_iter()
        .collect();
        let files: FileState = [
            ("src/main.cpp", Timestamp::from_nanos(10)),
            ("include/util.h", Timestamp::from_nanos(20)),
        ]
        .into_iter()
        .collect();
        BuildCache::new(files, objects)
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacker_cache.json");
        let cache = sample();
        cache.save(&path).unwrap();

        let loaded = BuildCache::load(&path).unwrap().unwrap();
        assert_eq!(loaded, cache);
    }

    #[test]
    fn document_has_two_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacker_cache.json");
        sample().save(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["FILES"]["include/util.h"], 20);
        assert_eq!(object["OBJECTS"]["main.o"][0], "src/main.cpp");
    }

    #[test]
    fn absent_cache_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BuildCache::load(&dir.path().join("stacker_cache.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_section_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacker_cache.json");

        std::fs::write(&path, r#"{"FILES": {}}"#).unwrap();
        let err = BuildCache::load(&path).unwrap_err();
        match err {
            StackerError::Technical(TechnicalError::CacheCorrupted { reason, .. }) => {
                assert!(reason.contains("OBJECTS"));
            }
            other => panic!("unexpected error: {other}"),
        }

        std::fs::write(&path, r#"{"OBJECTS": {}}"#).unwrap();
        let err = BuildCache::load(&path).unwrap_err();
        assert!(err.to_string().contains("FILES"));
        assert!(err.to_string().contains("remove it and re-build"));
    }

    #[test]
    fn invalid_json_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacker_cache.json");
        std::fs::write(&path, "not json {{{").unwrap();
        assert!(matches!(
            BuildCache::load(&path).unwrap_err(),
            StackerError::Technical(TechnicalError::CacheCorrupted { .. })
        ));
    }

    #[test]
    fn empty_sections_are_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacker_cache.json");
        std::fs::write(&path, r#"{"FILES": {}, "OBJECTS": {}}"#).unwrap();
        let cache = BuildCache::load(&path).unwrap().unwrap();
        assert!(cache.files.is_empty());
        assert!(cache.objects.is_empty());
    }

    #[test]
    fn capture_reads_every_prerequisite() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("main.cpp");
        let hdr = dir.path().join("util.h");
        std::fs::write(&src, "").unwrap();
        std::fs::write(&hdr, "").unwrap();
        let recipes: RecipeSet = [Recipe::new("main.o", vec![src.clone(), hdr.clone()])]
            .into_iter()
            .collect();

        let cache = BuildCache::capture(recipes).unwrap();
        assert_eq!(cache.files.len(), 2);
        assert_eq!(cache.files.get(&src), Some(Timestamp::of_file(&src).unwrap()));
        assert!(cache.objects.contains("main.o"));
    }
}
