//! File extension tables for C and C++ projects.

use std::path::Path;

/// Extensions recognized as headers. Headers are never compiled directly;
/// recipes may also list included files with other extensions.
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "h++", "hxx"];

/// Extensions recognized as compilable sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "c++", "cxx"];

/// The role a file plays in the build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// A compilable translation unit.
    Source,
    /// An included header.
    Header,
}

impl FileKind {
    /// Classifies a path by its extension, returning `None` for anything else.
    pub fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if SOURCE_EXTENSIONS.contains(&ext) {
            Some(FileKind::Source)
        } else if HEADER_EXTENSIONS.contains(&ext) {
            Some(FileKind::Header)
        } else {
            None
        }
    }

    /// The extension table for this kind.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileKind::Source => SOURCE_EXTENSIONS,
            FileKind::Header => HEADER_EXTENSIONS,
        }
    }
}

/// Returns `true` if `path` has a source extension.
pub fn is_source(path: &Path) -> bool {
    FileKind::of(path) == Some(FileKind::Source)
}
