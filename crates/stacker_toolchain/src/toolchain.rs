//! The compiler collaborator.

use std::path::{Path, PathBuf};

/// One source file to compile into one object file.
#[derive(Debug, Clone, Copy)]
pub struct CompileJob<'a> {
    /// Source file to compile.
    pub source: &'a Path,
    /// Object file to produce.
    pub object: &'a Path,
    /// Include directory.
    pub include: &'a Path,
    /// Extra compilation flags, in order.
    pub flags: &'a [String],
}

/// Object files to link into one executable.
#[derive(Debug, Clone, Copy)]
pub struct LinkJob<'a> {
    /// Object files, in order.
    pub objects: &'a [PathBuf],
    /// Executable to produce.
    pub output: &'a Path,
    /// Libraries to link against, without the `-l` prefix.
    pub libraries: &'a [String],
}

/// A failed tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tool exited with status {}", .status.map_or_else(|| "unknown".to_string(), |s| s.to_string()))]
pub struct ToolFailure {
    /// Exit status, if the tool ran and exited normally.
    pub status: Option<i32>,
    /// Captured error output.
    pub diagnostics: String,
}

impl ToolFailure {
    /// Creates a failure with an exit status and diagnostics.
    pub fn new(status: Option<i32>, diagnostics: impl Into<String>) -> Self {
        Self {
            status,
            diagnostics: diagnostics.into(),
        }
    }
}

/// The three capabilities the build needs from a compiler.
///
/// Implementations are shared across the worker threads that scan and compile
/// files in parallel.
pub trait Toolchain: Send + Sync {
    /// Runs a dependency scan of `source` and returns the raw
    /// `target: prerequisites...` text.
    fn scan(&self, include: &Path, source: &Path) -> Result<String, ToolFailure>;

    /// Compiles one source file.
    fn compile(&self, job: &CompileJob<'_>) -> Result<(), ToolFailure>;

    /// Links object files into an executable.
    fn link(&self, job: &LinkJob<'_>) -> Result<(), ToolFailure>;
}

/// Name of the object file built from `source`: its stem with a `.o` suffix.
pub fn object_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("{stem}.o")
}
