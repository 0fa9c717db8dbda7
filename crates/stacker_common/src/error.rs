//! Error taxonomy shared by every stacker pass.
//!
//! Errors fall into three categories. A [`FunctionalError`] is a mistake in
//! the blueprint the user can fix (missing key, undefined variable). A
//! [`TechnicalError`] is an environment or tooling failure (compiler exit
//! status, corrupted cache, filesystem problem) and carries the tool's
//! diagnostic text when there is one. A [`GraphError`] reports a variable
//! reference graph that is cyclic or deeper than the configured bound.
//!
//! Every error aborts the whole pass; there is no partial-success mode.

use std::fmt;
use std::path::PathBuf;

/// The standard result type for fallible stacker operations.
pub type StackerResult<T> = Result<T, StackerError>;

/// The category an error belongs to, printed in front of user-facing messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller-fixable configuration mistake.
    Functional,
    /// Environment or tooling failure.
    Technical,
    /// Structurally invalid variable graph.
    Graph,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Functional => "FunctionalError",
            ErrorCategory::Technical => "TechnicalError",
            ErrorCategory::Graph => "GraphError",
        };
        f.write_str(name)
    }
}

/// A configuration mistake the user can fix by editing the blueprint.
#[derive(Debug, thiserror::Error)]
pub enum FunctionalError {
    /// A mandatory key is absent from the selected configuration.
    #[error("missing mandatory \"{0}\" key")]
    MissingKey(String),

    /// A key is present but holds a value of the wrong type.
    #[error("key \"{key}\" is of incorrect type (should be {expected})")]
    WrongKeyType {
        /// The offending key.
        key: String,
        /// Human-readable name of the expected type.
        expected: &'static str,
    },

    /// A `${name}` reference points at a key that does not exist.
    #[error("\"${{{0}}}\" is undefined")]
    UndefinedVariable(String),

    /// A `${name}` reference points at a key whose value is not a string.
    #[error("\"${{{0}}}\" is not of type string")]
    WrongVariableType(String),

    /// The resolved output name is empty or contains a path separator.
    #[error("invalid output name \"{0}\"")]
    InvalidOutputName(String),
}

/// The variable reference graph cannot be ordered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Following references from a key leads back to a key on the same path.
    #[error("cycle in variable references ({})", .path.join(" -> "))]
    Cycle {
        /// The keys along the cycle, first and last entries being equal.
        path: Vec<String>,
    },

    /// A reference chain is longer than the configured depth bound.
    #[error("depth threshold of {max_depth} exceeded while following \"{node}\"")]
    DepthExceeded {
        /// The configured bound.
        max_depth: usize,
        /// The key at which the bound was crossed.
        node: String,
    },
}

/// An environment or tooling failure.
#[derive(Debug, thiserror::Error)]
pub enum TechnicalError {
    /// The blueprint file could not be read.
    #[error("file reading error at {path}: {source}")]
    BlueprintRead {
        /// The blueprint path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The blueprint file is not valid TOML.
    #[error("blueprint parsing error in {path}: {reason}")]
    BlueprintParse {
        /// The blueprint path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The blueprint file contains no configuration at all.
    #[error("empty blueprint file {0}")]
    EmptyBlueprint(PathBuf),

    /// The requested named configuration is absent from the blueprint.
    #[error("configuration \"{0}\" not found")]
    ConfigNotFound(String),

    /// A directory that must already exist is missing.
    #[error("folder \"{}\" is nonexistent", .0.display())]
    FolderNotFound(PathBuf),

    /// A header or source file name does not match the naming requirements.
    #[error("file \"{0}\" doesn't match filenames requirements")]
    InvalidFilename(String),

    /// The dependency scan of a source file failed.
    #[error("recipe creation failed for {}", .file.display())]
    RecipeFailed {
        /// The source file being scanned.
        file: PathBuf,
        /// The scanner's diagnostic output.
        diagnostics: String,
    },

    /// The dependency scan output has no `target:` separator.
    #[error("malformed recipe for {}: {output:?}", .file.display())]
    MalformedRecipe {
        /// The source file being scanned.
        file: PathBuf,
        /// The raw scanner output.
        output: String,
    },

    /// Two source files produce the same object target.
    #[error("target \"{target}\" is produced by both {} and {}", .first.display(), .second.display())]
    DuplicateTarget {
        /// The object target name.
        target: String,
        /// The first source mapped to the target.
        first: PathBuf,
        /// The second source mapped to the target.
        second: PathBuf,
    },

    /// Compiling a source file failed.
    #[error("compilation failed for {}", .file.display())]
    CompilationFailed {
        /// The source file being compiled.
        file: PathBuf,
        /// The compiler's diagnostic output.
        diagnostics: String,
    },

    /// Linking the executable failed.
    #[error("linking failed")]
    LinkingFailed {
        /// The linker's diagnostic output.
        diagnostics: String,
    },

    /// The cache document is unreadable or lacks a mandatory section.
    #[error("cache file {} is corrupted: {reason} (hint: remove it and re-build)", .path.display())]
    CacheCorrupted {
        /// The cache file path.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Removing a build artifact during clean-up failed.
    #[error("impossible to remove \"{}\": {source}", .path.display())]
    RemovalFailed {
        /// The entry that could not be removed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Any other filesystem failure.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl TechnicalError {
    /// Wraps an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TechnicalError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Any error that aborts a stacker pass.
#[derive(Debug, thiserror::Error)]
pub enum StackerError {
    /// A caller-fixable configuration mistake.
    #[error("FunctionalError: {0}")]
    Functional(#[from] FunctionalError),

    /// An environment or tooling failure.
    #[error("TechnicalError: {0}")]
    Technical(#[from] TechnicalError),

    /// A cyclic or too-deep variable graph.
    #[error("GraphError: {0}")]
    Graph(#[from] GraphError),
}

impl StackerError {
    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StackerError::Functional(_) => ErrorCategory::Functional,
            StackerError::Technical(_) => ErrorCategory::Technical,
            StackerError::Graph(_) => ErrorCategory::Graph,
        }
    }

    /// Returns the external tool's diagnostic text, if the failure carries one.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            StackerError::Technical(
                TechnicalError::RecipeFailed { diagnostics, .. }
                | TechnicalError::CompilationFailed { diagnostics, .. }
                | TechnicalError::LinkingFailed { diagnostics },
            ) => Some(diagnostics.as_str()),
            _ => None,
        }
    }
}
