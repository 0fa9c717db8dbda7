//! Shared foundational types used across the stacker build tool.
//!
//! This crate provides the error taxonomy every pass reports through, the
//! modification-time stamp used for staleness decisions, and the file
//! extension tables that separate compilable sources from headers.

#![warn(missing_docs)]

pub mod error;
pub mod extensions;
pub mod timestamp;

pub use error::{
    ErrorCategory, FunctionalError, GraphError, StackerError, StackerResult, TechnicalError,
};
pub use extensions::{is_source, FileKind, HEADER_EXTENSIONS, SOURCE_EXTENSIONS};
pub use timestamp::Timestamp;
