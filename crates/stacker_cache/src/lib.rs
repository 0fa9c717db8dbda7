//! Build state persistence and incremental rebuild planning.
//!
//! A pass captures every recipe (object target to prerequisite files) and the
//! modification time of every prerequisite. That snapshot is compared against
//! a reference state, either the [`BuildCache`] written by the previous pass
//! or the object files already present in the build directory, to compute the
//! minimal set of sources to recompile.

#![warn(missing_docs)]

pub mod recipe;
pub mod staleness;
pub mod store;

pub use recipe::{FileState, Recipe, RecipeSet};
pub use staleness::{evaluate, Reference, StaleSet};
pub use store::BuildCache;
