//! The compiler collaborator and everything that talks to it.
//!
//! [`Toolchain`] abstracts the three tool capabilities a build needs: a
//! dependency scan, a compilation and a link. [`GccToolchain`] implements
//! them by running a GCC-compatible compiler. Recipe extraction fans the
//! scans out over a thread pool and turns their output into a
//! [`RecipeSet`](stacker_cache::RecipeSet).

#![warn(missing_docs)]

pub mod gcc;
pub mod recipe;
pub mod sources;
pub mod toolchain;

pub use gcc::{GccToolchain, COLOR_FLAG};
pub use recipe::{extract_recipes, parse_recipe};
pub use sources::{discover, validate_filenames};
pub use toolchain::{object_name, CompileJob, LinkJob, ToolFailure, Toolchain};
