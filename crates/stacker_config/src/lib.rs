//! Loading, validation and variable resolution of `blueprint.toml` files.
//!
//! A blueprint holds one or more named configurations. Selecting one yields a
//! flat key/value [`Profile`] whose string values may reference each other
//! with `${name}` tokens. Those references form a [`VariableGraph`] that is
//! proven acyclic and depth-bounded before any value is substituted, and the
//! fully resolved profile is finally turned into a typed [`ProjectLayout`].

#![warn(missing_docs)]

pub mod graph;
pub mod layout;
pub mod loader;
pub mod resolve;
pub mod types;

pub use graph::VariableGraph;
pub use layout::{resolve_layout, ProjectLayout, CACHE_FILE_NAME, DEFAULT_COMPILER};
pub use loader::{load_blueprint, load_blueprint_from_str, load_project, validate_keys};
pub use resolve::{references, resolve_variables, ResolveOptions, DEFAULT_MAX_DEPTH};
pub use types::{keys, Blueprint, ConfigValue, Profile};
