//! `${name}` reference resolution inside a configuration profile.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, instrument};

use stacker_common::{FunctionalError, StackerResult};

use crate::graph::VariableGraph;
use crate::types::{ConfigValue, Profile};

/// Default bound on the length of a reference chain.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Tuning knobs for [`resolve_variables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Longest reference chain, counted in keys, accepted by the validator.
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\$\{(\w+)\}").expect("token regex"))
}

/// Iterates over the names referenced by `${name}` tokens in `text`.
///
/// Names are yielded in order of appearance and may repeat.
pub fn references(text: &str) -> impl Iterator<Item = &str> {
    token_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Checks that every reference names an existing string-valued key.
fn check_references(profile: &Profile) -> Result<(), FunctionalError> {
    for value in profile.values() {
        let Some(text) = value.as_str() else {
            continue;
        };
        for name in references(text) {
            match profile.get(name) {
                None => return Err(FunctionalError::UndefinedVariable(name.to_string())),
                Some(ConfigValue::Str(_)) => {}
                Some(_) => return Err(FunctionalError::WrongVariableType(name.to_string())),
            }
        }
    }
    Ok(())
}

/// Substitutes every `${name}` token of `profile` in place.
///
/// References are checked first, then the reference graph is validated
/// against `options.max_depth`. Only once both succeeded are values rewritten,
/// one referenced key at a time in topological order, so each substitution
/// uses a value that holds no references anymore. On error the profile is
/// left exactly as it was.
#[instrument(skip_all, fields(keys = profile.len()))]
pub fn resolve_variables(profile: &mut Profile, options: &ResolveOptions) -> StackerResult<()> {
    check_references(profile)?;

    let graph = VariableGraph::from_profile(profile);
    if graph.is_empty() {
        debug!("no variable references");
        return Ok(());
    }
    graph.validate(options.max_depth)?;
    let order = graph.topological_order()?;
    debug!(?order, "substituting variables");

    for name in &order {
        let Some(replacement) = profile.get(name).and_then(ConfigValue::as_str) else {
            continue;
        };
        let token = format!("${{{name}}}");
        let replacement = replacement.to_string();
        for value in profile.values_mut() {
            if let ConfigValue::Str(text) = value {
                if text.contains(&token) {
                    *text = text.replace(&token, &replacement);
                }
            }
        }
    }

    Ok(())
}
