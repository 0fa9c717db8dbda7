//! The variable reference graph and its validation.
//!
//! Nodes are keys whose string value holds at least one `${name}` reference;
//! edges go from a key to every key it references. A referenced key that is
//! not itself a node is already resolved (it has no references of its own).

use std::collections::{BTreeMap, BTreeSet, HashSet};

use stacker_common::GraphError;
use tracing::debug;

use crate::resolve::references;
use crate::types::Profile;

/// Directed graph of `${name}` references between configuration keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl VariableGraph {
    /// Builds the graph from every string value of `profile`.
    pub fn from_profile(profile: &Profile) -> Self {
        let edges = profile
            .iter()
            .filter_map(|(key, value)| {
                let refs: BTreeSet<String> = references(value.as_str()?)
                    .map(str::to_string)
                    .collect();
                (!refs.is_empty()).then(|| (key.clone(), refs))
            })
            .collect();
        Self { edges }
    }

    /// Builds a graph from explicit adjacency lists. Nodes with no children
    /// are dropped, matching what [`from_profile`](Self::from_profile) builds.
    pub fn from_edges<'a, I, C>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, C)>,
        C: IntoIterator<Item = &'a str>,
    {
        let edges = edges
            .into_iter()
            .map(|(node, children)| {
                let children: BTreeSet<String> =
                    children.into_iter().map(str::to_string).collect();
                (node.to_string(), children)
            })
            .filter(|(_, children)| !children.is_empty())
            .collect();
        Self { edges }
    }

    /// Returns `true` if no key references another.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of nodes (keys holding references).
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if `key` holds at least one reference.
    pub fn contains(&self, key: &str) -> bool {
        self.edges.contains_key(key)
    }

    /// The keys referenced by `key`, if it is a node.
    pub fn references_of(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(key)
    }

    /// Proves the graph acyclic and no deeper than `max_depth` keys.
    ///
    /// Runs a depth-first traversal from every node, tracking the current
    /// path. Reaching a key already on the path is a cycle. A path holding
    /// more than `max_depth` keys is rejected as too deep. Nodes whose whole
    /// subgraph has been cleared are remembered as dead ends and skipped by
    /// later traversals.
    pub fn validate(&self, max_depth: usize) -> Result<(), GraphError> {
        let mut dead_ends: HashSet<&str> = HashSet::new();

        for node in self.edges.keys() {
            if dead_ends.contains(node.as_str()) {
                continue;
            }
            let mut path = vec![node.as_str()];
            self.descend(&mut path, &mut dead_ends, max_depth)?;
            dead_ends.insert(node.as_str());
        }

        debug!(nodes = self.len(), "variable graph is acyclic");
        Ok(())
    }

    fn descend<'a>(
        &'a self,
        path: &mut Vec<&'a str>,
        dead_ends: &mut HashSet<&'a str>,
        max_depth: usize,
    ) -> Result<(), GraphError> {
        let Some(&current) = path.last() else {
            return Ok(());
        };

        if path.len() > max_depth {
            return Err(GraphError::DepthExceeded {
                max_depth,
                node: current.to_string(),
            });
        }

        let Some(children) = self.references_of(current) else {
            return Ok(());
        };

        for child in children {
            let child = child.as_str();
            if !self.contains(child) || dead_ends.contains(child) {
                continue;
            }

            if let Some(start) = path.iter().position(|n| *n == child) {
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(child.to_string());
                return Err(GraphError::Cycle { path: cycle });
            }

            path.push(child);
            self.descend(path, dead_ends, max_depth)?;
            if let Some(cleared) = path.pop() {
                dead_ends.insert(cleared);
            }
        }

        Ok(())
    }

    /// Returns the referenced keys in substitution order.
    ///
    /// Each round emits every reference that points outside the remaining
    /// graph (a key with no references left, or one that never had any),
    /// drops those edges, and removes nodes left without references. Within a
    /// round nodes are visited in key order, so the result is reproducible.
    /// Keys that nobody references are not emitted.
    ///
    /// A round that makes no progress means the graph was never validated
    /// and still holds a cycle; it is reported instead of looping.
    pub fn topological_order(&self) -> Result<Vec<String>, GraphError> {
        let mut remaining: BTreeMap<&str, BTreeSet<&str>> = self
            .edges
            .iter()
            .map(|(node, children)| (node.as_str(), children.iter().map(String::as_str).collect()))
            .collect();
        let mut emitted: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();

        while !remaining.is_empty() {
            let unresolved: HashSet<&str> = remaining.keys().copied().collect();
            let mut progressed = false;
            let mut cleared = Vec::new();

            for (node, children) in remaining.iter_mut() {
                children.retain(|child| {
                    if unresolved.contains(child) {
                        return true;
                    }
                    if emitted.insert(*child) {
                        order.push(child.to_string());
                    }
                    progressed = true;
                    false
                });
                if children.is_empty() {
                    cleared.push(*node);
                }
            }

            for node in cleared {
                remaining.remove(node);
            }

            if !progressed {
                let mut path: Vec<String> = remaining.keys().map(|n| n.to_string()).collect();
                if let Some(first) = path.first().cloned() {
                    path.push(first);
                }
                return Err(GraphError::Cycle { path });
            }
        }

        Ok(order)
    }
}
