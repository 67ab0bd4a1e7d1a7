//! Category tree indexing
//!
//! Categories arrive as a flat list of `(id, name, parent_id)` records. The
//! index rebuilds the hierarchy facts the classifiers need from that list:
//! the root-to-node path of every node and the set of leaf nodes.
//!
//! The input is not trusted to be a well-formed forest:
//! - a `parent_id` that names no node in the list makes the node a root
//! - a cyclic parent chain is cut where it closes on itself; the last node
//!   walked before the repeat becomes the root of that path
//! - repeated ids keep their first occurrence
//!
//! None of these conditions fail the build.

use crate::types::{CategoryNode, LeafCategory};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Glyph placed between ancestor names in a category path
pub const PATH_SEPARATOR: &str = " → ";

/// Hierarchy facts derived from one snapshot of the category list
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    paths: HashMap<String, String>,
    leaves: Vec<LeafCategory>,
    cyclic: Vec<String>,
    node_count: usize,
}

impl CategoryIndex {
    /// Index a flat category list
    ///
    /// Leaves keep the relative order of `nodes`.
    pub fn build(nodes: &[CategoryNode]) -> Self {
        let mut by_id: HashMap<&str, &CategoryNode> = HashMap::with_capacity(nodes.len());
        let mut ordered: Vec<&CategoryNode> = Vec::with_capacity(nodes.len());

        for node in nodes {
            if by_id.contains_key(node.id.as_str()) {
                warn!("Duplicate category id '{}', keeping first occurrence", node.id);
                continue;
            }
            by_id.insert(node.id.as_str(), node);
            ordered.push(node);
        }

        // Roots never become keys here
        let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
        for node in &ordered {
            match node.parent_id.as_deref() {
                Some(parent) if parent == node.id => {
                    warn!("Category '{}' names itself as parent", node.id);
                }
                Some(parent) => children_of.entry(parent).or_default().push(node.id.as_str()),
                None => {}
            }
        }

        let mut paths = HashMap::with_capacity(ordered.len());
        let mut cyclic = Vec::new();
        for node in &ordered {
            resolve_path(node, &by_id, &mut paths, &mut cyclic);
        }

        let leaves: Vec<LeafCategory> = ordered
            .iter()
            .filter(|node| !children_of.contains_key(node.id.as_str()))
            .map(|node| LeafCategory {
                id: node.id.clone(),
                name: node.name.clone(),
                path: paths
                    .get(&node.id)
                    .cloned()
                    .unwrap_or_else(|| node.name.clone()),
            })
            .collect();

        debug!(
            "Indexed {} categories: {} leaves, {} in cycles",
            ordered.len(),
            leaves.len(),
            cyclic.len()
        );

        Self {
            paths,
            leaves,
            cyclic,
            node_count: ordered.len(),
        }
    }

    /// Path of the node with the given id
    pub fn path_of(&self, id: &str) -> Option<&str> {
        self.paths.get(id).map(String::as_str)
    }

    /// Leaf categories in input order
    pub fn leaves(&self) -> &[LeafCategory] {
        &self.leaves
    }

    /// Consume the index, keeping only the leaves
    pub fn into_leaves(self) -> Vec<LeafCategory> {
        self.leaves
    }

    /// Ids of nodes found on a cyclic parent chain
    pub fn cyclic_nodes(&self) -> &[String] {
        &self.cyclic
    }

    /// Number of distinct nodes indexed
    pub fn len(&self) -> usize {
        self.node_count
    }

    /// Whether the snapshot had no nodes
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }
}

/// Memoized ascent from `start` to the nearest known path or root
fn resolve_path<'a>(
    start: &'a CategoryNode,
    by_id: &HashMap<&'a str, &'a CategoryNode>,
    paths: &mut HashMap<String, String>,
    cyclic: &mut Vec<String>,
) {
    if paths.contains_key(&start.id) {
        return;
    }

    let mut chain: Vec<&CategoryNode> = Vec::new();
    let mut on_chain: HashSet<&str> = HashSet::new();
    let mut prefix: Option<String> = None;
    let mut current = Some(start);

    while let Some(node) = current {
        if let Some(known) = paths.get(&node.id) {
            prefix = Some(known.clone());
            break;
        }

        if !on_chain.insert(node.id.as_str()) {
            let closes_at = chain.iter().position(|n| n.id == node.id).unwrap_or(0);
            warn!(
                "Cyclic parent chain through category '{}', cutting path at '{}'",
                node.id,
                chain.last().map(|n| n.id.as_str()).unwrap_or(node.id.as_str())
            );
            cyclic.extend(chain[closes_at..].iter().map(|n| n.id.clone()));
            break;
        }

        chain.push(node);
        current = match node.parent_id.as_deref() {
            Some(parent) => {
                let found = by_id.get(parent).copied();
                if found.is_none() {
                    debug!(
                        "Category '{}' has unknown parent '{}', treating as root",
                        node.id, parent
                    );
                }
                found
            }
            None => None,
        };
    }

    for node in chain.into_iter().rev() {
        let path = match prefix {
            Some(ref parent_path) => format!("{}{}{}", parent_path, PATH_SEPARATOR, node.name),
            None => node.name.clone(),
        };
        paths.insert(node.id.clone(), path.clone());
        prefix = Some(path);
    }
}
