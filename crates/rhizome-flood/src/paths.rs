use std::collections::{HashMap, HashSet};

use crate::instance::DiffusionInstance;

// ─────────────────────────────────────────────
// Endpoints
// ─────────────────────────────────────────────

/// Capture indices of an instance's endpoints: captured nodes that parent
/// no other capture — the leaves of the capture tree.
///
/// An instance that captured only its seed has the seed as its single
/// endpoint.
pub fn endpoints(instance: &DiffusionInstance) -> Vec<usize> {
    let captured = instance.captured();
    let parents: HashSet<usize> = captured.iter().filter_map(|c| c.parent).collect();

    captured
        .iter()
        .enumerate()
        .filter(|(_, c)| !parents.contains(&c.node))
        .map(|(index, _)| index)
        .collect()
}

// ─────────────────────────────────────────────
// Full paths
// ─────────────────────────────────────────────

/// Seed→endpoint node index sequences, one per endpoint, rebuilt from the
/// capture parent links.
///
/// Single-node paths (an instance that never expanded) are omitted — a
/// one-point path is not a path.
pub fn full_paths(instance: &DiffusionInstance) -> Vec<Vec<usize>> {
    let captured = instance.captured();
    let parent_of: HashMap<usize, usize> = captured
        .iter()
        .filter_map(|c| c.parent.map(|p| (c.node, p)))
        .collect();

    let mut paths = Vec::new();
    for &endpoint in &endpoints(instance) {
        let mut path = vec![captured[endpoint].node];
        let mut current = captured[endpoint].node;
        while let Some(&parent) = parent_of.get(&current) {
            path.push(parent);
            current = parent;
        }
        if path.len() < 2 {
            continue;
        }
        path.reverse();
        paths.push(path);
    }
    paths
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
