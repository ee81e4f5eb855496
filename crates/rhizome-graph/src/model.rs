use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ClusterError;
use crate::spatial::SpatialGrid;

// ─────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────

/// A position in Euclidean 3-space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance (fast path for nearest-node pre-filtering).
    #[inline]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance.
    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

// ─────────────────────────────────────────────
// Link / Node / Edge
// ─────────────────────────────────────────────

/// One adjacency entry: the edge traversed and the node it leads to.
///
/// Both are arena indices into the owning [`Cluster`] — nodes never hold
/// references to each other, so a cluster can be shared read-only across
/// any number of concurrent traversals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub edge: usize,
    pub node: usize,
}

/// A vertex in the cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Index of this node in [`Cluster::nodes`].
    pub index: usize,

    /// Spatial position.
    pub position: Vec3,

    /// Adjacency links to neighboring nodes.
    pub links: Vec<Link>,
}

impl Node {
    pub fn degree(&self) -> usize {
        self.links.len()
    }
}

/// An undirected edge between two node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Index of this edge in [`Cluster::edges`].
    pub index: usize,
    pub a: usize,
    pub b: usize,
}

impl Edge {
    /// The endpoint that is not `node`.
    #[inline]
    pub fn other(&self, node: usize) -> usize {
        if self.a == node { self.b } else { self.a }
    }
}

// ─────────────────────────────────────────────
// Cluster
// ─────────────────────────────────────────────

/// The node-and-edge graph a diffusion run grows over.
///
/// Flat arenas with index-based adjacency. Immutable once built — all
/// mutation during a run happens in per-instance state, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Cluster {
    /// Build a cluster from node positions and an undirected edge list.
    ///
    /// Each edge registers a [`Link`] on both endpoints. Out-of-bounds,
    /// degenerate, and duplicate edges are rejected.
    pub fn new(positions: Vec<Vec3>, edge_pairs: &[(usize, usize)]) -> Result<Self, ClusterError> {
        let count = positions.len();

        let mut nodes: Vec<Node> = positions
            .into_iter()
            .enumerate()
            .map(|(index, position)| Node { index, position, links: Vec::new() })
            .collect();

        let mut edges = Vec::with_capacity(edge_pairs.len());
        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(edge_pairs.len());

        for &(a, b) in edge_pairs {
            if a >= count {
                return Err(ClusterError::NodeOutOfBounds { index: a, count });
            }
            if b >= count {
                return Err(ClusterError::NodeOutOfBounds { index: b, count });
            }
            if a == b {
                return Err(ClusterError::DegenerateEdge(a));
            }
            let key = (a.min(b), a.max(b));
            if !seen.insert(key) {
                return Err(ClusterError::DuplicateEdge { a, b });
            }

            let index = edges.len();
            edges.push(Edge { index, a, b });
            nodes[a].links.push(Link { edge: index, node: b });
            nodes[b].links.push(Link { edge: index, node: a });
        }

        Ok(Self { nodes, edges })
    }

    // ── Queries ────────────────────────────────────────

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    #[inline]
    pub fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    /// Position of a node.
    #[inline]
    pub fn position(&self, index: usize) -> Vec3 {
        self.nodes[index].position
    }

    /// Geometric length of the edge between two adjacent nodes.
    #[inline]
    pub fn link_distance(&self, from: usize, link: Link) -> f64 {
        self.nodes[from].position.distance(&self.nodes[link.node].position)
    }

    /// Index of the node closest to `position`, or `None` on an empty cluster.
    ///
    /// Uses `grid` when provided, otherwise a linear scan. Depending on the
    /// dataset either one may be faster; the caller picks.
    pub fn nearest_node(&self, position: Vec3, grid: Option<&SpatialGrid>) -> Option<usize> {
        if let Some(grid) = grid {
            return grid.nearest(self, position);
        }
        self.nearest_node_linear(position)
    }

    pub(crate) fn nearest_node_linear(&self, position: Vec3) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for node in &self.nodes {
            let d = node.position.distance_squared(&position);
            match best {
                Some((_, bd)) if bd <= d => {}
                _ => best = Some((node.index, d)),
            }
        }
        best.map(|(index, _)| index)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
