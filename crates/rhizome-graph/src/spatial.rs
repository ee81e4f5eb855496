use std::collections::HashMap;

use crate::model::{Cluster, Vec3};

// ─────────────────────────────────────────────
// SpatialGrid
// ─────────────────────────────────────────────

/// Uniform hash-grid over node positions for nearest-node queries.
///
/// Nodes are bucketed into cubic cells; a query walks outward in cell
/// rings until a candidate is found, then one extra ring to rule out a
/// closer node straddling a cell boundary. Rebuilt from scratch when the
/// cluster changes — the cluster itself is immutable during a run, so in
/// practice this is built once per run at most.
#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<(i64, i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    /// Build a grid over every node of `cluster`.
    ///
    /// `cell_size` must be positive; the average edge length is a good pick.
    pub fn build(cluster: &Cluster, cell_size: f64) -> Self {
        debug_assert!(cell_size > 0.0, "cell_size must be positive");
        let mut cells: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
        for node in cluster.nodes() {
            cells
                .entry(Self::cell_of(node.position, cell_size))
                .or_default()
                .push(node.index);
        }
        Self { cell_size, cells }
    }

    #[inline]
    fn cell_of(p: Vec3, cell_size: f64) -> (i64, i64, i64) {
        (
            (p.x / cell_size).floor() as i64,
            (p.y / cell_size).floor() as i64,
            (p.z / cell_size).floor() as i64,
        )
    }

    /// Index of the node closest to `position`, or `None` on an empty grid.
    pub fn nearest(&self, cluster: &Cluster, position: Vec3) -> Option<usize> {
        if self.cells.is_empty() {
            return None;
        }

        let origin = Self::cell_of(position, self.cell_size);
        let mut best: Option<(usize, f64)> = None;
        let mut ring = 0i64;

        loop {
            self.for_ring(origin, ring, |cell| {
                if let Some(indices) = self.cells.get(&cell) {
                    for &index in indices {
                        let d = cluster.position(index).distance_squared(&position);
                        match best {
                            Some((_, bd)) if bd <= d => {}
                            _ => best = Some((index, d)),
                        }
                    }
                }
            });

            ring += 1;

            match best {
                // A cell at Chebyshev ring r is at least (r-1)·cell away in
                // Euclidean distance; once that lower bound exceeds the best
                // candidate, no further ring can improve on it.
                Some((_, best_d2)) => {
                    if ((ring - 1) as f64) * self.cell_size > best_d2.sqrt() {
                        break;
                    }
                }
                // A sparse grid with a far-away query could spin through many
                // empty rings; give up on the walk and finish linearly.
                None => {
                    if ring > 64 {
                        return cluster.nearest_node_linear(position);
                    }
                }
            }
        }

        best.map(|(index, _)| index)
    }

    /// Visit every cell on the hollow cube shell at Chebyshev radius `ring`.
    fn for_ring(&self, origin: (i64, i64, i64), ring: i64, mut visit: impl FnMut((i64, i64, i64))) {
        if ring == 0 {
            visit(origin);
            return;
        }
        let (ox, oy, oz) = origin;
        for dx in -ring..=ring {
            for dy in -ring..=ring {
                for dz in -ring..=ring {
                    if dx.abs().max(dy.abs()).max(dz.abs()) != ring {
                        continue;
                    }
                    visit((ox + dx, oy + dy, oz + dz));
                }
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
