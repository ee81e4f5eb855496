use rayon::prelude::*;
use rhizome_graph::Cluster;

use crate::blend::{BlendOperationSet, SeedForwarder};
use crate::instance::{DiffusionInstance, DiffusionState};
use crate::paths;

// ─────────────────────────────────────────────
// DiffusionReport
// ─────────────────────────────────────────────

/// Per-node outputs of a completed run, merged across all instances.
///
/// Nodes no instance captured keep the defaults: depth -1, distance 0,
/// order -1, ending false.
#[derive(Debug, Clone)]
pub struct DiffusionReport {
    /// Hop depth at which each node was captured.
    pub depth: Vec<i32>,
    /// Cumulative traveled distance at capture.
    pub distance: Vec<f64>,
    /// Capture rank within the owning instance. Written here, at blend
    /// time — growth never populates it.
    pub order: Vec<i32>,
    /// True for capture-tree leaves.
    pub ending: Vec<bool>,
    /// Captured node count per instance, in instance order.
    pub capture_counts: Vec<usize>,
}

impl DiffusionReport {
    pub fn empty(node_count: usize) -> Self {
        Self {
            depth: vec![-1; node_count],
            distance: vec![0.0; node_count],
            order: vec![-1; node_count],
            ending: vec![false; node_count],
            capture_counts: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────
// BlendApplier
// ─────────────────────────────────────────────

/// Terminal phase: once every instance is `Stopped`, carry seed attribute
/// values onto captured nodes and emit the per-node outputs.
///
/// The blend pass runs instances in parallel — captured sets are disjoint
/// by claim construction, so each instance writes its own nodes only.
pub struct BlendApplier<'a> {
    blend: &'a BlendOperationSet,
    forwarder: Option<&'a dyn SeedForwarder>,
}

impl<'a> BlendApplier<'a> {
    pub fn new(blend: &'a BlendOperationSet, forwarder: Option<&'a dyn SeedForwarder>) -> Self {
        Self { blend, forwarder }
    }

    /// Diffuse every instance and merge the results.
    pub fn apply(
        &self,
        instances: &mut [DiffusionInstance],
        cluster: &Cluster,
    ) -> DiffusionReport {
        debug_assert!(
            instances.iter().all(|i| i.state() == DiffusionState::Stopped),
            "blending requires every instance to be stopped"
        );

        // Parallel write phase: blend ops and forwarding, disjoint targets
        // per instance.
        instances.par_iter().for_each(|instance| {
            let captured = instance.captured();
            let seed_node = instance.seed().node;

            for candidate in captured {
                if candidate.node != seed_node {
                    self.blend.blend(seed_node, candidate.node);
                }
            }

            if let Some(forwarder) = self.forwarder {
                if let Some(origin) = instance.seed().origin {
                    let targets: Vec<usize> = captured.iter().map(|c| c.node).collect();
                    forwarder.forward(origin, &targets);
                }
            }
        });

        // Serial merge of the diagnostic outputs.
        let mut report = DiffusionReport::empty(cluster.node_count());
        for instance in instances.iter_mut() {
            let captured = instance.captured();
            for (rank, candidate) in captured.iter().enumerate() {
                report.depth[candidate.node] = candidate.depth as i32;
                report.distance[candidate.node] = candidate.distance;
                report.order[candidate.node] = rank as i32;
            }
            for endpoint in paths::endpoints(instance) {
                report.ending[captured[endpoint].node] = true;
            }
            report.capture_counts.push(captured.len());
            instance.mark_diffused();
        }

        report
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
