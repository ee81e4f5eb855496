use rhizome_graph::{Cluster, Edge, Node};

// ─────────────────────────────────────────────
// TravelState
// ─────────────────────────────────────────────

/// Opaque per-instance accumulator handed to the heuristics provider on
/// every edge evaluation.
///
/// The engine creates one per diffusion instance and otherwise never
/// touches it; a provider that tracks path history, momentum, or any
/// other running quantity stashes it here.
#[derive(Debug, Default)]
pub struct TravelState {
    pub scratch: Vec<f64>,
}

// ─────────────────────────────────────────────
// HeuristicsProvider
// ─────────────────────────────────────────────

/// Externally supplied edge scoring, injected into every diffusion
/// instance. Scores prioritize the frontier; lower scores pop first under
/// the default ascending sort direction.
pub trait HeuristicsProvider: Send + Sync {
    /// Score for traversing `edge` from `from` to `to`, growing from
    /// `seed` toward `goal` (the roaming goal, when one exists).
    #[allow(clippy::too_many_arguments)]
    fn edge_score(
        &self,
        cluster: &Cluster,
        from: &Node,
        to: &Node,
        edge: &Edge,
        seed: &Node,
        goal: Option<&Node>,
        travel: &mut TravelState,
    ) -> f64;

    /// Seed-to-goal oriented score, independent of the local edge.
    fn global_score(&self, _cluster: &Cluster, _from: &Node, _seed: &Node, _goal: Option<&Node>) -> f64 {
        0.0
    }

    /// Node the diffusion loosely grows toward, if the provider has one.
    fn roaming_goal(&self) -> Option<usize> {
        None
    }
}

/// Constant edge score — every edge costs the same, so the frontier
/// degenerates to pure depth/insertion ordering. The usual pick for tests
/// and for purely geometric fills.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformHeuristics {
    pub edge_cost: f64,
}

impl UniformHeuristics {
    pub fn new(edge_cost: f64) -> Self {
        Self { edge_cost }
    }
}

impl HeuristicsProvider for UniformHeuristics {
    fn edge_score(
        &self,
        _cluster: &Cluster,
        _from: &Node,
        _to: &Node,
        _edge: &Edge,
        _seed: &Node,
        _goal: Option<&Node>,
        _travel: &mut TravelState,
    ) -> f64 {
        self.edge_cost
    }
}

/// Scores each edge by its geometric length.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeLengthHeuristics;

impl HeuristicsProvider for EdgeLengthHeuristics {
    fn edge_score(
        &self,
        cluster: &Cluster,
        from: &Node,
        to: &Node,
        _edge: &Edge,
        _seed: &Node,
        _goal: Option<&Node>,
        _travel: &mut TravelState,
    ) -> f64 {
        cluster.position(from.index).distance(&cluster.position(to.index))
    }
}

// ─────────────────────────────────────────────
// ScoringOptions
// ─────────────────────────────────────────────

/// Which score components feed a candidate's frontier ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringOptions {
    /// Add the local edge score of the probed link.
    pub local: bool,
    /// Add the accumulated path score of the node probed from.
    pub previous: bool,
    /// Add the provider's seed/goal-oriented global score.
    pub global: bool,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        // Local + previous: a candidate's ordering key is the cumulative
        // edge score along its capture path.
        Self { local: true, previous: true, global: false }
    }
}

impl ScoringOptions {
    /// True when the local edge score has to be evaluated at all.
    pub(crate) fn needs_edge_score(&self) -> bool {
        self.local || self.previous
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rhizome_graph::Vec3;

    fn two_node_cluster() -> Cluster {
        Cluster::new(
            vec![Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)],
            &[(0, 1)],
        )
        .unwrap()
    }

    #[test]
    fn uniform_heuristics_scores_constant() {
        let cluster = two_node_cluster();
        let h = UniformHeuristics::new(2.5);
        let mut travel = TravelState::default();
        let score = h.edge_score(
            &cluster,
            cluster.node(0),
            cluster.node(1),
            cluster.edge(0),
            cluster.node(0),
            None,
            &mut travel,
        );
        assert_eq!(score, 2.5);
    }

    #[test]
    fn edge_length_heuristics_scores_distance() {
        let cluster = two_node_cluster();
        let h = EdgeLengthHeuristics;
        let mut travel = TravelState::default();
        let score = h.edge_score(
            &cluster,
            cluster.node(0),
            cluster.node(1),
            cluster.edge(0),
            cluster.node(0),
            None,
            &mut travel,
        );
        assert!((score - 5.0).abs() < 1e-12);
    }

    #[test]
    fn default_scoring_accumulates_along_the_path() {
        let opts = ScoringOptions::default();
        assert!(opts.local && opts.previous && !opts.global);
        assert!(opts.needs_edge_score());
    }

    #[test]
    fn global_only_scoring_skips_edge_score() {
        let opts = ScoringOptions { local: false, previous: false, global: true };
        assert!(!opts.needs_edge_score());
    }
}
