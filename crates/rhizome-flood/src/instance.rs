use ordered_float::OrderedFloat;
use rhizome_graph::Cluster;

use crate::claim::InfluenceClaimTable;
use crate::config::{FillConfig, FillPriority, SortDirection};
use crate::heuristics::{HeuristicsProvider, ScoringOptions, TravelState};
use crate::seeds::Seed;

// ─────────────────────────────────────────────
// Candidate
// ─────────────────────────────────────────────

/// One speculative expansion option on an instance's frontier.
///
/// Created at probe time, private to its instance. Being on the frontier
/// does not imply capture — a candidate can lose its node to another
/// instance between probe and acceptance.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub node: usize,
    /// Hop count from the seed.
    pub depth: u32,
    /// Frontier ordering key, accumulated per the scoring options.
    pub score: f64,
    /// Running sum of raw edge scores along the capture path.
    pub path_score: f64,
    /// Cumulative traveled distance from the seed.
    pub distance: f64,
    /// Node this candidate was probed from; `None` only for the seed.
    pub parent: Option<usize>,
}

// ─────────────────────────────────────────────
// DiffusionState
// ─────────────────────────────────────────────

/// Discrete lifecycle of a diffusion instance. The scheduler owns every
/// transition — an instance never steps itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffusionState {
    NotStarted,
    /// Ready for a `grow` step.
    Growing,
    /// A `grow` step ran; staged candidates await `post_grow`.
    Sorting,
    /// Growth is finished; captured set is final.
    Stopped,
    /// Blending ran. Terminal.
    Diffused,
}

// ─────────────────────────────────────────────
// DiffusionInstance
// ─────────────────────────────────────────────

/// Per-seed growth state machine:
/// `NotStarted → Growing ⇄ Sorting → Stopped → Diffused`.
///
/// Everything here is private to the instance except the claim table,
/// which is passed in explicitly on every `grow`.
pub struct DiffusionInstance {
    seed: Seed,
    state: DiffusionState,
    stopped: bool,

    visited: Vec<bool>,
    frontier: Vec<Candidate>,
    staged: Vec<Candidate>,
    captured: Vec<Candidate>,

    // Limits resolved per seed at construction.
    rate: u32,
    count_limit: u32,
    depth_limit: u32,
    distance_limit: f64,

    max_depth: u32,
    max_distance: f64,

    priority: FillPriority,
    direction: SortDirection,
    scoring: ScoringOptions,
    travel: TravelState,
}

impl DiffusionInstance {
    /// Resolve per-seed limits from `config` and allocate growth state.
    pub fn new(seed: Seed, config: &FillConfig, node_count: usize) -> Self {
        Self {
            seed,
            state: DiffusionState::NotStarted,
            stopped: false,
            visited: vec![false; node_count],
            frontier: Vec::new(),
            staged: Vec::new(),
            captured: Vec::new(),
            // A zero rate would never pop and never stop.
            rate: config.fill_rate.read(&seed).max(1),
            count_limit: config.count_limit.read(&seed),
            depth_limit: config.depth_limit.read(&seed),
            distance_limit: config.distance_limit.read(&seed),
            max_depth: 0,
            max_distance: 0.0,
            priority: config.priority,
            direction: config.direction,
            scoring: config.scoring,
            travel: TravelState::default(),
        }
    }

    // ── Accessors ──────────────────────────────────────

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn state(&self) -> DiffusionState {
        self.state
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// All accepted candidates, seed first, in capture order.
    pub fn captured(&self) -> &[Candidate] {
        &self.captured
    }

    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|&&v| v).count()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub(crate) fn mark_diffused(&mut self) {
        debug_assert_eq!(self.state, DiffusionState::Stopped);
        self.state = DiffusionState::Diffused;
    }

    // ── Init ───────────────────────────────────────────

    /// Mark the seed visited and captured at depth 0, claim it, and run
    /// the first probing pass.
    pub fn init(
        &mut self,
        cluster: &Cluster,
        heuristics: &dyn HeuristicsProvider,
        claims: &InfluenceClaimTable,
    ) {
        debug_assert_eq!(self.state, DiffusionState::NotStarted);

        self.visited[self.seed.node] = true;
        let _ = claims.try_claim(self.seed.node);

        let seed_candidate = Candidate {
            node: self.seed.node,
            depth: 0,
            score: 0.0,
            path_score: 0.0,
            distance: 0.0,
            parent: None,
        };
        self.captured.push(seed_candidate.clone());
        self.probe(&seed_candidate, cluster, heuristics);
        self.sort_frontier();

        self.state = DiffusionState::Growing;
    }

    // ── Probe ──────────────────────────────────────────

    /// Push a candidate for every unvisited neighbor of `from`.
    ///
    /// Nodes are marked visited at probe time, not at acceptance — the
    /// first frontier to reach a node owns the only pending path to it,
    /// even if a better-scored path would have existed. A neighbor past
    /// the distance limit is discarded *without* the visited mark, so a
    /// shorter path found later may still probe it.
    fn probe(&mut self, from: &Candidate, cluster: &Cluster, heuristics: &dyn HeuristicsProvider) {
        if from.depth >= self.depth_limit {
            return;
        }

        let from_node = cluster.node(from.node);
        let seed_node = cluster.node(self.seed.node);
        let goal = heuristics.roaming_goal().map(|index| cluster.node(index));

        for link in &from_node.links {
            if self.visited[link.node] {
                continue;
            }

            let distance = from.distance + cluster.link_distance(from.node, *link);
            if distance > self.distance_limit {
                continue;
            }
            self.visited[link.node] = true;

            let mut score = 0.0;
            let mut path_score = 0.0;
            if self.scoring.needs_edge_score() {
                let local = heuristics.edge_score(
                    cluster,
                    from_node,
                    cluster.node(link.node),
                    cluster.edge(link.edge),
                    seed_node,
                    goal,
                    &mut self.travel,
                );
                if self.scoring.previous {
                    path_score = from.path_score + local;
                    score += from.path_score;
                }
                if self.scoring.local {
                    score += local;
                }
            }
            if self.scoring.global {
                score += heuristics.global_score(cluster, from_node, seed_node, goal);
            }

            self.frontier.push(Candidate {
                node: link.node,
                depth: from.depth + 1,
                score,
                path_score,
                distance,
                parent: Some(from.node),
            });
        }
    }

    // ── Grow ───────────────────────────────────────────

    /// Pop up to `rate` candidates from the frontier tail and stage the
    /// ones whose nodes are still unclaimed.
    ///
    /// A candidate losing its node to another instance is discarded
    /// without consuming an acceptance slot. Sets `stopped` when frontier
    /// and staged are both drained, or when captured + staged reaches the
    /// count limit.
    pub fn grow(&mut self, claims: &InfluenceClaimTable) {
        if self.stopped || self.state != DiffusionState::Growing {
            return;
        }

        let mut budget = self.rate;
        while budget > 0 {
            if (self.captured.len() + self.staged.len()) as u32 >= self.count_limit {
                self.stopped = true;
                break;
            }
            let Some(candidate) = self.frontier.pop() else {
                break;
            };
            if !claims.try_claim(candidate.node) {
                // Claimed elsewhere since the probe; no slot consumed.
                continue;
            }

            self.max_depth = self.max_depth.max(candidate.depth);
            self.max_distance = self.max_distance.max(candidate.distance);
            self.staged.push(candidate);
            budget -= 1;

            if (self.captured.len() + self.staged.len()) as u32 >= self.count_limit {
                self.stopped = true;
                break;
            }
        }

        if self.frontier.is_empty() && self.staged.is_empty() {
            self.stopped = true;
        }

        self.state = DiffusionState::Sorting;
    }

    // ── PostGrow ───────────────────────────────────────

    /// Merge staged candidates into the captured list, probe from each of
    /// them, and re-sort the frontier.
    ///
    /// The merge happens even on a stopped instance — a `grow` that hit
    /// the count limit stops with candidates still staged, and those are
    /// accepted captures. Only the probing and sorting are skipped.
    pub fn post_grow(&mut self, cluster: &Cluster, heuristics: &dyn HeuristicsProvider) {
        if self.state != DiffusionState::Sorting {
            return;
        }

        let first_new = self.captured.len();
        self.captured.append(&mut self.staged);

        if self.stopped {
            self.state = DiffusionState::Stopped;
            return;
        }

        for index in first_new..self.captured.len() {
            let candidate = self.captured[index].clone();
            self.probe(&candidate, cluster, heuristics);
        }
        self.sort_frontier();

        self.state = DiffusionState::Growing;
    }

    /// Keep the frontier ordered so the tail holds the next pop.
    ///
    /// Ascending direction pops the lowest key first, so the array is
    /// sorted descending (and vice versa). Ties break on the other key.
    fn sort_frontier(&mut self) {
        let direction = self.direction;
        match self.priority {
            FillPriority::Score => self.frontier.sort_by(|a, b| {
                let ord = OrderedFloat(a.score)
                    .cmp(&OrderedFloat(b.score))
                    .then(a.depth.cmp(&b.depth));
                match direction {
                    SortDirection::Ascending => ord.reverse(),
                    SortDirection::Descending => ord,
                }
            }),
            FillPriority::Depth => self.frontier.sort_by(|a, b| {
                let ord = a
                    .depth
                    .cmp(&b.depth)
                    .then(OrderedFloat(a.score).cmp(&OrderedFloat(b.score)));
                match direction {
                    SortDirection::Ascending => ord.reverse(),
                    SortDirection::Descending => ord,
                }
            }),
        }
    }
}

impl std::fmt::Debug for DiffusionInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffusionInstance")
            .field("seed", &self.seed)
            .field("state", &self.state)
            .field("captured", &self.captured.len())
            .field("frontier", &self.frontier.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::UniformHeuristics;
    use crate::settings::SettingValue;
    use rhizome_graph::Vec3;

    fn line_cluster(n: usize) -> Cluster {
        let positions: Vec<Vec3> = (0..n).map(|i| Vec3::new(i as f64, 0.0, 0.0)).collect();
        let edges: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        Cluster::new(positions, &edges).unwrap()
    }

    fn seed(node: usize) -> Seed {
        Seed { node, origin: None }
    }

    fn drive_to_stop(
        instance: &mut DiffusionInstance,
        cluster: &Cluster,
        heuristics: &dyn HeuristicsProvider,
        claims: &InfluenceClaimTable,
    ) {
        instance.init(cluster, heuristics, claims);
        while !instance.stopped() {
            instance.grow(claims);
            instance.post_grow(cluster, heuristics);
        }
        assert_eq!(instance.state(), DiffusionState::Stopped);
    }

    #[test]
    fn init_captures_seed_at_depth_zero_and_claims_it() {
        let cluster = line_cluster(3);
        let claims = InfluenceClaimTable::new(3);
        let h = UniformHeuristics::new(1.0);
        let mut instance = DiffusionInstance::new(seed(1), &FillConfig::default(), 3);

        instance.init(&cluster, &h, &claims);

        assert_eq!(instance.captured().len(), 1);
        assert_eq!(instance.captured()[0].node, 1);
        assert_eq!(instance.captured()[0].depth, 0);
        assert!(claims.is_claimed(1));
        // Both neighbors probed and marked visited.
        assert_eq!(instance.visited_count(), 3);
    }

    #[test]
    fn unlimited_run_captures_whole_line_with_hop_depths() {
        let cluster = line_cluster(5);
        let claims = InfluenceClaimTable::new(5);
        let h = UniformHeuristics::new(1.0);
        let mut instance = DiffusionInstance::new(seed(0), &FillConfig::default(), 5);

        drive_to_stop(&mut instance, &cluster, &h, &claims);

        assert_eq!(instance.captured().len(), 5);
        for candidate in instance.captured() {
            assert_eq!(candidate.depth as usize, candidate.node);
        }
        assert_eq!(instance.max_depth(), 4);
        assert!((instance.max_distance() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn distance_limit_zero_never_expands() {
        let cluster = line_cluster(3);
        let claims = InfluenceClaimTable::new(3);
        let h = UniformHeuristics::new(1.0);
        let config = FillConfig {
            distance_limit: SettingValue::Constant(0.0),
            ..FillConfig::default()
        };
        let mut instance = DiffusionInstance::new(seed(1), &config, 3);

        drive_to_stop(&mut instance, &cluster, &h, &claims);

        assert_eq!(instance.captured().len(), 1);
        // Distance-discarded neighbors must stay unvisited.
        assert_eq!(instance.visited_count(), 1);
    }

    #[test]
    fn depth_limit_gates_probing() {
        let cluster = line_cluster(5);
        let claims = InfluenceClaimTable::new(5);
        let h = UniformHeuristics::new(1.0);
        let config = FillConfig {
            depth_limit: SettingValue::Constant(1),
            ..FillConfig::default()
        };
        let mut instance = DiffusionInstance::new(seed(2), &config, 5);

        drive_to_stop(&mut instance, &cluster, &h, &claims);

        // Seed plus both depth-1 neighbors; no probe past depth 1.
        assert_eq!(instance.captured().len(), 3);
        assert_eq!(instance.max_depth(), 1);
    }

    #[test]
    fn count_limit_stops_exactly_and_keeps_staged_captures() {
        let cluster = line_cluster(5);
        let claims = InfluenceClaimTable::new(5);
        let h = UniformHeuristics::new(1.0);
        let config = FillConfig {
            count_limit: SettingValue::Constant(3),
            fill_rate: SettingValue::Constant(4),
            ..FillConfig::default()
        };
        let mut instance = DiffusionInstance::new(seed(0), &config, 5);

        drive_to_stop(&mut instance, &cluster, &h, &claims);

        assert_eq!(instance.captured().len(), 3);
    }

    #[test]
    fn claimed_candidate_is_discarded_without_consuming_a_slot() {
        let cluster = line_cluster(4);
        let claims = InfluenceClaimTable::new(4);
        let h = UniformHeuristics::new(1.0);
        let config = FillConfig {
            fill_rate: SettingValue::Constant(1),
            ..FillConfig::default()
        };
        let mut instance = DiffusionInstance::new(seed(0), &config, 4);

        instance.init(&cluster, &h, &claims);
        // Another instance takes node 1 between probe and acceptance.
        assert!(claims.try_claim(1));

        instance.grow(&claims);
        instance.post_grow(&cluster, &h);

        // The only frontier entry was discarded; nothing new captured, and
        // with frontier and staged both empty the instance stopped.
        assert_eq!(instance.captured().len(), 1);
        assert!(instance.stopped());
    }

    #[test]
    fn surrounded_seed_stops_with_minimal_capture() {
        let cluster = line_cluster(3);
        let claims = InfluenceClaimTable::new(3);
        let h = UniformHeuristics::new(1.0);
        claims.try_claim(0);
        claims.try_claim(2);

        let mut instance = DiffusionInstance::new(seed(1), &FillConfig::default(), 3);
        drive_to_stop(&mut instance, &cluster, &h, &claims);

        assert_eq!(instance.captured().len(), 1);
        assert_eq!(instance.captured()[0].node, 1);
    }

    #[test]
    fn visited_set_is_monotone_across_steps() {
        let cluster = line_cluster(6);
        let claims = InfluenceClaimTable::new(6);
        let h = UniformHeuristics::new(1.0);
        let mut instance = DiffusionInstance::new(seed(0), &FillConfig::default(), 6);

        instance.init(&cluster, &h, &claims);
        let mut last = instance.visited_count();
        while !instance.stopped() {
            instance.grow(&claims);
            instance.post_grow(&cluster, &h);
            let now = instance.visited_count();
            assert!(now >= last, "visited set shrank: {last} -> {now}");
            last = now;
        }
    }

    #[test]
    fn grow_on_stopped_instance_is_a_no_op() {
        let cluster = line_cluster(2);
        let claims = InfluenceClaimTable::new(2);
        let h = UniformHeuristics::new(1.0);
        let mut instance = DiffusionInstance::new(seed(0), &FillConfig::default(), 2);

        drive_to_stop(&mut instance, &cluster, &h, &claims);
        let captured = instance.captured().len();

        instance.grow(&claims);
        assert_eq!(instance.captured().len(), captured);
        assert_eq!(instance.state(), DiffusionState::Stopped);
    }

    #[test]
    fn score_priority_pops_cheapest_path_first() {
        // Star: seed 0 connected to 1 and 2; edge to 2 is longer.
        let cluster = Cluster::new(
            vec![
                Vec3::ZERO,
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(5.0, 0.0, 0.0),
            ],
            &[(0, 1), (0, 2)],
        )
        .unwrap();
        let claims = InfluenceClaimTable::new(3);
        let h = crate::heuristics::EdgeLengthHeuristics;
        let config = FillConfig {
            fill_rate: SettingValue::Constant(1),
            ..FillConfig::default()
        };
        let mut instance = DiffusionInstance::new(seed(0), &config, 3);

        instance.init(&cluster, &h, &claims);
        instance.grow(&claims);
        instance.post_grow(&cluster, &h);

        // Cheapest edge (to node 1) accepted first.
        assert_eq!(instance.captured()[1].node, 1);
    }
}
