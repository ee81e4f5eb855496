use rhizome_graph::Cluster;
use tracing::{debug, info, warn};

use crate::apply::{BlendApplier, DiffusionReport};
use crate::blend::{BlendOpFactory, BlendOperationSet, SeedForwarder};
use crate::claim::InfluenceClaimTable;
use crate::config::FillConfig;
use crate::error::FloodError;
use crate::heuristics::HeuristicsProvider;
use crate::instance::DiffusionInstance;
use crate::scheduler::GrowthScheduler;
use crate::seeds::SeedSelector;

// ─────────────────────────────────────────────
// FloodFillOutcome
// ─────────────────────────────────────────────

/// Everything a completed run produced: the merged per-node report plus
/// the diffused instances, kept for path reconstruction.
#[derive(Debug)]
pub struct FloodFillOutcome {
    pub report: DiffusionReport,
    pub instances: Vec<DiffusionInstance>,
}

// ─────────────────────────────────────────────
// FloodFillEngine
// ─────────────────────────────────────────────

/// Facade over a full diffusion run:
/// resolve seeds → init one instance per seed → schedule growth →
/// blend + report.
///
/// Stateless between runs — build once, call [`run`](Self::run) many
/// times. The claim table is passed in explicitly and reset here at the
/// start of every run.
#[derive(Debug, Default)]
pub struct FloodFillEngine {
    pub config: FillConfig,
}

impl FloodFillEngine {
    pub fn new(config: FillConfig) -> Self {
        Self { config }
    }

    /// Execute one diffusion run against `cluster`.
    ///
    /// Blend operations are constructed up front; a factory failure is
    /// fatal and no instance starts. A run that resolves no seeds is a
    /// no-op, not an error.
    pub fn run(
        &self,
        cluster: &Cluster,
        claims: &InfluenceClaimTable,
        seeds: &dyn SeedSelector,
        heuristics: &dyn HeuristicsProvider,
        blend_factories: &[&dyn BlendOpFactory],
        forwarder: Option<&dyn SeedForwarder>,
    ) -> Result<FloodFillOutcome, FloodError> {
        if claims.len() != cluster.node_count() {
            return Err(FloodError::ClaimTableMismatch {
                table: claims.len(),
                cluster: cluster.node_count(),
            });
        }
        claims.reset();

        // Fail fast: no partial operation set ever diffuses.
        let blend = BlendOperationSet::from_factories(blend_factories)?;

        let resolved = seeds.resolve(cluster);
        if resolved.is_empty() {
            warn!("no seeds resolved; diffusion run is a no-op");
            return Ok(FloodFillOutcome {
                report: DiffusionReport::empty(cluster.node_count()),
                instances: Vec::new(),
            });
        }
        debug!(seeds = resolved.len(), "seeds resolved");

        // One instance per seed, initialized in seed order so claims on
        // shared seed nodes are deterministic.
        let mut instances: Vec<DiffusionInstance> = resolved
            .into_iter()
            .map(|seed| DiffusionInstance::new(seed, &self.config, cluster.node_count()))
            .collect();
        for instance in instances.iter_mut() {
            instance.init(cluster, heuristics, claims);
        }

        let scheduler = GrowthScheduler::new(&self.config)?;
        scheduler.run(&mut instances, cluster, heuristics, claims);

        let applier = BlendApplier::new(&blend, forwarder);
        let report = applier.apply(&mut instances, cluster);

        info!(
            instances = instances.len(),
            captured = report.capture_counts.iter().sum::<usize>(),
            "diffusion run complete"
        );

        Ok(FloodFillOutcome { report, instances })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::BlendOp;
    use crate::heuristics::UniformHeuristics;
    use crate::seeds::{FilteredSelector, ProximitySelector};
    use rhizome_graph::{Node, Vec3};

    fn line_cluster(n: usize) -> Cluster {
        let positions: Vec<Vec3> = (0..n).map(|i| Vec3::new(i as f64, 0.0, 0.0)).collect();
        let edges: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        Cluster::new(positions, &edges).unwrap()
    }

    struct FailingFactory;

    impl BlendOpFactory for FailingFactory {
        fn create(&self) -> Result<Box<dyn BlendOp>, FloodError> {
            Err(FloodError::BlendSetup("unresolvable attribute".into()))
        }
    }

    #[test]
    fn no_seeds_is_a_no_op() {
        let cluster = line_cluster(4);
        let claims = InfluenceClaimTable::new(4);
        let engine = FloodFillEngine::default();
        let selector = FilteredSelector::new(|_: &Node| false);

        let outcome = engine
            .run(&cluster, &claims, &selector, &UniformHeuristics::new(1.0), &[], None)
            .unwrap();

        assert!(outcome.instances.is_empty());
        assert!(outcome.report.depth.iter().all(|&d| d == -1));
        for node in 0..4 {
            assert_eq!(claims.count(node), 0);
        }
    }

    #[test]
    fn blend_factory_failure_aborts_before_any_instance_starts() {
        let cluster = line_cluster(4);
        let claims = InfluenceClaimTable::new(4);
        let engine = FloodFillEngine::default();
        let selector = FilteredSelector::new(|node: &Node| node.index == 0);

        let result = engine.run(
            &cluster,
            &claims,
            &selector,
            &UniformHeuristics::new(1.0),
            &[&FailingFactory],
            None,
        );

        assert!(matches!(result, Err(FloodError::BlendSetup(_))));
        // Fail-fast: nothing was claimed.
        for node in 0..4 {
            assert_eq!(claims.count(node), 0);
        }
    }

    #[test]
    fn claim_table_size_mismatch_is_rejected() {
        let cluster = line_cluster(4);
        let claims = InfluenceClaimTable::new(3);
        let engine = FloodFillEngine::default();
        let selector = FilteredSelector::new(|_: &Node| true);

        let result = engine.run(
            &cluster,
            &claims,
            &selector,
            &UniformHeuristics::new(1.0),
            &[],
            None,
        );
        assert!(matches!(result, Err(FloodError::ClaimTableMismatch { .. })));
    }

    #[test]
    fn run_resets_the_claim_table_between_runs() {
        let cluster = line_cluster(3);
        let claims = InfluenceClaimTable::new(3);
        let engine = FloodFillEngine::default();
        let selector = ProximitySelector::new(vec![Vec3::ZERO], 0.5);
        let h = UniformHeuristics::new(1.0);

        let first = engine.run(&cluster, &claims, &selector, &h, &[], None).unwrap();
        let second = engine.run(&cluster, &claims, &selector, &h, &[], None).unwrap();

        // Identical capture both times; stale claims would have blocked
        // the second run entirely.
        assert_eq!(first.report.capture_counts, second.report.capture_counts);
        assert_eq!(second.report.capture_counts, vec![3]);
    }

    #[test]
    fn full_run_covers_the_cluster() {
        let cluster = line_cluster(6);
        let claims = InfluenceClaimTable::new(6);
        let engine = FloodFillEngine::default();
        let selector = ProximitySelector::new(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)],
            0.5,
        );

        let outcome = engine
            .run(&cluster, &claims, &selector, &UniformHeuristics::new(1.0), &[], None)
            .unwrap();

        assert_eq!(outcome.instances.len(), 2);
        let total: usize = outcome.report.capture_counts.iter().sum();
        assert_eq!(total, 6);
        for node in 0..6 {
            assert_eq!(claims.count(node), 1, "node {node} claim count");
            assert!(outcome.report.depth[node] >= 0);
        }
    }
}
