use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;
use rhizome_graph::Cluster;

use crate::claim::InfluenceClaimTable;
use crate::config::{FillConfig, FillProcessing};
use crate::error::FloodError;
use crate::heuristics::HeuristicsProvider;
use crate::instance::DiffusionInstance;

// ─────────────────────────────────────────────
// GrowthScheduler
// ─────────────────────────────────────────────

/// Drives every initialized instance from `Growing` to `Stopped`.
///
/// Two mutually exclusive modes:
/// - **Parallel** — all active instances grow by one step per round, with
///   a barrier between the round's `grow` calls and its `post_grow` pass.
/// - **Sequential** — each worker drives one instance's grow/post_grow
///   loop to completion before taking the next off a shared cursor.
///   Instances started later observe claims made by instances that
///   finished earlier, so run order decides contested nodes.
pub struct GrowthScheduler {
    mode: FillProcessing,
    pool: Option<rayon::ThreadPool>,
}

impl GrowthScheduler {
    pub fn new(config: &FillConfig) -> Result<Self, FloodError> {
        let pool = match config.workers {
            Some(workers) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers.max(1))
                    .build()
                    .map_err(|e| FloodError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Self { mode: config.processing, pool })
    }

    fn worker_count(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
        .max(1)
    }

    fn in_pool<R: Send>(&self, run: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Run every instance to `Stopped`. `instances` keeps its length; the
    /// relative order of entries is preserved.
    pub fn run(
        &self,
        instances: &mut Vec<DiffusionInstance>,
        cluster: &Cluster,
        heuristics: &dyn HeuristicsProvider,
        claims: &InfluenceClaimTable,
    ) {
        if instances.is_empty() {
            return;
        }
        match self.mode {
            FillProcessing::Parallel => self.run_parallel(instances, cluster, heuristics, claims),
            FillProcessing::Sequential => {
                self.run_sequential(instances, cluster, heuristics, claims)
            }
        }
    }

    // ── Parallel ───────────────────────────────────────

    fn run_parallel(
        &self,
        instances: &mut Vec<DiffusionInstance>,
        cluster: &Cluster,
        heuristics: &dyn HeuristicsProvider,
        claims: &InfluenceClaimTable,
    ) {
        self.in_pool(|| {
            // (index, instance) so the incoming order can be restored after
            // the stopped-partition shuffles entries around.
            let mut active: Vec<(usize, DiffusionInstance)> =
                std::mem::take(instances).into_iter().enumerate().collect();
            let mut done: Vec<(usize, DiffusionInstance)> = Vec::with_capacity(active.len());

            while !active.is_empty() {
                // One grow step per active instance; the parallel iterator
                // joining is the round barrier.
                active
                    .par_iter_mut()
                    .for_each(|(_, instance)| instance.grow(claims));

                // Stopped instances still merge their staged captures here;
                // only live ones probe and re-sort.
                active
                    .par_iter_mut()
                    .for_each(|(_, instance)| instance.post_grow(cluster, heuristics));

                let (stopped, ongoing): (Vec<_>, Vec<_>) = active
                    .into_iter()
                    .partition(|(_, instance)| instance.stopped());
                done.extend(stopped);
                active = ongoing;
            }

            done.sort_by_key(|(index, _)| *index);
            *instances = done.into_iter().map(|(_, instance)| instance).collect();
        });
    }

    // ── Sequential ─────────────────────────────────────

    fn run_sequential(
        &self,
        instances: &mut Vec<DiffusionInstance>,
        cluster: &Cluster,
        heuristics: &dyn HeuristicsProvider,
        claims: &InfluenceClaimTable,
    ) {
        let queue: Vec<Mutex<DiffusionInstance>> =
            std::mem::take(instances).into_iter().map(Mutex::new).collect();
        let cursor = AtomicUsize::new(0);
        let workers = self.worker_count().min(queue.len());

        self.in_pool(|| {
            rayon::scope(|scope| {
                for _ in 0..workers {
                    scope.spawn(|_| loop {
                        let index = cursor.fetch_add(1, Ordering::Relaxed);
                        if index >= queue.len() {
                            break;
                        }
                        let mut instance = queue[index].lock();
                        while !instance.stopped() {
                            instance.grow(claims);
                            instance.post_grow(cluster, heuristics);
                        }
                    });
                }
            });
        });

        *instances = queue.into_iter().map(Mutex::into_inner).collect();
    }
}

impl std::fmt::Debug for GrowthScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowthScheduler")
            .field("mode", &self.mode)
            .field("workers", &self.worker_count())
            .finish()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
