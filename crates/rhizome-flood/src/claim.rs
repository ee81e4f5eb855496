use std::sync::atomic::{AtomicU32, Ordering};

// ─────────────────────────────────────────────
// InfluenceClaimTable
// ─────────────────────────────────────────────

/// Shared per-node claim counters: 0 = unclaimed, 1 = claimed by exactly
/// one diffusion instance.
///
/// The table is the only state mutated by more than one instance, so the
/// claim itself is a single `compare_exchange` — in Parallel mode several
/// instances call [`try_claim`](Self::try_claim) concurrently and exactly
/// one may win a contested node. Lives for one run; call
/// [`reset`](Self::reset) before reuse.
#[derive(Debug)]
pub struct InfluenceClaimTable {
    counters: Vec<AtomicU32>,
}

impl InfluenceClaimTable {
    pub fn new(node_count: usize) -> Self {
        Self {
            counters: (0..node_count).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Attempt to claim `node`. Returns `true` iff this call won the claim.
    #[inline]
    pub fn try_claim(&self, node: usize) -> bool {
        self.counters[node]
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub fn is_claimed(&self, node: usize) -> bool {
        self.counters[node].load(Ordering::Acquire) >= 1
    }

    /// Raw counter value. With claims going through
    /// [`try_claim`](Self::try_claim) this is always 0 or 1.
    #[inline]
    pub fn count(&self, node: usize) -> u32 {
        self.counters[node].load(Ordering::Acquire)
    }

    /// Zero every counter, readying the table for the next run.
    pub fn reset(&self) {
        for counter in &self.counters {
            counter.store(0, Ordering::Release);
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
