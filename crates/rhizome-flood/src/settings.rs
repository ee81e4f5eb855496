use std::fmt;
use std::sync::Arc;

use crate::seeds::Seed;

// ─────────────────────────────────────────────
// SettingValue
// ─────────────────────────────────────────────

/// A per-seed scalar: either a run-wide constant or an attribute lookup
/// keyed by the seed.
///
/// Lookups receive the whole [`Seed`], so a reader can key off the
/// originating point index (proximity seeds) or the node index (filtered
/// seeds) as its backing store requires. A lookup that returns `None` —
/// missing or malformed attribute — falls back to the configured constant
/// rather than failing the run.
#[derive(Clone)]
pub enum SettingValue<T: Copy> {
    Constant(T),
    PerSeed {
        read: Arc<dyn Fn(&Seed) -> Option<T> + Send + Sync>,
        fallback: T,
    },
}

impl<T: Copy> SettingValue<T> {
    pub fn per_seed(
        read: impl Fn(&Seed) -> Option<T> + Send + Sync + 'static,
        fallback: T,
    ) -> Self {
        Self::PerSeed { read: Arc::new(read), fallback }
    }

    /// Resolve the value for one seed.
    pub fn read(&self, seed: &Seed) -> T {
        match self {
            Self::Constant(value) => *value,
            Self::PerSeed { read, fallback } => read(seed).unwrap_or(*fallback),
        }
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for SettingValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::PerSeed { fallback, .. } => {
                f.debug_struct("PerSeed").field("fallback", fallback).finish()
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
