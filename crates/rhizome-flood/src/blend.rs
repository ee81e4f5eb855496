use crate::error::FloodError;

// ─────────────────────────────────────────────
// BlendOp / BlendOpFactory
// ─────────────────────────────────────────────

/// One attribute-blending operation, carrying seed values onto a captured
/// node.
///
/// The operation owns (or borrows) its attribute buffers; the engine only
/// hands it index pairs. The blend phase may run instances in parallel —
/// each instance's captured set is disjoint from every other's, so an
/// implementation is free to write without locking as long as it tolerates
/// concurrent writes to *distinct* target indices.
pub trait BlendOp: Send + Sync {
    fn blend(&self, source_index: usize, target_index: usize);
}

/// Fallible constructor for a [`BlendOp`].
///
/// Construction failures are fatal for the whole run — the engine refuses
/// to start any instance rather than diffuse with a partial operation set.
pub trait BlendOpFactory {
    fn create(&self) -> Result<Box<dyn BlendOp>, FloodError>;
}

// ─────────────────────────────────────────────
// BlendOperationSet
// ─────────────────────────────────────────────

/// Ordered list of blend operations, applied in sequence per captured node.
pub struct BlendOperationSet {
    ops: Vec<Box<dyn BlendOp>>,
}

impl BlendOperationSet {
    /// Construct every operation up front, failing fast on the first
    /// factory error.
    pub fn from_factories(
        factories: &[&dyn BlendOpFactory],
    ) -> Result<Self, FloodError> {
        let mut ops = Vec::with_capacity(factories.len());
        for factory in factories {
            ops.push(factory.create()?);
        }
        Ok(Self { ops })
    }

    /// Wrap already-constructed operations.
    pub fn from_ops(ops: Vec<Box<dyn BlendOp>>) -> Self {
        Self { ops }
    }

    /// An empty set — diffusion still runs and writes its outputs, it just
    /// carries no attribute values.
    pub fn empty() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Run every operation, in order, for one source/target pair.
    pub fn blend(&self, source_index: usize, target_index: usize) {
        for op in &self.ops {
            op.blend(source_index, target_index);
        }
    }
}

impl std::fmt::Debug for BlendOperationSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlendOperationSet").field("ops", &self.ops.len()).finish()
    }
}

// ─────────────────────────────────────────────
// SeedForwarder
// ─────────────────────────────────────────────

/// Copies configured seed-level attribute values onto captured nodes.
///
/// Called once per diffused instance with the originating seed point index
/// and every captured node index (seed node included).
pub trait SeedForwarder: Send + Sync {
    fn forward(&self, origin_index: usize, targets: &[usize]);
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
