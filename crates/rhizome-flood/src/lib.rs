//! # rhizome-flood
//!
//! Multi-source flood-fill diffusion over a [`rhizome_graph::Cluster`]:
//! bounded, priority-ordered frontier growth with exclusive per-node
//! claims, followed by seed-attribute blending onto every captured node.
//!
//! ## Crate structure
//!
//! | Module        | Responsibility                                           |
//! |---------------|----------------------------------------------------------|
//! | [`claim`]     | [`InfluenceClaimTable`] — shared atomic claim counters   |
//! | [`seeds`]     | [`SeedSelector`] — filtered and point-proximity seeding  |
//! | [`settings`]  | [`SettingValue`] — constant-or-per-seed scalar readers   |
//! | [`heuristics`]| [`HeuristicsProvider`] — injected edge scoring           |
//! | [`blend`]     | [`BlendOperationSet`] + [`SeedForwarder`] capability traits |
//! | [`instance`]  | [`DiffusionInstance`] — per-seed growth state machine    |
//! | [`scheduler`] | [`GrowthScheduler`] — parallel rounds / sequential drive |
//! | [`apply`]     | [`BlendApplier`] — terminal blend pass + [`DiffusionReport`] |
//! | [`paths`]     | endpoints + seed→endpoint path reconstruction            |
//! | [`engine`]    | [`FloodFillEngine`] — one-call run facade                |
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let engine = FloodFillEngine::new(FillConfig::default());
//! let claims = InfluenceClaimTable::new(cluster.node_count());
//! let seeds  = ProximitySelector::new(points, 200.0);
//!
//! let outcome = engine.run(&cluster, &claims, &seeds, &heuristics, &[], None)?;
//!
//! for (node, depth) in outcome.report.depth.iter().enumerate() {
//!     println!("node {node} captured at depth {depth}");
//! }
//! ```

pub mod apply;
pub mod blend;
pub mod claim;
pub mod config;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod instance;
pub mod paths;
pub mod scheduler;
pub mod seeds;
pub mod settings;

// ── Claims ────────────────────────────────────────────────────────────────────
pub use claim::InfluenceClaimTable;

// ── Configuration ─────────────────────────────────────────────────────────────
pub use config::{FillConfig, FillPriority, FillProcessing, SortDirection};
pub use settings::SettingValue;

// ── Seeding ───────────────────────────────────────────────────────────────────
pub use seeds::{FilteredSelector, ProximitySelector, Seed, SeedSelector, SeedSortRule};

// ── Capability interfaces ─────────────────────────────────────────────────────
pub use blend::{BlendOp, BlendOpFactory, BlendOperationSet, SeedForwarder};
pub use heuristics::{
    EdgeLengthHeuristics, HeuristicsProvider, ScoringOptions, TravelState, UniformHeuristics,
};

// ── Growth ────────────────────────────────────────────────────────────────────
pub use instance::{Candidate, DiffusionInstance, DiffusionState};
pub use scheduler::GrowthScheduler;

// ── Results ───────────────────────────────────────────────────────────────────
pub use apply::{BlendApplier, DiffusionReport};
pub use engine::{FloodFillEngine, FloodFillOutcome};
pub use error::FloodError;
pub use paths::{endpoints, full_paths};
