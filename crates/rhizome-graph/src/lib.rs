//! # rhizome-graph
//!
//! Cluster data model for the rhizome flood-fill engine.
//!
//! Provides the immutable graph a diffusion run grows over:
//! - [`model::Vec3`]         — 3-D position with Euclidean distance
//! - [`model::Node`]         — graph vertex with index-based adjacency links
//! - [`model::Edge`]         — undirected edge between two node indices
//! - [`model::Cluster`]      — flat node/edge arenas, built once, then read-only
//! - [`spatial::SpatialGrid`] — uniform-grid nearest-node accelerator

pub mod error;
pub mod model;
pub mod spatial;

pub use error::ClusterError;
pub use model::{Cluster, Edge, Link, Node, Vec3};
pub use spatial::SpatialGrid;
