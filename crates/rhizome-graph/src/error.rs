use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("node index out of bounds: {index} (cluster has {count} nodes)")]
    NodeOutOfBounds { index: usize, count: usize },

    #[error("degenerate edge: both endpoints are node {0}")]
    DegenerateEdge(usize),

    #[error("duplicate edge between nodes {a} and {b}")]
    DuplicateEdge { a: usize, b: usize },
}
