use thiserror::Error;

#[derive(Debug, Error)]
pub enum FloodError {
    #[error("blend operation setup failed: {0}")]
    BlendSetup(String),

    #[error("claim table size mismatch: table holds {table} nodes, cluster holds {cluster}")]
    ClaimTableMismatch { table: usize, cluster: usize },

    #[error("worker pool construction failed: {0}")]
    ThreadPool(String),

    #[error("cluster error: {0}")]
    Cluster(#[from] rhizome_graph::ClusterError),
}
