use thiserror::Error;
use weave_core::WeaveError;

#[derive(Error, Debug)]
pub enum Node2VecError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A walk reached a vertex with no outgoing edge.
    #[error("Vertex {vertex} has no outgoing edges")]
    DeadEnd { vertex: usize },

    #[error(transparent)]
    Core(#[from] WeaveError),
}

/// Error type for operation execution.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error(transparent)]
    Node2Vec(#[from] Node2VecError),

    #[error(transparent)]
    Core(#[from] WeaveError),
}
