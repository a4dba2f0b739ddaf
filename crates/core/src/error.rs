use thiserror::Error;

use crate::entity::{EntityKind, Guid};

#[derive(Error, Debug)]
pub enum WeaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(Guid),

    #[error("Entity {guid} is a {found}, expected {expected}")]
    WrongEntityKind {
        guid: Guid,
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("Edge {index} references vertex {vertex}, but there are only {num_nodes} vertices")]
    InvalidEdge {
        index: usize,
        vertex: usize,
        num_nodes: usize,
    },

    #[error("Length mismatch: {0}")]
    LengthMismatch(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for WeaveError {
    fn from(e: serde_json::Error) -> Self {
        WeaveError::Serialize(e.to_string())
    }
}
