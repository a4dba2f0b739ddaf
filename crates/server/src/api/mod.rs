//! Endpoint handlers, one module per resource.

mod health;
mod operations;
mod projects;
mod unordered;

pub use health::{discard_all, health, HealthResponse};
pub use operations::execute_operation;
pub use projects::{
    attribute, create_example_graph, get_project, list_projects, run_node2vec, save_project,
    Node2VecRequest, Node2VecResponse, SaveProjectRequest, DEFAULT_EMBEDDING_ATTRIBUTE,
};
pub use unordered::{read_unordered, write_unordered, ReadUnorderedRequest, WriteUnorderedRequest};
