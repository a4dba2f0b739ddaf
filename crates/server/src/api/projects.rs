//! Project checkpoints, saved names and Node2Vec on a saved project.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use weave_compute::{train, Node2VecParams};
use weave_core::{DoubleVectorAttribute, Entity, Guid, WeaveError};
use weave_graph::example::example_graph;
use weave_graph::{Project, ProjectSummary};

use crate::error::ApiError;
use crate::state::AppState;

pub const DEFAULT_EMBEDDING_ATTRIBUTE: &str = "embedding";

#[derive(Serialize)]
pub struct CheckpointResponse {
    pub checkpoint: Guid,
    pub project: Project,
}

/// Build the example graph as a new, unsaved checkpoint.
pub async fn create_example_graph(
    State(state): State<Arc<AppState>>,
) -> Json<CheckpointResponse> {
    let mut projects = state.projects.write().await;
    let project = {
        let mut store = state.store.write().await;
        example_graph(&mut store)
    };
    let checkpoint = projects.add_checkpoint(project.clone());
    info!(%checkpoint, "created example graph");
    Json(CheckpointResponse {
        checkpoint,
        project,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveProjectRequest {
    pub name: String,
    pub checkpoint: Guid,
}

pub async fn save_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveProjectRequest>,
) -> Result<Json<ProjectSummary>, ApiError> {
    let mut projects = state.projects.write().await;
    projects.save(&req.name, req.checkpoint)?;
    info!(name = %req.name, checkpoint = %req.checkpoint, "saved project");
    let store = state.store.read().await;
    Ok(Json(projects.summary(&req.name, &store)?))
}

pub async fn list_projects(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.projects.read().await.names())
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ProjectSummary>, ApiError> {
    let projects = state.projects.read().await;
    let store = state.store.read().await;
    Ok(Json(projects.summary(&name, &store)?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Node2VecRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    pub params: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Node2VecResponse {
    pub project: String,
    pub attribute: String,
    pub checkpoint: Guid,
    pub epoch_losses: Vec<f64>,
}

/// Train an embedding on the project's graph and save it as a vertex attribute.
///
/// The project name is re-pointed at a new checkpoint that carries the attribute.
pub async fn run_node2vec(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<Node2VecRequest>,
) -> Result<Json<Node2VecResponse>, ApiError> {
    let params: Node2VecParams = serde_json::from_value(req.params)
        .map_err(|e| WeaveError::InvalidParameter(e.to_string()))?;
    let attribute = req
        .attribute
        .unwrap_or_else(|| DEFAULT_EMBEDDING_ATTRIBUTE.to_string());

    let (vertex_set, num_nodes, edges) = {
        let projects = state.projects.read().await;
        let project = projects.get(&name)?;
        let store = state.store.read().await;
        (project.vertex_set, project.vertex_count(&store)?, project.edges(&store)?)
    };

    info!(project = %name, num_nodes, edges = edges.len(), "running Node2Vec");
    let outcome =
        tokio::task::spawn_blocking(move || train(num_nodes, &edges, &params)).await??;

    // The name may have moved while training; apply the attribute to what it
    // points at now.
    let mut projects = state.projects.write().await;
    let current = projects.get(&name)?.clone();
    if current.vertex_set != vertex_set {
        return Err(ApiError::conflict(format!(
            "project {} changed its vertex set during training",
            name
        )));
    }
    let embedding = Entity::DoubleVectorAttribute(DoubleVectorAttribute::dense(outcome.embedding));
    let guid = state.store.write().await.insert(embedding);
    let checkpoint = projects.add_checkpoint(current.with_vertex_attribute(&attribute, guid));
    projects.save(&name, checkpoint)?;

    Ok(Json(Node2VecResponse {
        project: name,
        attribute,
        checkpoint,
        epoch_losses: outcome.epoch_losses,
    }))
}

#[derive(Serialize)]
pub struct AttributeResponse {
    pub name: String,
    pub guid: Guid,
    #[serde(flatten)]
    pub entity: Entity,
}

/// A vertex attribute, or an edge attribute when no vertex attribute has that name.
pub async fn attribute(
    State(state): State<Arc<AppState>>,
    Path((name, attr)): Path<(String, String)>,
) -> Result<Json<AttributeResponse>, ApiError> {
    let projects = state.projects.read().await;
    let project = projects.get(&name)?;
    let guid = project
        .vertex_attributes
        .get(&attr)
        .or_else(|| project.edge_attributes.get(&attr))
        .copied()
        .ok_or_else(|| {
            ApiError::not_found(format!("project {} has no attribute {}", name, attr))
        })?;
    let store = state.store.read().await;
    Ok(Json(AttributeResponse {
        name: attr,
        guid,
        entity: store.get(&guid)?.clone(),
    }))
}
