use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;
use weave_graph::StoreStats;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub entities: StoreStats,
    pub projects: usize,
    pub config: serde_json::Value,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let projects = state.projects.read().await.len();
    let entities = state.store.read().await.stats();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        entities,
        projects,
        config: state.config_summary.clone(),
    })
}

/// Drop every entity and project. There is no undo.
pub async fn discard_all(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let mut registry = state.projects.write().await;
    let mut store = state.store.write().await;
    let projects = registry.clear();
    let entities = store.clear();
    drop((store, registry));
    warn!(entities, projects, "discarded all entities and projects");
    Json(serde_json::json!({
        "entities": entities,
        "projects": projects,
    }))
}
