//! Entity exchange with external processes through the unordered disk.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use weave_core::{EntityKind, Guid};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteUnorderedRequest {
    pub guid: Guid,
    #[serde(default)]
    pub vs1: Option<Guid>,
    #[serde(default)]
    pub vs2: Option<Guid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadUnorderedRequest {
    pub guid: Guid,
    pub kind: EntityKind,
    #[serde(default)]
    pub vs1: Option<Guid>,
    #[serde(default)]
    pub vs2: Option<Guid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnorderedResponse {
    pub guid: Guid,
    pub rows: u64,
}

pub async fn write_unordered(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WriteUnorderedRequest>,
) -> Result<Json<UnorderedResponse>, ApiError> {
    let store = state.store.clone().read_owned().await;
    let disk = state.unordered.clone();
    let guid = req.guid;
    let rows = tokio::task::spawn_blocking(move || {
        disk.write(&store, &req.guid, req.vs1.as_ref(), req.vs2.as_ref())
    })
    .await??;
    Ok(Json(UnorderedResponse { guid, rows }))
}

pub async fn read_unordered(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReadUnorderedRequest>,
) -> Result<Json<UnorderedResponse>, ApiError> {
    let mut store = state.store.clone().write_owned().await;
    let disk = state.unordered.clone();
    let guid = req.guid;
    let rows = tokio::task::spawn_blocking(move || {
        disk.read(&mut store, req.guid, req.kind, req.vs1.as_ref(), req.vs2.as_ref())
    })
    .await??;
    Ok(Json(UnorderedResponse { guid, rows }))
}
