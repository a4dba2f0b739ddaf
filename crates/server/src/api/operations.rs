use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::info;
use weave_compute::{prepare, OperationOutcome};
use weave_core::OperationInstance;

use crate::error::ApiError;
use crate::state::AppState;

/// Execute an operation instance against the shared store.
///
/// Inputs are read under a read lock, the work runs on a blocking thread
/// with no lock held, and outputs are written under a short write lock.
pub async fn execute_operation(
    State(state): State<Arc<AppState>>,
    Json(instance): Json<OperationInstance>,
) -> Result<Json<OperationOutcome>, ApiError> {
    info!(class = %instance.operation.class, guid = %instance.guid, "Executing operation");
    let prepared = {
        let store = state.store.read().await;
        prepare(&store, &instance)?
    };
    let computed = tokio::task::spawn_blocking(move || prepared.run()).await??;
    let outcome = computed.commit(&mut *state.store.write().await);
    Ok(Json(outcome))
}
