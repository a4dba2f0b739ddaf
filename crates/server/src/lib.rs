//! HTTP service over the in-memory entity store.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;

/// Serve the API on an already bound listener until the process exits.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    cors_origin: &str,
) -> anyhow::Result<()> {
    let app = build_router(state, cors_origin);
    info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
