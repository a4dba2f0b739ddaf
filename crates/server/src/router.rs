//! HTTP router construction.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::api;
use crate::state::AppState;

/// CORS for `origin`; `*` allows any origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(value))
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            warn!(origin, error = %e, "invalid CORS origin, allowing any");
            CorsLayer::permissive()
        }
    }
}

/// Build the complete application router.
pub fn build_router(state: Arc<AppState>, cors_origin: &str) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/ajax/discardAllReallyIMeanIt",
            get(api::discard_all).post(api::discard_all),
        )
        .route("/api/checkpoints/example-graph", post(api::create_example_graph))
        .route(
            "/api/projects",
            get(api::list_projects).post(api::save_project),
        )
        .route("/api/projects/{name}", get(api::get_project))
        .route("/api/projects/{name}/node2vec", post(api::run_node2vec))
        .route(
            "/api/projects/{name}/attributes/{attr}",
            get(api::attribute),
        )
        .route("/api/operations", post(api::execute_operation))
        .route("/api/unordered/write", post(api::write_unordered))
        .route("/api/unordered/read", post(api::read_unordered))
        .layer(cors_layer(cors_origin))
        .with_state(state)
}
