use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use weave_core::Config;
use weave_graph::{EntityStore, ProjectRegistry};
use weave_storage::UnorderedDisk;

/// Shared application state.
pub struct AppState {
    pub store: Arc<RwLock<EntityStore>>,
    pub projects: RwLock<ProjectRegistry>,
    pub unordered: UnorderedDisk,
    /// Redacted config reported by `/health`.
    pub config_summary: serde_json::Value,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config_summary: config.redacted_summary(),
            ..Self::with_unordered(UnorderedDisk::from_config(&config.storage))
        }
    }

    pub fn with_unordered_dir(dir: impl Into<PathBuf>) -> Self {
        Self::with_unordered(UnorderedDisk::new(dir))
    }

    fn with_unordered(unordered: UnorderedDisk) -> Self {
        Self {
            store: Arc::new(RwLock::new(EntityStore::new())),
            projects: RwLock::new(ProjectRegistry::new()),
            unordered,
            config_summary: serde_json::Value::Null,
        }
    }
}
