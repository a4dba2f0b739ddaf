use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

/// Error type for task execution.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Task failed: {0}")]
    Failed(String),
    #[error("Client error: {0}")]
    Client(#[from] anyhow::Error),
    #[error("Invalid build: {0}")]
    InvalidBuild(String),
}

/// A unit of work with declared dependencies and an idempotent completion check.
#[async_trait]
pub trait Task: Send + Sync {
    /// Task kind, shared by every instance of one implementation.
    fn family(&self) -> &str;

    /// Parameters that distinguish instances of the same family.
    fn params(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Identity used for deduplication: `family(k=v, ...)`.
    fn task_id(&self) -> String {
        let params: Vec<String> = self
            .params()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("{}({})", self.family(), params.join(", "))
    }

    /// Tasks that must succeed before this one runs.
    fn requires(&self) -> Vec<Arc<dyn Task>> {
        Vec::new()
    }

    /// Whether the output already exists.
    async fn complete(&self) -> Result<bool, TaskError> {
        Ok(false)
    }

    async fn run(&self) -> Result<(), TaskError>;
}
