use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use weave_core::Guid;

use super::task::{Task, TaskError};
use crate::client::GraphClient;

/// A task whose output is a project saved on the server.
#[async_trait]
pub trait ProjectTask: Send + Sync {
    fn family(&self) -> &str;

    fn params(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn requires(&self) -> Vec<Arc<dyn Task>> {
        Vec::new()
    }

    /// Build the project and return its checkpoint.
    async fn compute_project(&self, client: &GraphClient) -> anyhow::Result<Guid>;

    /// Name the project is saved under.
    fn output_name(&self) -> String;
}

/// Runs a [`ProjectTask`] as a [`Task`]: complete once `output_name` exists,
/// running computes the project and saves it under that name.
pub struct ProjectTaskRunner<T> {
    inner: T,
    client: Arc<GraphClient>,
}

impl<T: ProjectTask> ProjectTaskRunner<T> {
    pub fn new(inner: T, client: Arc<GraphClient>) -> Self {
        Self { inner, client }
    }
}

#[async_trait]
impl<T: ProjectTask> Task for ProjectTaskRunner<T> {
    fn family(&self) -> &str {
        self.inner.family()
    }

    fn params(&self) -> BTreeMap<String, String> {
        self.inner.params()
    }

    fn requires(&self) -> Vec<Arc<dyn Task>> {
        self.inner.requires()
    }

    async fn complete(&self) -> Result<bool, TaskError> {
        Ok(self.client.project_exists(&self.inner.output_name()).await?)
    }

    async fn run(&self) -> Result<(), TaskError> {
        let name = self.inner.output_name();
        let checkpoint = self.inner.compute_project(&self.client).await?;
        self.client.save_project(&name, checkpoint).await?;
        info!(project = %name, %checkpoint, "saved project");
        Ok(())
    }
}
