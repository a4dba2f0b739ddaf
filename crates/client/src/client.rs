//! Thin REST client for weave-server.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use weave_compute::Node2VecParams;
use weave_core::config::ClientConfig;
use weave_core::Guid;
use weave_graph::{Project, ProjectSummary};

/// An unsaved project returned by checkpoint-creating endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Checkpoint {
    pub checkpoint: Guid,
    pub project: Project,
}

/// Result of running Node2Vec on a saved project.
#[derive(Debug, Clone, Deserialize)]
pub struct Node2VecRun {
    pub project: String,
    pub attribute: String,
    pub checkpoint: Guid,
    pub epoch_losses: Vec<f64>,
}

#[derive(Serialize)]
struct SaveProjectBody<'a> {
    name: &'a str,
    checkpoint: Guid,
}

#[derive(Serialize)]
struct Node2VecBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<&'a str>,
    params: &'a Node2VecParams,
}

/// Client for the weave-server REST API. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct GraphClient {
    base_url: String,
    http: reqwest::Client,
}

impl GraphClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::new();
        Self { base_url, http }
    }

    /// Client with the configured base URL and request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn project_path(name: &str) -> String {
        format!("api/projects/{}", urlencoding::encode(name))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("failed to {}", what))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("server returned {}: {}", status, body);
        }

        resp.json()
            .await
            .with_context(|| format!("failed to parse response to {}", what))
    }

    /// Send a raw JSON request to `path`.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        debug!("{} {}", method, path);
        let mut req = self.http.request(method, self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        self.send(req, path).await
    }

    pub async fn health(&self) -> Result<Value> {
        self.request(Method::GET, "health", None).await
    }

    /// Drop every entity and project on the server.
    pub async fn discard_all(&self) -> Result<()> {
        self.request(Method::POST, "ajax/discardAllReallyIMeanIt", None)
            .await?;
        Ok(())
    }

    pub async fn new_example_graph(&self) -> Result<Checkpoint> {
        let req = self.http.post(self.url("api/checkpoints/example-graph"));
        self.send(req, "create example graph").await
    }

    pub async fn save_project(&self, name: &str, checkpoint: Guid) -> Result<ProjectSummary> {
        let req = self
            .http
            .post(self.url("api/projects"))
            .json(&SaveProjectBody { name, checkpoint });
        self.send(req, "save project").await
    }

    pub async fn list_projects(&self) -> Result<Vec<String>> {
        self.send(self.http.get(self.url("api/projects")), "list projects")
            .await
    }

    pub async fn get_project(&self, name: &str) -> Result<ProjectSummary> {
        let req = self.http.get(self.url(&Self::project_path(name)));
        self.send(req, "get project").await
    }

    /// Whether a project is saved under `name`.
    pub async fn project_exists(&self, name: &str) -> Result<bool> {
        let resp = self
            .http
            .get(self.url(&Self::project_path(name)))
            .send()
            .await
            .context("failed to check project")?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            status => {
                let body = resp.text().await.unwrap_or_default();
                bail!("server returned {}: {}", status, body);
            }
        }
    }

    pub async fn run_node2vec(
        &self,
        name: &str,
        attribute: Option<&str>,
        params: &Node2VecParams,
    ) -> Result<Node2VecRun> {
        let path = format!("{}/node2vec", Self::project_path(name));
        let req = self
            .http
            .post(self.url(&path))
            .json(&Node2VecBody { attribute, params });
        self.send(req, "run Node2Vec").await
    }

    /// Attribute `attr` of project `name`, as `{name, guid, kind, data}`.
    pub async fn attribute(&self, name: &str, attr: &str) -> Result<Value> {
        let path = format!(
            "{}/attributes/{}",
            Self::project_path(name),
            urlencoding::encode(attr)
        );
        self.send(self.http.get(self.url(&path)), "get attribute")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let client = GraphClient::new("http://localhost:2200/");
        assert_eq!(client.base_url(), "http://localhost:2200");
        assert_eq!(client.url("/health"), "http://localhost:2200/health");
        assert_eq!(client.url("api/projects"), "http://localhost:2200/api/projects");
    }

    #[test]
    fn project_names_are_encoded() {
        assert_eq!(GraphClient::project_path("a b/c"), "api/projects/a%20b%2Fc");
    }

    #[test]
    fn from_config_uses_base_url() {
        let config = ClientConfig {
            base_url: "http://example.test:9/".to_string(),
            timeout_secs: 5,
        };
        let client = GraphClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://example.test:9");
    }
}
