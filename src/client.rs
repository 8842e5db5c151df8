//! Access to the project backend.
//!
//! The backend owns tasks and edges and enforces acyclicity when an edge is
//! created. [`DependencyService`] is the seam the rest of the crate talks to;
//! [`HttpDependencyService`] is the real implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{DagSnapshot, TaskId};
use crate::error::{Error, Result};

/// Body of a dependency-creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRequest {
    pub predecessor_task_id: TaskId,
    pub successor_task_id: TaskId,
}

impl DependencyRequest {
    pub fn new(predecessor: TaskId, successor: TaskId) -> Self {
        Self {
            predecessor_task_id: predecessor,
            successor_task_id: successor,
        }
    }

    pub fn pair(&self) -> (TaskId, TaskId) {
        (self.predecessor_task_id, self.successor_task_id)
    }
}

impl From<(TaskId, TaskId)> for DependencyRequest {
    fn from((predecessor, successor): (TaskId, TaskId)) -> Self {
        Self::new(predecessor, successor)
    }
}

/// Backend acknowledgement of a created dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDependency {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub id: Option<i64>,
}

/// Operations the dependency graph needs from the backend.
#[async_trait]
pub trait DependencyService: Send + Sync {
    /// Fetch the current tasks and edges of a project.
    async fn fetch_dag(&self, project_id: i64) -> Result<DagSnapshot>;

    /// Create one dependency. Rejections (duplicate, cycle) come back as errors.
    async fn create_dependency(&self, request: &DependencyRequest) -> Result<CreatedDependency>;
}

/// Error payload the backend sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// [`DependencyService`] over the backend's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpDependencyService {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpDependencyService {
    /// Create a client for `base_url`, sending `token` as a bearer token if set.
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            detail: error_detail(status, &body),
        })
    }
}

/// Human-readable detail from an error body, falling back to the status text.
fn error_detail(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

#[async_trait]
impl DependencyService for HttpDependencyService {
    async fn fetch_dag(&self, project_id: i64) -> Result<DagSnapshot> {
        let url = self.url(&format!("/api/projects/{}/dag", project_id));
        debug!(%url, "fetching dag snapshot");
        let response = self.authorize(self.client.get(&url)).send().await?;
        let snapshot = Self::check(response).await?.json::<DagSnapshot>().await?;
        debug!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "dag snapshot received"
        );
        Ok(snapshot)
    }

    async fn create_dependency(&self, request: &DependencyRequest) -> Result<CreatedDependency> {
        let url = self.url("/api/tasks/dependencies");
        debug!(
            predecessor = %request.predecessor_task_id,
            successor = %request.successor_task_id,
            "creating dependency"
        );
        let response = self
            .authorize(self.client.post(&url).json(request))
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<CreatedDependency>().await?)
    }
}
