//! REST client for the Shipyard API.
//!
//! One method per endpoint. Every request carries the configured bearer
//! token; non-2xx answers become [`ClientError::Api`] with the server's
//! `error` message.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shipyard_core::environment::Environment;
use shipyard_core::project::FileMap;
use shipyard_core::types::DbId;

use crate::editor::ProjectStore;
use crate::error::ClientError;
use crate::models::{
    Deployment, EnvironmentVariable, GenerateRequest, GenerateResponse, LogsResponse,
    MessageResponse, NewProject, Project, ProjectChanges,
};
use crate::poller::DeploymentSource;

/// HTTP client for a single Shipyard API server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Error body produced by the server.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    /// * `base_url` - Server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    /// Reuse an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- health ----

    /// `GET /health`. Public; no token is sent.
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- projects ----

    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.fetch(self.client.get(self.url("/projects"))).await
    }

    pub async fn get_project(&self, id: DbId) -> Result<Project, ClientError> {
        self.fetch(self.client.get(self.url(&format!("/projects/{id}"))))
            .await
    }

    pub async fn create_project(&self, input: &NewProject) -> Result<Project, ClientError> {
        self.fetch(self.client.post(self.url("/projects")).json(input))
            .await
    }

    pub async fn update_project(
        &self,
        id: DbId,
        changes: &ProjectChanges,
    ) -> Result<Project, ClientError> {
        self.fetch(
            self.client
                .put(self.url(&format!("/projects/{id}")))
                .json(changes),
        )
        .await
    }

    /// Replace the project's whole file map.
    pub async fn update_files(&self, id: DbId, files: &FileMap) -> Result<Project, ClientError> {
        let body = serde_json::json!({ "files": files });
        self.fetch(
            self.client
                .put(self.url(&format!("/projects/{id}/files")))
                .json(&body),
        )
        .await
    }

    pub async fn delete_project(&self, id: DbId) -> Result<(), ClientError> {
        self.execute(self.client.delete(self.url(&format!("/projects/{id}"))))
            .await
    }

    // ---- deployments ----

    pub async fn list_deployments(&self, project_id: DbId) -> Result<Vec<Deployment>, ClientError> {
        self.fetch(
            self.client
                .get(self.url(&format!("/projects/{project_id}/deployments"))),
        )
        .await
    }

    /// Create a `pending` deployment with an environment snapshot.
    pub async fn create_deployment(
        &self,
        project_id: DbId,
        environment: &Environment,
    ) -> Result<Deployment, ClientError> {
        let body = serde_json::json!({ "environment": environment });
        self.fetch(
            self.client
                .post(self.url(&format!("/projects/{project_id}/deployments")))
                .json(&body),
        )
        .await
    }

    pub async fn get_deployment(&self, id: DbId) -> Result<Deployment, ClientError> {
        self.fetch(self.client.get(self.url(&format!("/deployments/{id}"))))
            .await
    }

    /// `GET /api/deployments/{id}/status`. Fails with 404 once the owning
    /// project is gone.
    pub async fn deployment_status(&self, id: DbId) -> Result<Deployment, ClientError> {
        self.fetch(
            self.client
                .get(self.url(&format!("/deployments/{id}/status"))),
        )
        .await
    }

    pub async fn deployment_logs(&self, id: DbId) -> Result<Vec<String>, ClientError> {
        let body: LogsResponse = self
            .fetch(self.client.get(self.url(&format!("/deployments/{id}/logs"))))
            .await?;
        Ok(body.logs)
    }

    pub async fn delete_deployment(&self, id: DbId) -> Result<(), ClientError> {
        self.execute(self.client.delete(self.url(&format!("/deployments/{id}"))))
            .await
    }

    // ---- environment ----

    pub async fn list_environment(
        &self,
        project_id: DbId,
    ) -> Result<Vec<EnvironmentVariable>, ClientError> {
        self.fetch(
            self.client
                .get(self.url(&format!("/projects/{project_id}/environment"))),
        )
        .await
    }

    /// Create or overwrite one variable.
    pub async fn set_environment_variable(
        &self,
        project_id: DbId,
        key: &str,
        value: &str,
    ) -> Result<EnvironmentVariable, ClientError> {
        let body = serde_json::json!({ "key": key, "value": value });
        self.fetch(
            self.client
                .put(self.url(&format!("/projects/{project_id}/environment")))
                .json(&body),
        )
        .await
    }

    pub async fn delete_environment_variable(
        &self,
        project_id: DbId,
        key: &str,
    ) -> Result<(), ClientError> {
        let url = self.env_key_url(project_id, key)?;
        self.execute(self.client.delete(url)).await
    }

    // ---- lifecycle ----

    /// Start code generation. Returns the id of the new deployment.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<DbId, ClientError> {
        let body: GenerateResponse = self
            .fetch(self.client.post(self.url("/generate")).json(request))
            .await?;
        Ok(body.deployment_id)
    }

    /// Start a build. A given `environment` replaces the deployment's
    /// snapshot.
    pub async fn build(
        &self,
        project_id: DbId,
        deployment_id: DbId,
        environment: Option<&Environment>,
    ) -> Result<String, ClientError> {
        let mut body = serde_json::json!({
            "projectId": project_id,
            "deploymentId": deployment_id,
        });
        if let Some(env) = environment {
            body["environment"] = serde_json::json!(env);
        }
        let response: MessageResponse = self
            .fetch(self.client.post(self.url("/build")).json(&body))
            .await?;
        Ok(response.message)
    }

    pub async fn deploy(&self, project_id: DbId, deployment_id: DbId) -> Result<String, ClientError> {
        let body = serde_json::json!({
            "projectId": project_id,
            "deploymentId": deployment_id,
        });
        let response: MessageResponse = self
            .fetch(self.client.post(self.url("/deploy")).json(&body))
            .await?;
        Ok(response.message)
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    /// `.../environment/{key}` with `key` percent-encoded as a single path
    /// segment, so `/`, `#` and `?` cannot reshape the request.
    fn env_key_url(&self, project_id: DbId, key: &str) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.url(&format!("/projects/{project_id}/environment")))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .push(key);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.authorize(request).send().await?;
        Self::parse_response(response).await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(), ClientError> {
        let response = self.authorize(request).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Map a non-2xx answer to [`ClientError::Api`], preferring the JSON
    /// `error` field over the raw body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl DeploymentSource for ApiClient {
    async fn fetch_deployment(&self, id: DbId) -> Result<Deployment, ClientError> {
        self.deployment_status(id).await
    }
}

#[async_trait]
impl ProjectStore for ApiClient {
    async fn load_project(&self, id: DbId) -> Result<Project, ClientError> {
        self.get_project(id).await
    }

    async fn save_files(&self, id: DbId, files: &FileMap) -> Result<Project, ClientError> {
        self.update_files(id, files).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/", None);
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.url("/projects"),
            "http://localhost:3000/api/projects"
        );
    }

    #[test]
    fn env_key_is_encoded_as_one_segment() {
        let client = ApiClient::new("http://localhost:3000", None);
        let id = DbId::nil();

        let url = client.env_key_url(id, "A/B").unwrap();
        assert_eq!(
            url.as_str(),
            format!("http://localhost:3000/api/projects/{id}/environment/A%2FB")
        );

        let url = client.env_key_url(id, "P#Q").unwrap();
        assert!(url.as_str().ends_with("/environment/P%23Q"));
        assert_eq!(url.fragment(), None);

        let url = client.env_key_url(id, "X?y=1").unwrap();
        assert!(url.as_str().ends_with("/environment/X%3Fy=1"));
        assert_eq!(url.query(), None);
    }

    #[test]
    fn unparseable_base_url_is_reported() {
        let client = ApiClient::new("not a url", None);
        assert!(matches!(
            client.env_key_url(DbId::nil(), "KEY"),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
