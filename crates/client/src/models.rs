//! Wire types exchanged with the API server.

use serde::{Deserialize, Serialize};
use shipyard_core::deployment::DeploymentStatus;
use shipyard_core::environment::Environment;
use shipyard_core::project::{FileMap, ProjectStatus};
use shipyard_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub user_id: Option<DbId>,
    #[serde(default)]
    pub files: FileMap,
    pub status: ProjectStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Deployment {
    pub id: DbId,
    pub project_id: DbId,
    pub status: DeploymentStatus,
    pub url: Option<String>,
    #[serde(default)]
    pub build_logs: Vec<String>,
    #[serde(default)]
    pub environment: Environment,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvironmentVariable {
    pub project_id: DbId,
    pub key: String,
    pub value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of `POST /api/projects`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "FileMap::is_empty")]
    pub files: FileMap,
}

/// Body of `PUT /api/projects/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub project_id: DbId,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateResponse {
    pub deployment_id: DbId,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LogsResponse {
    pub logs: Vec<String>,
}
