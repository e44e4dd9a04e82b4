//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use shipyard_core::project::{FileMap, ProjectStatus, MAX_PROJECT_NAME_LEN};
use shipyard_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Owner reference. Not enforced as a foreign key; the auth provider
    /// owns the user table.
    pub user_id: Option<DbId>,
    #[sqlx(json)]
    pub files: FileMap,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = MAX_PROJECT_NAME_LEN))]
    pub name: String,
    pub description: Option<String>,
    /// Filled from the caller's token when omitted.
    #[serde(default)]
    pub user_id: Option<DbId>,
    #[serde(default)]
    pub files: FileMap,
    /// Defaults to `draft` if omitted.
    pub status: Option<ProjectStatus>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = MAX_PROJECT_NAME_LEN))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub files: Option<FileMap>,
    pub status: Option<ProjectStatus>,
}

/// DTO for replacing a project's whole file map.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProjectFiles {
    pub files: FileMap,
}
