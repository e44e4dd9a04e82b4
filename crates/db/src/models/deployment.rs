//! Deployment entity model and DTOs.

use serde::{Deserialize, Serialize};
use shipyard_core::deployment::DeploymentStatus;
use shipyard_core::environment::Environment;
use shipyard_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

/// A deployment row from the `deployments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Deployment {
    pub id: DbId,
    pub project_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: DeploymentStatus,
    /// Public URL, set only once the deployment succeeds.
    pub url: Option<String>,
    pub build_logs: Vec<String>,
    #[sqlx(json)]
    pub environment: Environment,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a deployment under a project. The row starts `pending`
/// with no logs.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateDeployment {
    #[serde(default)]
    pub environment: Environment,
}

/// A guarded status change with the side data written alongside it.
///
/// The update only lands when the row's current status is one of
/// `to.allowed_sources()`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentTransition {
    pub to: DeploymentStatus,
    /// Appended to `build_logs` when present.
    pub log: Option<String>,
    pub url: Option<String>,
    /// Replaces the environment snapshot when present.
    pub environment: Option<Environment>,
}

impl DeploymentTransition {
    pub fn to(status: DeploymentStatus) -> Self {
        Self {
            to: status,
            log: None,
            url: None,
            environment: None,
        }
    }

    pub fn with_log(mut self, line: impl Into<String>) -> Self {
        self.log = Some(line.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_environment(mut self, environment: Option<Environment>) -> Self {
        self.environment = environment;
        self
    }
}
