pub mod deployment;
pub mod environment;
pub mod health;
pub mod lifecycle;
pub mod project;

use shipyard_core::error::CoreError;
use shipyard_core::types::DbId;
use shipyard_db::models::project::Project;
use shipyard_db::repositories::ProjectRepo;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Load a project or fail with 404. Every project-scoped handler starts here.
pub(crate) async fn require_project(pool: &PgPool, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}
