//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shipyard_core::error::CoreError;
use shipyard_core::project::validate_file_paths;
use shipyard_core::types::DbId;
use shipyard_db::models::project::{CreateProject, Project, UpdateProject, UpdateProjectFiles};
use shipyard_db::repositories::{DeploymentRepo, ProjectRepo};

use super::require_project;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/projects
///
/// The owner defaults to the caller identified by the bearer token.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(mut input): ValidatedJson<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    validate_file_paths(&input.files)?;
    if input.user_id.is_none() {
        input.user_id = auth.user_id;
    }
    let project = ProjectRepo::create(&state.pool, &input).await?;
    tracing::info!(project_id = %project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects
///
/// Scoped to the caller's projects when the token identifies them.
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Project>>> {
    let projects = ProjectRepo::list(&state.pool, auth.user_id).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    Ok(Json(require_project(&state.pool, id).await?))
}

/// PUT /api/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateProject>,
) -> AppResult<Json<Project>> {
    if let Some(files) = &input.files {
        validate_file_paths(files)?;
    }
    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// PUT /api/projects/{id}/files
///
/// Replaces the whole file map.
pub async fn update_files(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateProjectFiles>,
) -> AppResult<Json<Project>> {
    validate_file_paths(&input.files)?;
    let project = ProjectRepo::update_files(&state.pool, id, &input.files)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    tracing::debug!(project_id = %id, file_count = project.files.len(), "Project files saved");
    Ok(Json(project))
}

/// DELETE /api/projects/{id}
///
/// Cancels any live lifecycle task of the project's deployments first.
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    for deployment in DeploymentRepo::list_by_project(&state.pool, id).await? {
        state.runner.cancel(deployment.id).await;
    }
    let deleted = ProjectRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(project_id = %id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
    }
}
