//! Handlers for deployment records: creation, listing, status, logs, and
//! cleanup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use shipyard_core::environment::validate_environment;
use shipyard_core::error::CoreError;
use shipyard_core::types::DbId;
use shipyard_db::models::deployment::{CreateDeployment, Deployment};
use shipyard_db::repositories::DeploymentRepo;

use super::require_project;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Response body of `GET /api/deployments/{id}/logs`.
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<String>,
}

async fn require_deployment(state: &AppState, id: DbId) -> AppResult<Deployment> {
    DeploymentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Deployment",
            id,
        }))
}

/// POST /api/projects/{project_id}/deployments
///
/// Creates a `pending` deployment with the given environment snapshot.
pub async fn create(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<CreateDeployment>,
) -> AppResult<(StatusCode, Json<Deployment>)> {
    validate_environment(&input.environment)?;
    require_project(&state.pool, project_id).await?;
    let deployment = DeploymentRepo::create(&state.pool, project_id, &input).await?;
    tracing::info!(deployment_id = %deployment.id, project_id = %project_id, "Deployment created");
    Ok((StatusCode::CREATED, Json(deployment)))
}

/// GET /api/projects/{project_id}/deployments
pub async fn list_by_project(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Deployment>>> {
    require_project(&state.pool, project_id).await?;
    let deployments = DeploymentRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(deployments))
}

/// GET /api/deployments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Deployment>> {
    Ok(Json(require_deployment(&state, id).await?))
}

/// GET /api/deployments/{id}/status
///
/// Returns the full row. The owning project must still exist.
pub async fn status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Deployment>> {
    let deployment = require_deployment(&state, id).await?;
    require_project(&state.pool, deployment.project_id).await?;
    Ok(Json(deployment))
}

/// GET /api/deployments/{id}/logs
pub async fn logs(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<LogsResponse>> {
    let deployment = require_deployment(&state, id).await?;
    Ok(Json(LogsResponse {
        logs: deployment.build_logs,
    }))
}

/// DELETE /api/deployments/{id}
///
/// Cancels the deployment's lifecycle task, if one is live, before removing
/// the row.
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if state.runner.cancel(id).await {
        tracing::info!(deployment_id = %id, "Cancelled in-flight lifecycle task");
    }
    if DeploymentRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Deployment",
            id,
        }))
    }
}
