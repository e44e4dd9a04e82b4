//! Handlers for project-scoped environment variables.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shipyard_core::types::DbId;
use shipyard_db::models::environment_variable::{EnvironmentVariable, SetEnvironmentVariable};
use shipyard_db::repositories::EnvironmentVariableRepo;

use super::require_project;
use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/projects/{project_id}/environment
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<EnvironmentVariable>>> {
    require_project(&state.pool, project_id).await?;
    let vars = EnvironmentVariableRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(vars))
}

/// PUT /api/projects/{project_id}/environment
///
/// Creates the variable or overwrites its value.
pub async fn set(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetEnvironmentVariable>,
) -> AppResult<Json<EnvironmentVariable>> {
    require_project(&state.pool, project_id).await?;
    let var = EnvironmentVariableRepo::set(&state.pool, project_id, &input).await?;
    tracing::debug!(project_id = %project_id, key = %var.key, "Environment variable set");
    Ok(Json(var))
}

/// DELETE /api/projects/{project_id}/environment/{key}
///
/// Idempotent: deleting an absent key still answers 204.
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, key)): Path<(DbId, String)>,
) -> AppResult<StatusCode> {
    require_project(&state.pool, project_id).await?;
    let removed = EnvironmentVariableRepo::delete(&state.pool, project_id, &key).await?;
    tracing::debug!(project_id = %project_id, key = %key, removed, "Environment variable deleted");
    Ok(StatusCode::NO_CONTENT)
}
