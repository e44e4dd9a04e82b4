//! Handlers that start background lifecycle tasks: generate, build, deploy.
//!
//! Each handler verifies the project, writes the initial `building` status
//! synchronously, hands the work to the [`LifecycleRunner`], and returns
//! without waiting for the task.
//!
//! [`LifecycleRunner`]: crate::engine::LifecycleRunner

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use shipyard_core::deployment::{DeploymentStatus, LifecycleKind};
use shipyard_core::environment::{validate_environment, Environment};
use shipyard_core::error::CoreError;
use shipyard_core::generation::{
    GenerationParams, MAX_TEMPERATURE, MAX_TOKENS_LIMIT, MIN_TEMPERATURE,
};
use shipyard_core::types::DbId;
use shipyard_db::models::deployment::{Deployment, DeploymentTransition};
use shipyard_db::repositories::DeploymentRepo;
use validator::Validate;

use super::require_project;
use crate::engine::LifecycleJob;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub project_id: DbId,
    #[validate(length(min = 1))]
    pub prompt: String,
    pub model: Option<String>,
    #[validate(range(min = MIN_TEMPERATURE, max = MAX_TEMPERATURE))]
    pub temperature: Option<f32>,
    #[validate(range(min = 1, max = MAX_TOKENS_LIMIT))]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub deployment_id: DbId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub project_id: DbId,
    pub deployment_id: DbId,
    pub environment: Option<Environment>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub project_id: DbId,
    pub deployment_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/generate
///
/// Inserts a new deployment already in `building` and starts code generation.
pub async fn generate(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(input): ValidatedJson<GenerateRequest>,
) -> AppResult<Json<GenerateResponse>> {
    let kind = LifecycleKind::Generate;
    let project = require_project(&state.pool, input.project_id).await?;

    let deployment = DeploymentRepo::create_started(&state.pool, project.id, kind.start_log()).await?;
    let params =
        GenerationParams::resolve(input.prompt, input.model, input.temperature, input.max_tokens);

    tracing::info!(
        project_id = %project.id,
        deployment_id = %deployment.id,
        model = %params.model,
        "Code generation requested",
    );

    let job = LifecycleJob {
        kind,
        project_id: project.id,
        deployment_id: deployment.id,
        generation: Some(params),
        environment: deployment.environment,
    };
    let cancel = state.runner.claim(deployment.id).await?;
    state.runner.start(job, cancel);

    Ok(Json(GenerateResponse {
        deployment_id: deployment.id,
    }))
}

/// POST /api/build
///
/// Moves the deployment to `building`, replacing its environment snapshot
/// when one is given, and starts the build.
pub async fn build(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(input): ValidatedJson<BuildRequest>,
) -> AppResult<Json<MessageResponse>> {
    if let Some(env) = &input.environment {
        validate_environment(env)?;
    }
    let kind = LifecycleKind::Build;
    let deployment = require_owned_deployment(&state, input.project_id, input.deployment_id).await?;

    let job = LifecycleJob {
        kind,
        project_id: input.project_id,
        deployment_id: deployment.id,
        generation: None,
        environment: input
            .environment
            .clone()
            .unwrap_or_else(|| deployment.environment.clone()),
    };
    let initial = DeploymentTransition::to(DeploymentStatus::Building)
        .with_log(kind.start_log())
        .with_environment(input.environment);

    start(&state, job, initial).await
}

/// POST /api/deploy
pub async fn deploy(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(input): ValidatedJson<DeployRequest>,
) -> AppResult<Json<MessageResponse>> {
    let kind = LifecycleKind::Deploy;
    let deployment = require_owned_deployment(&state, input.project_id, input.deployment_id).await?;

    let job = LifecycleJob {
        kind,
        project_id: input.project_id,
        deployment_id: deployment.id,
        generation: None,
        environment: deployment.environment,
    };
    let initial = DeploymentTransition::to(DeploymentStatus::Building).with_log(kind.start_log());

    start(&state, job, initial).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Project first, then deployment; a deployment under another project is
/// reported as missing.
async fn require_owned_deployment(
    state: &AppState,
    project_id: DbId,
    deployment_id: DbId,
) -> AppResult<Deployment> {
    require_project(&state.pool, project_id).await?;
    DeploymentRepo::find_by_id(&state.pool, deployment_id)
        .await?
        .filter(|d| d.project_id == project_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Deployment",
            id: deployment_id,
        }))
}

async fn start(
    state: &AppState,
    job: LifecycleJob,
    initial: DeploymentTransition,
) -> AppResult<Json<MessageResponse>> {
    let kind = job.kind;
    let deployment_id = job.deployment_id;
    state.runner.trigger(job, initial).await?;
    tracing::info!(deployment_id = %deployment_id, kind = %kind, "Lifecycle task scheduled");
    Ok(Json(MessageResponse {
        message: kind.started_message().to_string(),
    }))
}
