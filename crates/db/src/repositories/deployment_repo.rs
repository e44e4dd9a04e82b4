//! Repository for the `deployments` table.

use shipyard_core::deployment::DeploymentStatus;
use shipyard_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::deployment::{CreateDeployment, Deployment, DeploymentTransition};

const COLUMNS: &str =
    "id, project_id, status, url, build_logs, environment, created_at, updated_at";

/// Provides CRUD and guarded status updates for deployments.
pub struct DeploymentRepo;

impl DeploymentRepo {
    /// Insert a `pending` deployment with empty logs.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateDeployment,
    ) -> Result<Deployment, sqlx::Error> {
        let query = format!(
            "INSERT INTO deployments (project_id, status, build_logs, environment)
             VALUES ($1, $2, '{{}}', $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(project_id)
            .bind(DeploymentStatus::Pending.as_str())
            .bind(Json(&input.environment))
            .fetch_one(pool)
            .await
    }

    /// Insert a deployment that is already underway, with its first log line.
    pub async fn create_started(
        pool: &PgPool,
        project_id: DbId,
        first_log: &str,
    ) -> Result<Deployment, sqlx::Error> {
        let query = format!(
            "INSERT INTO deployments (project_id, status, build_logs)
             VALUES ($1, $2, ARRAY[$3]::text[])
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(project_id)
            .bind(DeploymentStatus::Building.as_str())
            .bind(first_log)
            .fetch_one(pool)
            .await
    }

    /// Find a deployment by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Deployment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deployments WHERE id = $1");
        sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's deployments, most recent first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Deployment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM deployments
             WHERE project_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a guarded status change.
    ///
    /// Returns `None` when the row does not exist or its current status does
    /// not permit the move; callers re-read the row to tell the two apart.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        change: &DeploymentTransition,
    ) -> Result<Option<Deployment>, sqlx::Error> {
        let sources: Vec<&str> = change
            .to
            .allowed_sources()
            .iter()
            .map(|s| s.as_str())
            .collect();
        let logs: Vec<String> = change.log.iter().cloned().collect();

        let query = format!(
            "UPDATE deployments SET
                status = $2,
                build_logs = build_logs || $3::text[],
                url = COALESCE($4, url),
                environment = COALESCE($5, environment)
             WHERE id = $1 AND status = ANY($6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .bind(change.to.as_str())
            .bind(logs)
            .bind(&change.url)
            .bind(change.environment.as_ref().map(Json))
            .bind(sources)
            .fetch_optional(pool)
            .await
    }

    /// Delete a deployment by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM deployments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
