//! Repository for the `environment_variables` table.

use shipyard_core::types::DbId;
use sqlx::PgPool;

use crate::models::environment_variable::{EnvironmentVariable, SetEnvironmentVariable};

const COLUMNS: &str = "project_id, key, value, created_at, updated_at";

/// Provides upsert/list/delete for project environment variables.
pub struct EnvironmentVariableRepo;

impl EnvironmentVariableRepo {
    /// Create the variable, or overwrite its value if the key already exists.
    pub async fn set(
        pool: &PgPool,
        project_id: DbId,
        input: &SetEnvironmentVariable,
    ) -> Result<EnvironmentVariable, sqlx::Error> {
        let query = format!(
            "INSERT INTO environment_variables (project_id, key, value)
             VALUES ($1, $2, $3)
             ON CONFLICT (project_id, key) DO UPDATE SET value = EXCLUDED.value
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EnvironmentVariable>(&query)
            .bind(project_id)
            .bind(&input.key)
            .bind(&input.value)
            .fetch_one(pool)
            .await
    }

    /// List a project's variables ordered by key.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<EnvironmentVariable>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM environment_variables WHERE project_id = $1 ORDER BY key"
        );
        sqlx::query_as::<_, EnvironmentVariable>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Delete one variable. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, project_id: DbId, key: &str) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM environment_variables WHERE project_id = $1 AND key = $2")
                .bind(project_id)
                .bind(key)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
