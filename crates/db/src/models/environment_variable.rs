//! Project-scoped environment variable rows.

use serde::{Deserialize, Serialize};
use shipyard_core::environment::MAX_KEY_LEN;
use shipyard_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `environment_variables` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnvironmentVariable {
    pub project_id: DbId,
    pub key: String,
    pub value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or overwriting a variable.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetEnvironmentVariable {
    #[validate(length(min = 1, max = MAX_KEY_LEN))]
    pub key: String,
    pub value: String,
}
