//! Deployment lifecycle engine.
//!
//! [`LifecycleRunner`] owns one background task per triggered deployment and
//! always writes the task's outcome back into the deployment row. The work
//! itself is delegated to a [`BuildEngine`]; [`SimulatedEngine`] stands in
//! for the real code-generation/build/deploy backend.

mod runner;
mod simulated;

use async_trait::async_trait;
use shipyard_core::deployment::LifecycleKind;
use shipyard_core::environment::Environment;
use shipyard_core::generation::GenerationParams;
use shipyard_core::types::DbId;

pub use runner::LifecycleRunner;
pub use simulated::SimulatedEngine;

/// Everything a background task needs to know about its deployment.
#[derive(Debug, Clone)]
pub struct LifecycleJob {
    pub kind: LifecycleKind,
    pub project_id: DbId,
    pub deployment_id: DbId,
    /// Present for `generate` jobs only.
    pub generation: Option<GenerationParams>,
    pub environment: Environment,
}

/// Errors raised inside a background task. Never returned to an HTTP
/// caller; the runner records them as the deployment's failure log line.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0}")]
    Failed(String),

    #[error("cancelled")]
    Cancelled,

    /// The row vanished or was moved to a status the task cannot leave.
    #[error("deployment {0} is no longer in progress")]
    Superseded(DbId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The seam between the lifecycle runner and whatever does the real work.
#[async_trait]
pub trait BuildEngine: Send + Sync {
    async fn run(&self, job: &LifecycleJob) -> Result<(), EngineError>;
}
