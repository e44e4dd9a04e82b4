use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use shipyard_core::deployment::{deployment_url, validate_transition, DeploymentStatus};
use shipyard_core::error::CoreError;
use shipyard_core::types::DbId;
use shipyard_db::models::deployment::{Deployment, DeploymentTransition};
use shipyard_db::repositories::DeploymentRepo;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::{BuildEngine, EngineError, LifecycleJob};
use crate::error::{AppError, AppResult};

/// Owns the background generate/build/deploy tasks.
///
/// At most one task runs per deployment. Each task holds a child of the
/// runner's shutdown token, so it can be cancelled individually (when its
/// deployment is deleted) or all together (on server shutdown).
pub struct LifecycleRunner {
    pool: PgPool,
    engine: Arc<dyn BuildEngine>,
    deploy_domain: String,
    tasks: RwLock<HashMap<DbId, CancellationToken>>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl LifecycleRunner {
    pub fn new(pool: PgPool, engine: Arc<dyn BuildEngine>, deploy_domain: impl Into<String>) -> Self {
        Self {
            pool,
            engine,
            deploy_domain: deploy_domain.into(),
            tasks: RwLock::new(HashMap::new()),
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Reserve the task slot for a deployment.
    ///
    /// Fails with `Conflict` if a task for it is already live.
    pub async fn claim(&self, deployment_id: DbId) -> Result<CancellationToken, CoreError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&deployment_id) {
            return Err(CoreError::Conflict(format!(
                "Deployment {deployment_id} already has a task in progress"
            )));
        }
        let token = self.shutdown.child_token();
        tasks.insert(deployment_id, token.clone());
        Ok(token)
    }

    /// Free a deployment's task slot.
    pub async fn release(&self, deployment_id: DbId) {
        self.tasks.write().await.remove(&deployment_id);
    }

    pub async fn running_count(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Signal a deployment's task to stop. Returns `false` if none is live.
    pub async fn cancel(&self, deployment_id: DbId) -> bool {
        match self.tasks.read().await.get(&deployment_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Claim the slot, apply the synchronous status change, and start the
    /// background task.
    ///
    /// Nothing is spawned when the change is refused: a missing row yields
    /// `NotFound`, a disallowed transition yields `Conflict`.
    pub async fn trigger(
        self: &Arc<Self>,
        job: LifecycleJob,
        initial: DeploymentTransition,
    ) -> AppResult<Deployment> {
        let id = job.deployment_id;
        let cancel = self.claim(id).await?;

        let row = match DeploymentRepo::transition(&self.pool, id, &initial).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                self.release(id).await;
                return Err(self.refusal(id, initial.to).await);
            }
            Err(e) => {
                self.release(id).await;
                return Err(e.into());
            }
        };

        self.start(job, cancel);
        Ok(row)
    }

    /// Spawn the background task for a slot already claimed with [`claim`].
    ///
    /// [`claim`]: Self::claim
    pub fn start(self: &Arc<Self>, job: LifecycleJob, cancel: CancellationToken) {
        let runner = Arc::clone(self);
        self.tracker.spawn(async move {
            runner.execute(job, cancel).await;
        });
    }

    /// Cancel every live task and wait up to `timeout` for them to record
    /// their outcome. Returns `true` if all tasks finished in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.shutdown.cancel();
        self.tracker.close();
        tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok()
    }

    async fn execute(&self, job: LifecycleJob, cancel: CancellationToken) {
        let id = job.deployment_id;
        let kind = job.kind;
        tracing::info!(
            deployment_id = %id,
            project_id = %job.project_id,
            kind = %kind,
            "Lifecycle task started",
        );

        match self.drive(&job, &cancel).await {
            Ok(deployment) => {
                tracing::info!(
                    deployment_id = %id,
                    kind = %kind,
                    url = deployment.url.as_deref().unwrap_or_default(),
                    "Lifecycle task completed",
                );
            }
            Err(e) => {
                tracing::warn!(deployment_id = %id, kind = %kind, error = %e, "Lifecycle task failed");
                let change = DeploymentTransition::to(DeploymentStatus::Failed)
                    .with_log(kind.failure_log(&e));
                match DeploymentRepo::transition(&self.pool, id, &change).await {
                    Ok(Some(_)) => {}
                    Ok(None) => tracing::debug!(
                        deployment_id = %id,
                        "Failure not recorded: deployment gone or already terminal",
                    ),
                    Err(db) => tracing::error!(
                        deployment_id = %id,
                        error = %db,
                        "Failed to record lifecycle failure",
                    ),
                }
            }
        }

        self.release(id).await;
    }

    async fn drive(
        &self,
        job: &LifecycleJob,
        cancel: &CancellationToken,
    ) -> Result<Deployment, EngineError> {
        let id = job.deployment_id;
        self.record(
            id,
            DeploymentTransition::to(DeploymentStatus::Building).with_log(job.kind.phase_log()),
        )
        .await?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EngineError::Cancelled),
            result = self.engine.run(job) => result?,
        }

        let url = deployment_url(&self.deploy_domain, id);
        self.record(
            id,
            DeploymentTransition::to(DeploymentStatus::Deployed)
                .with_log(job.kind.success_log())
                .with_url(url),
        )
        .await
    }

    async fn record(
        &self,
        id: DbId,
        change: DeploymentTransition,
    ) -> Result<Deployment, EngineError> {
        DeploymentRepo::transition(&self.pool, id, &change)
            .await?
            .ok_or(EngineError::Superseded(id))
    }

    /// Explain why a guarded update did not land.
    async fn refusal(&self, id: DbId, to: DeploymentStatus) -> AppError {
        match DeploymentRepo::find_by_id(&self.pool, id).await {
            Ok(None) => AppError::Core(CoreError::NotFound {
                entity: "Deployment",
                id,
            }),
            Ok(Some(row)) => AppError::Core(validate_transition(row.status, to).err().unwrap_or_else(
                || CoreError::Conflict(format!("Deployment {id} changed concurrently")),
            )),
            Err(e) => e.into(),
        }
    }
}
