//! Follow a deployment until it reaches a terminal status.
//!
//! The poller fetches immediately, then once per interval, and hands every
//! snapshot to a caller callback. It stops on `deployed` or `failed`, on
//! the first fetch error, or when its [`CancellationToken`] fires.

use std::time::Duration;

use async_trait::async_trait;
use shipyard_core::deployment::DEFAULT_POLL_INTERVAL;
use shipyard_core::types::DbId;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::models::Deployment;

/// Anything that can produce the current state of a deployment.
#[async_trait]
pub trait DeploymentSource: Send + Sync {
    async fn fetch_deployment(&self, id: DbId) -> Result<Deployment, ClientError>;
}

/// Fixed-interval status poller. No backoff.
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    interval: Duration,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl StatusPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll `id` until it settles and return the final snapshot.
    ///
    /// Returns [`ClientError::Cancelled`] if `cancel` fires first. A
    /// deployment that never settles is polled until then.
    pub async fn poll<S, F>(
        &self,
        source: &S,
        id: DbId,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> Result<Deployment, ClientError>
    where
        S: DeploymentSource + ?Sized,
        F: FnMut(&Deployment),
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let deployment = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                result = source.fetch_deployment(id) => result?,
            };
            tracing::debug!(
                deployment_id = %id,
                attempt,
                status = %deployment.status,
                "Polled deployment status",
            );
            on_update(&deployment);

            if deployment.status.is_terminal() {
                return Ok(deployment);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
