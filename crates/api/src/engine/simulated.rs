use std::time::Duration;

use async_trait::async_trait;

use super::{BuildEngine, EngineError, LifecycleJob};

/// Stand-in engine: waits a fixed interval and reports success.
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    delay: Duration,
}

impl SimulatedEngine {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl BuildEngine for SimulatedEngine {
    async fn run(&self, job: &LifecycleJob) -> Result<(), EngineError> {
        tracing::debug!(
            deployment_id = %job.deployment_id,
            kind = %job.kind,
            delay_ms = self.delay.as_millis() as u64,
            model = job.generation.as_ref().map(|g| g.model.as_str()),
            "Simulating engine work",
        );
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
