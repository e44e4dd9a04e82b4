//! Deployment lifecycle: status machine, trigger kinds, and constants.
//!
//! A deployment moves `pending -> building -> deployed`, or to `failed`
//! from any non-terminal status. `building -> building` is permitted so the
//! background task can record phase progress. `deployed` and `failed` are
//! terminal.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Domain under which successful deployments are published.
pub const DEFAULT_DEPLOY_DOMAIN: &str = "gptengineer.app";

/// How long the simulated engine "works" before reporting success.
pub const DEFAULT_SIMULATED_WORK: Duration = Duration::from_secs(2);

/// Interval between status fetches while a deployment is in flight.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a deployment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    Building,
    Deployed,
    Failed,
}

impl DeploymentStatus {
    pub const ALL: [DeploymentStatus; 4] = [
        Self::Pending,
        Self::Building,
        Self::Deployed,
        Self::Failed,
    ];

    /// Return the string representation stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Building => "building",
            Self::Deployed => "deployed",
            Self::Failed => "failed",
        }
    }

    /// `deployed` and `failed` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deployed | Self::Failed)
    }

    /// Whether a row currently in `self` may be moved to `next`.
    pub fn can_transition_to(&self, next: DeploymentStatus) -> bool {
        use DeploymentStatus::*;
        match (self, next) {
            (Pending, Building) => true,
            (Building, Building) => true,
            (Building, Deployed) => true,
            (Pending | Building, Failed) => true,
            _ => false,
        }
    }

    /// Every status from which `self` is reachable in a single step.
    ///
    /// Used to build conditional updates (`WHERE status = ANY(..)`).
    pub fn allowed_sources(&self) -> Vec<DeploymentStatus> {
        Self::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(*self))
            .collect()
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "building" => Ok(Self::Building),
            "deployed" => Ok(Self::Deployed),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown deployment status '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for DeploymentStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Check a transition and describe the refusal if it is illegal.
pub fn validate_transition(
    from: DeploymentStatus,
    to: DeploymentStatus,
) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Deployment cannot move from '{from}' to '{to}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Trigger kinds
// ---------------------------------------------------------------------------

/// The three actions that start a background lifecycle task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleKind {
    Generate,
    Build,
    Deploy,
}

impl LifecycleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Build => "build",
            Self::Deploy => "deploy",
        }
    }

    /// Human label used as the prefix of failure log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Generate => "Code generation",
            Self::Build => "Build",
            Self::Deploy => "Deployment",
        }
    }

    /// Log line written synchronously by the trigger handler.
    pub fn start_log(&self) -> &'static str {
        match self {
            Self::Generate => "Starting code generation...",
            Self::Build => "Starting build process...",
            Self::Deploy => "Starting deployment process...",
        }
    }

    /// Log line written by the background task before the engine runs.
    pub fn phase_log(&self) -> &'static str {
        match self {
            Self::Generate => "Processing prompt...",
            Self::Build | Self::Deploy => "Processing project files...",
        }
    }

    pub fn success_log(&self) -> &'static str {
        match self {
            Self::Generate => "Code generation completed successfully",
            Self::Build => "Build completed successfully",
            Self::Deploy => "Deployment completed successfully",
        }
    }

    pub fn failure_log(&self, reason: impl fmt::Display) -> String {
        format!("{} failed: {reason}", self.label())
    }

    /// Message returned to the caller once the task is scheduled.
    pub fn started_message(&self) -> &'static str {
        match self {
            Self::Generate => "Code generation started",
            Self::Build => "Build started",
            Self::Deploy => "Deployment started",
        }
    }
}

impl fmt::Display for LifecycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public URL of a successful deployment: `https://<id>.<domain>`.
pub fn deployment_url(domain: &str, deployment_id: DbId) -> String {
    format!("https://{deployment_id}.{domain}")
}
