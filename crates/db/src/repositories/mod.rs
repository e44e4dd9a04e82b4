//! One repository per table. Each method is a single round trip and
//! returns the backend's error unchanged.

mod deployment_repo;
mod environment_variable_repo;
mod project_repo;

pub use deployment_repo::DeploymentRepo;
pub use environment_variable_repo::EnvironmentVariableRepo;
pub use project_repo::ProjectRepo;
