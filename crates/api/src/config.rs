use std::time::Duration;

use shipyard_core::deployment::{DEFAULT_DEPLOY_DOMAIN, DEFAULT_SIMULATED_WORK};

use crate::middleware::auth::AuthConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight lifecycle tasks (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Domain appended to deployment ids to form public URLs.
    pub deploy_domain: String,
    /// Duration of the simulated engine work.
    pub simulated_work: Duration,
    /// Bearer token handling.
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `DEPLOY_DOMAIN`        | `gptengineer.app`          |
    /// | `SIMULATED_WORK_MS`    | `2000`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let deploy_domain =
            std::env::var("DEPLOY_DOMAIN").unwrap_or_else(|_| DEFAULT_DEPLOY_DOMAIN.into());

        let simulated_work = std::env::var("SIMULATED_WORK_MS")
            .ok()
            .map(|v| {
                v.parse::<u64>()
                    .map(Duration::from_millis)
                    .expect("SIMULATED_WORK_MS must be a valid u64")
            })
            .unwrap_or(DEFAULT_SIMULATED_WORK);

        let auth = AuthConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            deploy_domain,
            simulated_work,
            auth,
        }
    }
}
