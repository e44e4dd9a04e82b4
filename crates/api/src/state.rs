use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::LifecycleRunner;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: shipyard_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Owner of the background generate/build/deploy tasks.
    pub runner: Arc<LifecycleRunner>,
}
