//! Route definitions for the `/deployments` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::deployment;
use crate::state::AppState;

/// Routes mounted at `/deployments`.
///
/// ```text
/// GET    /{id}          -> get_by_id
/// DELETE /{id}          -> delete
/// GET    /{id}/status   -> status
/// GET    /{id}/logs     -> logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(deployment::get_by_id).delete(deployment::delete))
        .route("/{id}/status", get(deployment::status))
        .route("/{id}/logs", get(deployment::logs))
}
