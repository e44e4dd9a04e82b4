pub mod deployment;
pub mod health;
pub mod lifecycle;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /generate                              start code generation (POST)
/// /build                                 start a build (POST)
/// /deploy                                start a deployment (POST)
///
/// /projects                              list, create
/// /projects/{id}                         get, update, delete
/// /projects/{id}/files                   replace file map (PUT)
/// /projects/{id}/deployments             list, create
/// /projects/{id}/environment             list, set (GET, PUT)
/// /projects/{id}/environment/{key}       delete
///
/// /deployments/{id}                      get, delete
/// /deployments/{id}/status               full row (GET)
/// /deployments/{id}/logs                 log lines (GET)
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(lifecycle::router())
        .nest("/projects", project::router())
        .nest("/deployments", deployment::router())
}
