//! Route definitions for the `/projects` resource.
//!
//! Also nests project-scoped deployment and environment variable routes
//! under `/projects/{id}/...`.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::{deployment, environment, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                 -> list
/// POST   /                                 -> create
/// GET    /{id}                             -> get_by_id
/// PUT    /{id}                             -> update
/// DELETE /{id}                             -> delete
/// PUT    /{id}/files                       -> update_files
///
/// GET    /{id}/deployments                 -> list_by_project
/// POST   /{id}/deployments                 -> create
///
/// GET    /{id}/environment                 -> list
/// PUT    /{id}/environment                 -> set
/// DELETE /{id}/environment/{key}           -> delete
/// ```
pub fn router() -> Router<AppState> {
    let deployment_routes = Router::new().route(
        "/",
        get(deployment::list_by_project).post(deployment::create),
    );

    let environment_routes = Router::new()
        .route("/", get(environment::list).put(environment::set))
        .route("/{key}", delete(environment::delete));

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/files", put(project::update_files))
        .nest("/{id}/deployments", deployment_routes)
        .nest("/{id}/environment", environment_routes)
}
