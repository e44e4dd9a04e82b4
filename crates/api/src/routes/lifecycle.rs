//! Route definitions for the lifecycle triggers.

use axum::routing::post;
use axum::Router;

use crate::handlers::lifecycle;
use crate::state::AppState;

/// Routes merged at the `/api` root.
///
/// ```text
/// POST /generate  -> generate
/// POST /build     -> build
/// POST /deploy    -> deploy
/// ```
///
/// Any other method answers 405.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(lifecycle::generate))
        .route("/build", post(lifecycle::build))
        .route("/deploy", post(lifecycle::deploy))
}
