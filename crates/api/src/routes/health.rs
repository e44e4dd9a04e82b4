use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// Public liveness route, mounted outside `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}
