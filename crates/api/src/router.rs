//! HTTP surface of the API server.
//!
//! [`build_app_router`] assembles the routes and middleware from the state's
//! [`ServerConfig`]. [`serve`] runs that router until a shutdown signal and
//! then drains the lifecycle runner, so `main.rs` and the shutdown tests
//! share one code path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application [`Router`] for `state`.
///
/// Outermost first: CORS, request id, tracing, request id echo, timeout,
/// panic recovery. Lifecycle tasks are spawned by the runner, so the request
/// timeout bounds only the synchronous part of a trigger.
pub fn build_app_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let middleware = ServiceBuilder::new()
        .layer(build_cors_layer(&config))
        .map_response(|res: axum::http::Response<_>| res.map(Body::new))
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(CatchPanicLayer::new());

    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        .layer(middleware)
        .with_state(state)
}

/// Span for one request, tagged with the id set by `SetRequestIdLayer`.
fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id,
    )
}

/// Build the CORS layer from the configured origins.
///
/// Panics at startup if an origin does not parse as a header value.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Serve the API on `listener` until `signal` resolves.
///
/// Once connections are drained, every live lifecycle task is cancelled and
/// given `shutdown_timeout_secs` to record `<Kind> failed: cancelled` on its
/// deployment. Returns `Ok(true)` if all of them finished in time.
pub async fn serve<F>(listener: TcpListener, state: AppState, signal: F) -> std::io::Result<bool>
where
    F: Future<Output = ()> + Send + 'static,
{
    let runner = Arc::clone(&state.runner);
    let drain_limit = Duration::from_secs(state.config.shutdown_timeout_secs);

    axum::serve(listener, build_app_router(state))
        .with_graceful_shutdown(signal)
        .await?;

    let in_flight = runner.running_count().await;
    tracing::info!(in_flight, "Server stopped accepting connections, cancelling lifecycle tasks");

    let drained = runner.shutdown(drain_limit).await;
    if drained {
        tracing::info!("Lifecycle tasks drained");
    } else {
        tracing::warn!(
            timeout_secs = drain_limit.as_secs(),
            "Timed out waiting for lifecycle tasks"
        );
    }
    Ok(drained)
}
