#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tower::ServiceExt;
use uuid::Uuid;

use shipyard_api::config::ServerConfig;
use shipyard_api::engine::{BuildEngine, EngineError, LifecycleJob, LifecycleRunner, SimulatedEngine};
use shipyard_api::middleware::auth::AuthConfig;
use shipyard_api::router::build_app_router;
use shipyard_api::state::AppState;
use shipyard_core::deployment::DEFAULT_DEPLOY_DOMAIN;
use shipyard_db::models::deployment::Deployment;
use shipyard_db::repositories::DeploymentRepo;

pub const TEST_TOKEN: &str = "test-token";

/// Build a test `ServerConfig` with safe defaults.
///
/// Presence-only auth and a 50ms simulated engine keep lifecycle tests fast.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        deploy_domain: DEFAULT_DEPLOY_DOMAIN.to_string(),
        simulated_work: Duration::from_millis(50),
        auth: AuthConfig::default(),
    }
}

/// Build the full application router around the simulated engine.
pub fn build_test_app(pool: PgPool) -> Router {
    let engine = Arc::new(SimulatedEngine::new(test_config().simulated_work));
    build_test_app_with_engine(pool, engine)
}

/// Build the full application router around a caller-supplied engine.
///
/// Uses the same `build_app_router` as `router::serve`, so tests exercise the
/// production middleware stack.
pub fn build_test_app_with_engine(pool: PgPool, engine: Arc<dyn BuildEngine>) -> Router {
    build_test_app_with_config(pool, engine, test_config())
}

pub fn build_test_app_with_config(
    pool: PgPool,
    engine: Arc<dyn BuildEngine>,
    config: ServerConfig,
) -> Router {
    build_app_router(test_state(pool, engine, config))
}

/// Application state with a fresh runner around `engine`.
pub fn test_state(pool: PgPool, engine: Arc<dyn BuildEngine>, config: ServerConfig) -> AppState {
    let runner = Arc::new(LifecycleRunner::new(
        pool.clone(),
        engine,
        config.deploy_domain.clone(),
    ));
    AppState {
        pool,
        config: Arc::new(config),
        runner,
    }
}

// ---------------------------------------------------------------------------
// Engines
// ---------------------------------------------------------------------------

/// Holds every job until [`GatedEngine::open`] is called.
pub struct GatedEngine {
    gate: Semaphore,
}

impl GatedEngine {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
        }
    }

    pub fn open(&self) {
        self.gate.add_permits(64);
    }
}

#[async_trait]
impl BuildEngine for GatedEngine {
    async fn run(&self, _job: &LifecycleJob) -> Result<(), EngineError> {
        let _permit = self.gate.acquire().await.map_err(|_| EngineError::Cancelled)?;
        Ok(())
    }
}

/// Fails every job with the given reason.
pub struct FailingEngine(pub &'static str);

#[async_trait]
impl BuildEngine for FailingEngine {
    async fn run(&self, _job: &LifecycleJob) -> Result<(), EngineError> {
        Err(EngineError::Failed(self.0.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    send_as(app, TEST_TOKEN, method, uri, body).await
}

/// Send a request carrying `Authorization: Bearer <token>`.
pub async fn send_as(
    app: Router,
    token: &str,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"));
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(json)).await
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(json)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Send a request without an `Authorization` header.
pub async fn get_anonymous(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a project through the API and return its id.
pub async fn create_project(app: Router, name: &str) -> Uuid {
    let response = post_json(app, "/api/projects", serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["id"].as_str().unwrap().parse().unwrap()
}

/// Create a `pending` deployment through the API and return its id.
pub async fn create_deployment(app: Router, project_id: Uuid, environment: serde_json::Value) -> Uuid {
    let response = post_json(
        app,
        &format!("/api/projects/{project_id}/deployments"),
        serde_json::json!({ "environment": environment }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["id"].as_str().unwrap().parse().unwrap()
}

/// Poll the row until it reaches `deployed` or `failed`.
pub async fn wait_for_terminal(pool: &PgPool, id: Uuid) -> Deployment {
    for _ in 0..500 {
        let row = DeploymentRepo::find_by_id(pool, id).await.unwrap().unwrap();
        if row.status.is_terminal() {
            return row;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("deployment {id} never reached a terminal status");
}
