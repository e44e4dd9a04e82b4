//! HTTP-level integration tests for deployment records.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json};
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_deployment_starts_pending_with_environment(pool: PgPool) {
    let project_id = common::create_project(common::build_test_app(pool.clone()), "App").await;

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/projects/{project_id}/deployments"),
        serde_json::json!({"environment": {"FOO": "bar"}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "pending");
    assert_eq!(json["project_id"], project_id.to_string());
    assert_eq!(json["environment"]["FOO"], "bar");
    assert!(json["url"].is_null());
    assert_eq!(json["build_logs"], serde_json::json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_deployment_for_missing_project_returns_404(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/projects/{}/deployments", Uuid::new_v4()),
        serde_json::json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_deployments_for_project(pool: PgPool) {
    let project_id = common::create_project(common::build_test_app(pool.clone()), "App").await;
    let other_id = common::create_project(common::build_test_app(pool.clone()), "Other").await;
    for _ in 0..2 {
        common::create_deployment(
            common::build_test_app(pool.clone()),
            project_id,
            serde_json::json!({}),
        )
        .await;
    }
    common::create_deployment(common::build_test_app(pool.clone()), other_id, serde_json::json!({})).await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/projects/{project_id}/deployments"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_and_logs_of_pending_deployment(pool: PgPool) {
    let project_id = common::create_project(common::build_test_app(pool.clone()), "App").await;
    let id = common::create_deployment(
        common::build_test_app(pool.clone()),
        project_id,
        serde_json::json!({}),
    )
    .await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/deployments/{id}/status"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["status"], "pending");

    let response = get(common::build_test_app(pool), &format!("/api/deployments/{id}/logs")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"logs": []}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_of_unknown_deployment_returns_404(pool: PgPool) {
    let response = get(
        common::build_test_app(pool),
        &format!("/api/deployments/{}/status", Uuid::new_v4()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_deployment_returns_204_then_404(pool: PgPool) {
    let project_id = common::create_project(common::build_test_app(pool.clone()), "App").await;
    let id = common::create_deployment(
        common::build_test_app(pool.clone()),
        project_id,
        serde_json::json!({}),
    )
    .await;
    let uri = format!("/api/deployments/{id}");

    assert_eq!(
        delete(common::build_test_app(pool.clone()), &uri).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        get(common::build_test_app(pool.clone()), &uri).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        delete(common::build_test_app(pool), &uri).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_project_removes_its_deployments(pool: PgPool) {
    let project_id = common::create_project(common::build_test_app(pool.clone()), "App").await;
    let id = common::create_deployment(
        common::build_test_app(pool.clone()),
        project_id,
        serde_json::json!({}),
    )
    .await;

    delete(
        common::build_test_app(pool.clone()),
        &format!("/api/projects/{project_id}"),
    )
    .await;

    let response = get(common::build_test_app(pool), &format!("/api/deployments/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
