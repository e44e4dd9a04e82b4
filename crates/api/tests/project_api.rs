//! HTTP-level integration tests for the `/api/projects` resource.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, delete, get, get_anonymous, post_json, put_json, send_as};
use jsonwebtoken::{encode, EncodingKey, Header};
use shipyard_api::middleware::auth::Claims;
use sqlx::PgPool;
use uuid::Uuid;

fn token_for(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id,
        role: Some("authenticated".into()),
        exp: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"unverified"),
    )
    .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_project_returns_201_with_defaults(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/projects",
        serde_json::json!({"name": "Landing page"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Landing page");
    assert_eq!(json["status"], "draft");
    assert_eq!(json["files"], serde_json::json!({}));
    assert!(json["id"].as_str().unwrap().parse::<Uuid>().is_ok());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_project_with_empty_name_returns_validation_error(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/projects", serde_json::json!({"name": ""})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"][0]["field"], "name");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_project_by_id(pool: PgPool) {
    let id = common::create_project(common::build_test_app(pool.clone()), "Get Me").await;

    let response = get(common::build_test_app(pool), &format!("/api/projects/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Get Me");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_nonexistent_project_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/projects/{}", Uuid::new_v4())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_id_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/projects/not-a-uuid").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_project_applies_only_given_fields(pool: PgPool) {
    let id = common::create_project(common::build_test_app(pool.clone()), "Original").await;

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/projects/{id}"),
        serde_json::json!({"status": "published"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["name"], "Original");
    assert_eq!(json["status"], "published");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_files_replaces_the_whole_map(pool: PgPool) {
    let id = common::create_project(common::build_test_app(pool.clone()), "Files").await;
    let uri = format!("/api/projects/{id}/files");

    put_json(
        common::build_test_app(pool.clone()),
        &uri,
        serde_json::json!({"files": {"index.html": "<h1>hi</h1>", "app.js": "1"}}),
    )
    .await;
    let response = put_json(
        common::build_test_app(pool),
        &uri,
        serde_json::json!({"files": {"index.html": "<h1>bye</h1>"}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["files"], serde_json::json!({"index.html": "<h1>bye</h1>"}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_file_path_is_rejected(pool: PgPool) {
    let id = common::create_project(common::build_test_app(pool.clone()), "Files").await;

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/projects/{id}/files"),
        serde_json::json!({"files": {" ": "x"}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_project_returns_204_then_404(pool: PgPool) {
    let id = common::create_project(common::build_test_app(pool.clone()), "Doomed").await;
    let uri = format!("/api/projects/{id}");

    let response = delete(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(common::build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_is_scoped_to_the_token_subject(pool: PgPool) {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    for (owner, name) in [(alice, "Alice's"), (bob, "Bob's")] {
        let response = send_as(
            common::build_test_app(pool.clone()),
            &token_for(owner),
            Method::POST,
            "/api/projects",
            Some(serde_json::json!({"name": name})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["user_id"], owner.to_string());
    }

    let response = send_as(
        common::build_test_app(pool.clone()),
        &token_for(alice),
        Method::GET,
        "/api/projects",
        None,
    )
    .await;
    let json = body_json(response).await;
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Alice's".to_string()]);

    // An opaque token carries no subject, so nothing is filtered.
    let response = get(common::build_test_app(pool), "/api/projects").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn requests_without_token_return_401(pool: PgPool) {
    let response = get_anonymous(common::build_test_app(pool.clone()), "/api/projects").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "No authorization header");

    let response = send_as(
        common::build_test_app(pool),
        "",
        Method::GET,
        "/api/projects",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
