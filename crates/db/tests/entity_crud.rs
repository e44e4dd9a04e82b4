//! Integration tests for project and deployment CRUD operations.
//!
//! Exercises the repository layer against a real database:
//! - Create, read, update, and delete projects
//! - Owner filtering and ordering on list
//! - Deployment creation defaults and cascade delete

use std::collections::BTreeMap;

use shipyard_core::deployment::DeploymentStatus;
use shipyard_core::project::ProjectStatus;
use shipyard_db::models::deployment::CreateDeployment;
use shipyard_db::models::project::{CreateProject, UpdateProject};
use shipyard_db::repositories::{DeploymentRepo, ProjectRepo};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_project(name: &str, owner: Option<Uuid>) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: Some("Test Description".to_string()),
        user_id: owner,
        files: BTreeMap::new(),
        status: None,
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_project_defaults_to_draft(pool: PgPool) {
    let owner = Uuid::new_v4();
    let project = ProjectRepo::create(&pool, &new_project("Test Project", Some(owner)))
        .await
        .unwrap();

    assert_eq!(project.name, "Test Project");
    assert_eq!(project.description.as_deref(), Some("Test Description"));
    assert_eq!(project.user_id, Some(owner));
    assert_eq!(project.status, ProjectStatus::Draft);
    assert!(project.files.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_project_applies_only_given_fields(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Original", None))
        .await
        .unwrap();

    let updated = ProjectRepo::update(
        &pool,
        project.id,
        &UpdateProject {
            name: Some("Updated Project".to_string()),
            status: Some(ProjectStatus::Published),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("project should exist");

    assert_eq!(updated.name, "Updated Project");
    assert_eq!(updated.status, ProjectStatus::Published);
    assert_eq!(updated.description.as_deref(), Some("Test Description"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_missing_project_returns_none(pool: PgPool) {
    let result = ProjectRepo::update(&pool, Uuid::new_v4(), &UpdateProject::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_files_rewrites_whole_map(pool: PgPool) {
    let mut input = new_project("Files", None);
    input.files.insert("old.txt".into(), "stale".into());
    let project = ProjectRepo::create(&pool, &input).await.unwrap();

    let mut files = BTreeMap::new();
    files.insert("src/main.rs".to_string(), "fn main() {}".to_string());
    let updated = ProjectRepo::update_files(&pool, project.id, &files)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.files, files);
    assert!(!updated.files.contains_key("old.txt"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_owner_newest_first(pool: PgPool) {
    let owner = Uuid::new_v4();
    let first = ProjectRepo::create(&pool, &new_project("P1", Some(owner))).await.unwrap();
    let second = ProjectRepo::create(&pool, &new_project("P2", Some(owner))).await.unwrap();
    ProjectRepo::create(&pool, &new_project("Other", Some(Uuid::new_v4())))
        .await
        .unwrap();

    let mine = ProjectRepo::list(&pool, Some(owner)).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|p| p.user_id == Some(owner)));
    let ids: Vec<_> = mine.iter().map(|p| p.id).collect();
    assert!(ids.contains(&first.id) && ids.contains(&second.id));

    let everyone = ProjectRepo::list(&pool, None).await.unwrap();
    assert_eq!(everyone.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_project_cascades_to_deployments(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Doomed", None)).await.unwrap();
    let deployment = DeploymentRepo::create(&pool, project.id, &CreateDeployment::default())
        .await
        .unwrap();

    assert!(ProjectRepo::delete(&pool, project.id).await.unwrap());
    assert!(!ProjectRepo::delete(&pool, project.id).await.unwrap());
    assert!(DeploymentRepo::find_by_id(&pool, deployment.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Deployments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_deployment_starts_pending_with_environment(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("proj-1", None)).await.unwrap();
    let mut environment = BTreeMap::new();
    environment.insert("FOO".to_string(), "bar".to_string());

    let deployment = DeploymentRepo::create(&pool, project.id, &CreateDeployment { environment })
        .await
        .unwrap();

    assert_eq!(deployment.project_id, project.id);
    assert_eq!(deployment.status, DeploymentStatus::Pending);
    assert_eq!(deployment.environment.get("FOO").map(String::as_str), Some("bar"));
    assert!(deployment.build_logs.is_empty());
    assert!(deployment.url.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_started_records_first_log(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("gen", None)).await.unwrap();
    let deployment = DeploymentRepo::create_started(&pool, project.id, "Starting code generation...")
        .await
        .unwrap();

    assert_eq!(deployment.status, DeploymentStatus::Building);
    assert_eq!(deployment.build_logs, vec!["Starting code generation..."]);
    assert!(deployment.environment.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deployments_are_listed_per_project(pool: PgPool) {
    let a = ProjectRepo::create(&pool, &new_project("A", None)).await.unwrap();
    let b = ProjectRepo::create(&pool, &new_project("B", None)).await.unwrap();
    DeploymentRepo::create(&pool, a.id, &CreateDeployment::default()).await.unwrap();
    DeploymentRepo::create(&pool, a.id, &CreateDeployment::default()).await.unwrap();
    DeploymentRepo::create(&pool, b.id, &CreateDeployment::default()).await.unwrap();

    let listed = DeploymentRepo::list_by_project(&pool, a.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|d| d.project_id == a.id));
    assert!(listed[0].created_at >= listed[1].created_at);
}
