//! Store tests against a real PostgreSQL server.
//!
//! Each test gets a fresh database with `migrations/` applied. Run with
//! `DATABASE_URL` pointing at a server the test user may create databases on:
//!
//! ```text
//! cargo test --test postgres -- --ignored
//! ```

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sqlx::PgPool;
use tasknest::error::AppError;
use tasknest::models::{NewUser, TaskChanges, TaskInput, TaskListInput, TaskQuery, TaskUpdate};
use tasknest::services::TaskService;
use tasknest::store::{CredentialStore, PgStore, ResourceStore};

async fn new_user(store: &PgStore, username: &str) -> i32 {
    store
        .insert_user(NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "not-a-real-hash".to_string(),
        })
        .await
        .expect("Failed to insert user")
        .id
}

fn task(title: &str, list_id: Option<i32>) -> TaskInput {
    TaskInput {
        title: title.to_string(),
        description: None,
        completed: false,
        due_date: None,
        list_id,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_username_or_email(pool: PgPool) {
    let store = PgStore::new(pool);
    new_user(&store, "alice").await;

    let same_username = store
        .insert_user(NewUser {
            username: "alice".to_string(),
            email: "other@example.com".to_string(),
            password_hash: "x".to_string(),
        })
        .await;
    assert!(matches!(same_username, Err(AppError::DuplicateIdentity)));

    let same_email = store
        .insert_user(NewUser {
            username: "alice2".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "x".to_string(),
        })
        .await;
    assert!(matches!(same_email, Err(AppError::DuplicateIdentity)));

    assert!(store.identity_taken("alice", "nobody@example.com").await.unwrap());
    assert!(!store.identity_taken("bob", "bob@example.com").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_list_name_is_per_user(pool: PgPool) {
    let store = PgStore::new(pool);
    let alice = new_user(&store, "alice").await;
    let bob = new_user(&store, "bob").await;

    store.insert_list(alice, "Work").await.unwrap();
    assert!(matches!(
        store.insert_list(alice, "Work").await,
        Err(AppError::DuplicateName(_))
    ));
    assert!(store.insert_list(bob, "Work").await.is_ok());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_dangling_list_reference_is_rejected(pool: PgPool) {
    let store = PgStore::new(pool);
    let alice = new_user(&store, "alice").await;

    assert!(matches!(
        store.insert_task(alice, task("Orphan", Some(9999))).await,
        Err(AppError::InvalidReference(_))
    ));
    assert!(store
        .tasks_for_user(alice, &TaskQuery::default())
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_list_detaches_tasks(pool: PgPool) {
    let store = Arc::new(PgStore::new(pool));
    let alice = new_user(&store, "alice").await;
    let service = TaskService::new(store.clone());

    let work = service
        .create_list(alice, TaskListInput { name: "Work".to_string() })
        .await
        .unwrap();
    let report = service
        .create_task(alice, task("Report", Some(work.id)))
        .await
        .unwrap();
    assert_eq!(report.list_id, Some(work.id));

    service.delete_list(alice, work.id).await.unwrap();

    let report = store.find_task(alice, report.id).await.unwrap().unwrap();
    assert_eq!(report.list_id, None);
    assert!(store.lists_for_user(alice).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_foreign_delete_list_changes_nothing(pool: PgPool) {
    let store = PgStore::new(pool);
    let alice = new_user(&store, "alice").await;
    let bob = new_user(&store, "bob").await;

    let work = store.insert_list(alice, "Work").await.unwrap();
    let report = store
        .insert_task(alice, task("Report", Some(work.id)))
        .await
        .unwrap();

    assert!(!store.delete_list(bob, work.id).await.unwrap());

    let report = store.find_task(alice, report.id).await.unwrap().unwrap();
    assert_eq!(report.list_id, Some(work.id));
    assert_eq!(store.lists_for_user(alice).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_partial_update_only_touches_supplied_fields(pool: PgPool) {
    let store = PgStore::new(pool);
    let alice = new_user(&store, "alice").await;
    let bob = new_user(&store, "bob").await;

    let created = store
        .insert_task(
            alice,
            TaskInput {
                description: Some("Quarterly numbers".to_string()),
                ..task("Report", None)
            },
        )
        .await
        .unwrap();

    let changes = TaskChanges::from(TaskUpdate {
        description: Some(None),
        completed: Some(true),
        ..Default::default()
    });
    let updated = store
        .update_task(alice, created.id, &changes)
        .await
        .unwrap()
        .expect("task should exist");

    assert_eq!(updated.title, "Report");
    assert_eq!(updated.description, None);
    assert!(updated.completed);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    // Another user's update matches no row.
    let hijack = TaskChanges {
        title: Some("Hijacked".to_string()),
        ..Default::default()
    };
    assert!(store.update_task(bob, created.id, &hijack).await.unwrap().is_none());
    let unchanged = store.find_task(alice, created.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Report");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_task_filters_and_paging(pool: PgPool) {
    let store = PgStore::new(pool);
    let alice = new_user(&store, "alice").await;
    let bob = new_user(&store, "bob").await;

    for title in ["Buy milk", "Buy bread", "Call mum", "Save 50% more"] {
        store.insert_task(alice, task(title, None)).await.unwrap();
    }
    store.insert_task(bob, task("Buy a boat", None)).await.unwrap();

    let titles = |tasks: Vec<tasknest::models::Task>| -> Vec<String> {
        tasks.into_iter().map(|t| t.title).collect()
    };

    let test_cases = vec![
        (
            TaskQuery {
                search: Some("buy".to_string()),
                ..Default::default()
            },
            vec!["Buy milk", "Buy bread"],
        ),
        (
            TaskQuery {
                search: Some("%".to_string()),
                ..Default::default()
            },
            vec!["Save 50% more"],
        ),
        (
            TaskQuery {
                skip: Some(1),
                limit: Some(2),
                ..Default::default()
            },
            vec!["Buy bread", "Call mum"],
        ),
        (
            TaskQuery {
                completed: Some(true),
                ..Default::default()
            },
            vec![],
        ),
    ];

    for (query, expected) in test_cases {
        let found = store.tasks_for_user(alice, &query).await.unwrap();
        assert_eq!(titles(found), expected, "query: {:?}", query);
    }
}
