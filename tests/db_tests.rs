//! Task store round-trip tests against in-memory SQLite.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use znayka::db;

// One connection only: every pooled connection to "sqlite::memory:" would
// otherwise get its own empty database.
async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    db::init_schema(&pool).await.expect("failed to init schema");
    pool
}

#[tokio::test]
async fn test_add_then_list_shows_task_unchecked() {
    let pool = test_pool().await;

    db::add_task(&pool, 1, "buy milk").await.unwrap();
    let tasks = db::list_open_tasks(&pool, 1).await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task, "buy milk");
    assert!(!tasks[0].completed);
}

#[tokio::test]
async fn test_complete_removes_task_from_open_list() {
    let pool = test_pool().await;

    db::add_task(&pool, 1, "buy milk").await.unwrap();
    db::add_task(&pool, 1, "call mom").await.unwrap();

    let done = db::complete_task(&pool, 1, 1).await.unwrap();
    assert_eq!(done.unwrap().task, "buy milk");

    let open = db::list_open_tasks(&pool, 1).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].task, "call mom");
}

#[tokio::test]
async fn test_completed_task_row_is_kept() {
    let pool = test_pool().await;

    db::add_task(&pool, 1, "buy milk").await.unwrap();
    db::complete_task(&pool, 1, 1).await.unwrap();

    let row = sqlx::query("SELECT COUNT(*) AS n FROM tasks WHERE user_id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    let count: i64 = row.get("n");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_complete_with_out_of_range_index() {
    let pool = test_pool().await;
    db::add_task(&pool, 1, "buy milk").await.unwrap();

    assert!(db::complete_task(&pool, 1, 0).await.unwrap().is_none());
    assert!(db::complete_task(&pool, 1, 2).await.unwrap().is_none());
    assert_eq!(db::list_open_tasks(&pool, 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_tasks_are_scoped_per_user() {
    let pool = test_pool().await;

    db::add_task(&pool, 1, "mine").await.unwrap();
    db::add_task(&pool, 2, "yours").await.unwrap();

    let mine = db::list_open_tasks(&pool, 1).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].task, "mine");

    // Completing by index only sees the caller's tasks
    let done = db::complete_task(&pool, 2, 1).await.unwrap().unwrap();
    assert_eq!(done.task, "yours");
    assert_eq!(db::list_open_tasks(&pool, 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_preserves_insertion_order() {
    let pool = test_pool().await;

    for text in ["a", "b", "c"] {
        db::add_task(&pool, 1, text).await.unwrap();
    }

    let tasks = db::list_open_tasks(&pool, 1).await.unwrap();
    let texts: Vec<&str> = tasks.iter().map(|t| t.task.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
}
