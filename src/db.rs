//! SQLite-backed to-do list.
//!
//! One table: a task belongs to a Telegram user, carries its text and a
//! completed flag. Tasks are completed, never deleted, so `/done` flips the
//! flag and the row stays for the record.

use anyhow::{Context, Result};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// A to-do item owned by a single user.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub task: String,
    pub completed: bool,
    pub created_at: String,
}

/// Open (or create) the task database at the given path.
pub async fn connect(path: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open task database at {path}"))?;

    Ok(pool)
}

/// Create the tasks table if it does not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            task TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create tasks table")?;

    info!("Task database schema initialized");
    Ok(())
}

/// Add a task for a user. Returns the new row id.
pub async fn add_task(pool: &SqlitePool, user_id: i64, text: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO tasks (user_id, task) VALUES (?, ?)")
        .bind(user_id)
        .bind(text)
        .execute(pool)
        .await
        .context("Failed to insert task")?;

    Ok(result.last_insert_rowid())
}

/// Open (not yet completed) tasks for a user, oldest first.
pub async fn list_open_tasks(pool: &SqlitePool, user_id: i64) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, user_id, task, completed, created_at
         FROM tasks
         WHERE user_id = ? AND completed = 0
         ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list tasks")?;

    Ok(tasks)
}

/// Mark the n-th open task (1-based, as shown by `/list`) as completed.
/// Returns the completed task, or `None` when the index is out of range.
pub async fn complete_task(pool: &SqlitePool, user_id: i64, index: usize) -> Result<Option<Task>> {
    let open = list_open_tasks(pool, user_id).await?;
    let Some(task) = index.checked_sub(1).and_then(|i| open.get(i)) else {
        return Ok(None);
    };

    sqlx::query("UPDATE tasks SET completed = 1 WHERE id = ?")
        .bind(task.id)
        .execute(pool)
        .await
        .context("Failed to complete task")?;

    info!("Task {} completed for user {}", task.id, user_id);
    Ok(Some(task.clone()))
}
