/// Comment model and database operations
///
/// Comments always belong to a task and are listed per task oldest first.
/// Global listings are newest first.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     comment_text TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// How many comments the "recent" query fetches at most
///
/// Callers asking for more still get at most this many.
pub const RECENT_COMMENTS_CAP: i64 = 10;

/// Comment model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,

    /// Parent task
    pub task_id: Uuid,

    /// Title of the parent task, joined in on read
    pub task_title: Option<String>,

    /// Author
    pub user_id: Uuid,

    /// Author display name, joined in on read
    pub user_name: Option<String>,

    pub comment_text: String,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub comment_text: String,
}

const SELECT_COMMENTS: &str = r#"
    SELECT c.id, c.task_id, t.title AS task_title, c.user_id, u.name AS user_name,
           c.comment_text, c.created_at
    FROM comments c
    LEFT JOIN tasks t ON t.id = c.task_id
    LEFT JOIN users u ON u.id = c.user_id
"#;

impl Comment {
    /// Creates a comment
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (task_id, user_id, comment_text)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT i.id, i.task_id, t.title AS task_title, i.user_id, u.name AS user_name,
                   i.comment_text, i.created_at
            FROM inserted i
            LEFT JOIN tasks t ON t.id = i.task_id
            LEFT JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(data.task_id)
        .bind(data.user_id)
        .bind(data.comment_text)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(&format!("{} WHERE c.id = $1", SELECT_COMMENTS))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(comment)
    }

    /// Lists a task's comments, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "{} WHERE c.task_id = $1 ORDER BY c.created_at ASC",
            SELECT_COMMENTS
        ))
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Lists all comments, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "{} ORDER BY c.created_at DESC",
            SELECT_COMMENTS
        ))
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Lists the [`RECENT_COMMENTS_CAP`] newest comments
    pub async fn list_recent(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "{} ORDER BY c.created_at DESC LIMIT $1",
            SELECT_COMMENTS
        ))
        .bind(RECENT_COMMENTS_CAP)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Deletes a comment
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
