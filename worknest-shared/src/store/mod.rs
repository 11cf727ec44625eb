/// Storage traits and implementations
///
/// The services only talk to storage through the traits in this module, so
/// they run unchanged against PostgreSQL in production and against the
/// in-memory store in tests.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: sqlx over a `PgPool`
/// - [`memory::MemoryStore`]: `RwLock`-guarded tables, no external services
///
/// # Ordering
///
/// Every "recent first" query orders by creation time descending. The task
/// listings by assignee and status are also newest first; comments within a
/// task are oldest first.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use worknest_shared::store::{memory::MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let exists = store.exists_by_email("admin@worknest.com").await?;
/// assert!(!exists);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::comment::{Comment, CreateComment};
use crate::models::task::{CreateTask, Task, TaskStatus};
use crate::models::user::{CreateUser, User, UserRole};

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The write would break a uniqueness or reference constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(format!(
                    "Unique constraint violated: {}",
                    db_err.constraint().unwrap_or("unknown")
                ));
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::Conflict(format!(
                    "Row is still referenced: {}",
                    db_err.constraint().unwrap_or("unknown")
                ));
            }
        }
        StoreError::Database(err)
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with `Conflict` if the email is taken.
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Users with the role, ordered by name
    async fn find_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>>;

    async fn find_all_users(&self) -> StoreResult<Vec<User>>;

    /// Deletes a user. Returns false if nothing matched.
    ///
    /// Fails with `Conflict` while tasks or comments still reference the user.
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
}

/// Task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    async fn find_all_tasks_recent_first(&self) -> StoreResult<Vec<Task>>;

    async fn find_tasks_by_assignee_recent_first(&self, user_id: Uuid) -> StoreResult<Vec<Task>>;

    async fn find_tasks_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>>;

    /// Tasks not completed and due before `today`
    async fn find_delayed_tasks(&self, today: NaiveDate) -> StoreResult<Vec<Task>>;

    /// Writes back every editable field. Returns None if the task is gone.
    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>>;

    /// Deletes a task and its comments. Returns false if nothing matched.
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    async fn count_tasks(&self) -> StoreResult<i64>;

    async fn count_tasks_by_status(&self, status: TaskStatus) -> StoreResult<i64>;

    async fn count_delayed_tasks(&self, today: NaiveDate) -> StoreResult<i64>;
}

/// Comment persistence
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, data: CreateComment) -> StoreResult<Comment>;

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;

    async fn find_comments_by_task_oldest_first(&self, task_id: Uuid) -> StoreResult<Vec<Comment>>;

    async fn find_all_comments_recent_first(&self) -> StoreResult<Vec<Comment>>;

    /// Newest comments, never more than
    /// [`RECENT_COMMENTS_CAP`](crate::models::comment::RECENT_COMMENTS_CAP)
    async fn find_recent_comments_capped(&self) -> StoreResult<Vec<Comment>>;

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool>;
}

/// A backend providing all three stores
pub trait Store: UserStore + TaskStore + CommentStore {}

impl<T: UserStore + TaskStore + CommentStore> Store for T {}
