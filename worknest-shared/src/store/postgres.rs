/// PostgreSQL store
///
/// Thin wrapper that delegates to the query functions on the models and
/// classifies constraint violations via [`StoreError`].

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CommentStore, StoreResult, TaskStore, UserStore};
use crate::models::comment::{Comment, CreateComment};
use crate::models::task::{CreateTask, Task, TaskStatus};
use crate::models::user::{CreateUser, User, UserRole};

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        Ok(User::exists_by_email(&self.pool, email).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>> {
        Ok(User::list_by_role(&self.pool, role).await?)
    }

    async fn find_all_users(&self) -> StoreResult<Vec<User>> {
        Ok(User::list_all(&self.pool).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn find_all_tasks_recent_first(&self) -> StoreResult<Vec<Task>> {
        Ok(Task::list_all(&self.pool).await?)
    }

    async fn find_tasks_by_assignee_recent_first(&self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_assignee(&self.pool, user_id).await?)
    }

    async fn find_tasks_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_status(&self.pool, status).await?)
    }

    async fn find_delayed_tasks(&self, today: NaiveDate) -> StoreResult<Vec<Task>> {
        Ok(Task::list_delayed(&self.pool, today).await?)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        Ok(Task::save(&self.pool, task).await?)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn count_tasks(&self) -> StoreResult<i64> {
        Ok(Task::count(&self.pool).await?)
    }

    async fn count_tasks_by_status(&self, status: TaskStatus) -> StoreResult<i64> {
        Ok(Task::count_by_status(&self.pool, status).await?)
    }

    async fn count_delayed_tasks(&self, today: NaiveDate) -> StoreResult<i64> {
        Ok(Task::count_delayed(&self.pool, today).await?)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(&self, data: CreateComment) -> StoreResult<Comment> {
        Ok(Comment::create(&self.pool, data).await?)
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(Comment::find_by_id(&self.pool, id).await?)
    }

    async fn find_comments_by_task_oldest_first(&self, task_id: Uuid) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_by_task(&self.pool, task_id).await?)
    }

    async fn find_all_comments_recent_first(&self) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_all(&self.pool).await?)
    }

    async fn find_recent_comments_capped(&self) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_recent(&self.pool).await?)
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Comment::delete(&self.pool, id).await?)
    }
}
