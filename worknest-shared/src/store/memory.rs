/// In-memory store
///
/// Keeps every table behind a single `tokio::sync::RwLock` and applies the
/// same constraints as the PostgreSQL schema: unique emails, assignee and
/// author references that must exist, RESTRICT on user deletion and CASCADE
/// from tasks to comments.
///
/// Rows carry an insertion sequence number so ordering stays stable when two
/// rows share a creation timestamp.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use worknest_shared::services::Services;
/// use worknest_shared::store::memory::MemoryStore;
///
/// let services = Services::new(Arc::new(MemoryStore::new()));
/// ```

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CommentStore, StoreError, StoreResult, TaskStore, UserStore};
use crate::models::comment::{Comment, CreateComment, RECENT_COMMENTS_CAP};
use crate::models::task::{CreateTask, Task, TaskStatus};
use crate::models::user::{CreateUser, User, UserRole};

#[derive(Debug, Clone)]
struct Row<T> {
    seq: u64,
    value: T,
}

#[derive(Debug, Default)]
struct Tables {
    next_seq: u64,
    users: HashMap<Uuid, Row<User>>,
    tasks: HashMap<Uuid, Row<Task>>,
    comments: HashMap<Uuid, Row<Comment>>,
}

impl Tables {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn user_name(&self, id: Uuid) -> Option<String> {
        self.users.get(&id).map(|row| row.value.name.clone())
    }

    fn task_view(&self, row: &Row<Task>) -> Task {
        let mut task = row.value.clone();
        task.assigned_user_name = self.user_name(task.assigned_user_id);
        task
    }

    fn comment_view(&self, row: &Row<Comment>) -> Comment {
        let mut comment = row.value.clone();
        comment.user_name = self.user_name(comment.user_id);
        comment.task_title = self.tasks.get(&comment.task_id).map(|t| t.value.title.clone());
        comment
    }

    /// Tasks matching `pred`, newest first
    fn tasks_recent_first(&self, pred: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut rows: Vec<&Row<Task>> = self.tasks.values().filter(|r| pred(&r.value)).collect();
        rows.sort_by(|a, b| {
            b.value
                .created_at
                .cmp(&a.value.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        rows.into_iter().map(|r| self.task_view(r)).collect()
    }

    fn comments_sorted(&self, pred: impl Fn(&Comment) -> bool, newest_first: bool) -> Vec<Comment> {
        let mut rows: Vec<&Row<Comment>> =
            self.comments.values().filter(|r| pred(&r.value)).collect();
        rows.sort_by(|a, b| {
            a.value
                .created_at
                .cmp(&b.value.created_at)
                .then(a.seq.cmp(&b.seq))
        });
        if newest_first {
            rows.reverse();
        }
        rows.into_iter().map(|r| self.comment_view(r)).collect()
    }

    fn require_user(&self, id: Uuid) -> StoreResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::Conflict(format!("Referenced user {} does not exist", id)))
        }
    }
}

/// Store keeping all rows in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|r| r.value.email == data.email) {
            return Err(StoreError::Conflict(format!(
                "Unique constraint violated: users_email_key ({})",
                data.email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            created_at: Utc::now(),
        };
        let seq = tables.next_seq();
        tables.users.insert(user.id, Row { seq, value: user.clone() });

        Ok(user)
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|r| r.value.email == email))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|r| r.value.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|r| r.value.email == email)
            .map(|r| r.value.clone()))
    }

    async fn find_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Row<User>> =
            tables.users.values().filter(|r| r.value.role == role).collect();
        rows.sort_by(|a, b| a.value.name.cmp(&b.value.name).then(a.seq.cmp(&b.seq)));
        Ok(rows.into_iter().map(|r| r.value.clone()).collect())
    }

    async fn find_all_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Row<User>> = tables.users.values().collect();
        rows.sort_by_key(|r| r.seq);
        Ok(rows.into_iter().map(|r| r.value.clone()).collect())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let referenced = tables.tasks.values().any(|r| r.value.assigned_user_id == id)
            || tables.comments.values().any(|r| r.value.user_id == id);
        if referenced {
            return Err(StoreError::Conflict(format!(
                "Row is still referenced: user {} has tasks or comments",
                id
            )));
        }

        Ok(tables.users.remove(&id).is_some())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        tables.require_user(data.assigned_user_id)?;

        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            assigned_user_id: data.assigned_user_id,
            assigned_user_name: None,
            start_date: data.start_date,
            due_date: data.due_date,
            status: data.status,
            created_at: Utc::now(),
        };
        let seq = tables.next_seq();
        let row = Row { seq, value: task };
        let view = tables.task_view(&row);
        tables.tasks.insert(view.id, row);

        Ok(view)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.get(&id).map(|r| tables.task_view(r)))
    }

    async fn find_all_tasks_recent_first(&self) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks_recent_first(|_| true))
    }

    async fn find_tasks_by_assignee_recent_first(&self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks_recent_first(|t| t.assigned_user_id == user_id))
    }

    async fn find_tasks_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks_recent_first(|t| t.status == status))
    }

    async fn find_delayed_tasks(&self, today: NaiveDate) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let mut tasks = tables.tasks_recent_first(|t| t.is_delayed_on(today));
        // Stable sort keeps newest-first within the same due date
        tasks.sort_by_key(|t| t.due_date);
        Ok(tasks)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.contains_key(&task.id) {
            return Ok(None);
        }
        tables.require_user(task.assigned_user_id)?;

        let view = match tables.tasks.get_mut(&task.id) {
            Some(row) => {
                let stored = &mut row.value;
                stored.title = task.title.clone();
                stored.description = task.description.clone();
                stored.assigned_user_id = task.assigned_user_id;
                stored.start_date = task.start_date;
                stored.due_date = task.due_date;
                stored.status = task.status;
                row.clone()
            }
            None => return Ok(None),
        };

        Ok(Some(tables.task_view(&view)))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.tasks.remove(&id).is_some();
        if removed {
            tables.comments.retain(|_, r| r.value.task_id != id);
        }
        Ok(removed)
    }

    async fn count_tasks(&self) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.len() as i64)
    }

    async fn count_tasks_by_status(&self, status: TaskStatus) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.values().filter(|r| r.value.status == status).count() as i64)
    }

    async fn count_delayed_tasks(&self, today: NaiveDate) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|r| r.value.is_delayed_on(today))
            .count() as i64)
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(&self, data: CreateComment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;
        tables.require_user(data.user_id)?;
        if !tables.tasks.contains_key(&data.task_id) {
            return Err(StoreError::Conflict(format!(
                "Referenced task {} does not exist",
                data.task_id
            )));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            task_id: data.task_id,
            task_title: None,
            user_id: data.user_id,
            user_name: None,
            comment_text: data.comment_text,
            created_at: Utc::now(),
        };
        let seq = tables.next_seq();
        let row = Row { seq, value: comment };
        let view = tables.comment_view(&row);
        tables.comments.insert(view.id, row);

        Ok(view)
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.get(&id).map(|r| tables.comment_view(r)))
    }

    async fn find_comments_by_task_oldest_first(&self, task_id: Uuid) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments_sorted(|c| c.task_id == task_id, false))
    }

    async fn find_all_comments_recent_first(&self) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments_sorted(|_| true, true))
    }

    async fn find_recent_comments_capped(&self) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut comments = tables.comments_sorted(|_| true, true);
        comments.truncate(RECENT_COMMENTS_CAP as usize);
        Ok(comments)
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.comments.remove(&id).is_some())
    }
}
