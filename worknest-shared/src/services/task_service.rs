/// Task rules: creation, listings, updates, assignment and statistics
///
/// # Delayed
///
/// "Delayed" is evaluated against [`today`] at call time, never cached.
///
/// # Recent listings
///
/// `get_recent_tasks` and `get_recent_user_tasks` load the full newest-first
/// listing and truncate it here. There is no storage-side limit.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::policy::can_transition_status;
use crate::models::task::{today, CreateTask, Task, TaskFields, TaskFilter, TaskStatus};
use crate::models::user::User;
use crate::store::TaskStore;

/// Task counts by status, plus the delayed count
///
/// `pending + in_progress + completed == total`. `delayed` overlaps the
/// first two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatistics {
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub delayed: i64,
    pub total: i64,
}

impl TaskStatistics {
    /// Folds a task list into counts as of `today`
    pub fn from_tasks(tasks: &[Task], today: chrono::NaiveDate) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
            if task.is_delayed_on(today) {
                stats.delayed += 1;
            }
            stats.total += 1;
            stats
        })
    }
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Persists a task as given
    ///
    /// A due date before the start date is accepted.
    ///
    /// # Errors
    ///
    /// `ServiceError::Conflict` if the assignee does not exist
    pub async fn create_task(&self, data: CreateTask) -> ServiceResult<Task> {
        let task = self.store.insert_task(data).await?;
        info!(task_id = %task.id, assignee = %task.assigned_user_id, "Task created");
        Ok(task)
    }

    /// Every task, newest first
    pub async fn get_all_tasks(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.store.find_all_tasks_recent_first().await?)
    }

    pub async fn get_task_by_id(&self, id: Uuid) -> ServiceResult<Option<Task>> {
        Ok(self.store.find_task(id).await?)
    }

    /// Tasks assigned to `user`, newest first
    pub async fn get_tasks_by_user(&self, user: &User) -> ServiceResult<Vec<Task>> {
        Ok(self.store.find_tasks_by_assignee_recent_first(user.id).await?)
    }

    pub async fn get_tasks_by_status(&self, status: TaskStatus) -> ServiceResult<Vec<Task>> {
        Ok(self.store.find_tasks_by_status(status).await?)
    }

    /// Tasks not completed and due before today
    pub async fn get_delayed_tasks(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.store.find_delayed_tasks(today()).await?)
    }

    /// Tasks assigned to `user` that pass `filter`, newest first
    pub async fn get_user_tasks_filtered(
        &self,
        user: &User,
        filter: TaskFilter,
    ) -> ServiceResult<Vec<Task>> {
        let today = today();
        let mut tasks = self.get_tasks_by_user(user).await?;
        tasks.retain(|task| filter.matches(task, today));
        Ok(tasks)
    }

    /// Overwrites every editable field
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the task does not exist
    /// - `ServiceError::Conflict` if the new assignee does not exist
    pub async fn update_task(&self, id: Uuid, fields: TaskFields) -> ServiceResult<Task> {
        let mut task = self.require_task(id).await?;
        task.apply(fields);

        let saved = self.save(task).await?;
        info!(task_id = %id, "Task updated");
        Ok(saved)
    }

    /// Sets a task's status on behalf of `acting_user`
    ///
    /// Only the assignee may do this. Admins are not exempt.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the task does not exist
    /// - `ServiceError::AccessDenied` if `acting_user` is not the assignee
    pub async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        acting_user: &User,
    ) -> ServiceResult<Task> {
        let mut task = self.require_task(id).await?;

        if !can_transition_status(acting_user, &task) {
            warn!(task_id = %id, user_id = %acting_user.id, "Status change denied, not the assignee");
            return Err(ServiceError::AccessDenied(
                "You can only update the status of tasks assigned to you".to_string(),
            ));
        }

        let previous = task.status;
        task.status = status;

        let saved = self.save(task).await?;
        info!(task_id = %id, from = %previous, to = %status, "Task status updated");
        Ok(saved)
    }

    /// Reassigns a task to `user`
    ///
    /// No ownership check. Assigning to the current assignee is a no-op.
    ///
    /// # Errors
    ///
    /// `ServiceError::NotFound` if the task does not exist
    pub async fn assign_task_to_user(&self, task_id: Uuid, user: &User) -> ServiceResult<Task> {
        let mut task = self.require_task(task_id).await?;

        if task.assigned_user_id == user.id {
            debug!(task_id = %task_id, user_id = %user.id, "Task already assigned to user");
            return Ok(task);
        }

        task.assigned_user_id = user.id;
        task.assigned_user_name = Some(user.name.clone());

        let saved = self.save(task).await?;
        info!(task_id = %task_id, assignee = %user.id, "Task reassigned");
        Ok(saved)
    }

    /// Deletes a task and, through the store, its comments
    ///
    /// ⚠️  Unconditional. Deleting an ID that does not exist succeeds.
    pub async fn delete_task(&self, id: Uuid) -> ServiceResult<()> {
        if self.store.delete_task(id).await? {
            info!(task_id = %id, "Task deleted");
        } else {
            debug!(task_id = %id, "Delete of absent task ignored");
        }
        Ok(())
    }

    /// Counts across all tasks, computed by the store
    pub async fn get_task_statistics(&self) -> ServiceResult<TaskStatistics> {
        Ok(TaskStatistics {
            pending: self.store.count_tasks_by_status(TaskStatus::Pending).await?,
            in_progress: self.store.count_tasks_by_status(TaskStatus::InProgress).await?,
            completed: self.store.count_tasks_by_status(TaskStatus::Completed).await?,
            delayed: self.store.count_delayed_tasks(today()).await?,
            total: self.store.count_tasks().await?,
        })
    }

    /// Counts across `user`'s tasks, folded in memory
    pub async fn get_user_task_statistics(&self, user: &User) -> ServiceResult<TaskStatistics> {
        let tasks = self.get_tasks_by_user(user).await?;
        Ok(TaskStatistics::from_tasks(&tasks, today()))
    }

    /// The `limit` newest tasks
    pub async fn get_recent_tasks(&self, limit: usize) -> ServiceResult<Vec<Task>> {
        let mut tasks = self.get_all_tasks().await?;
        tasks.truncate(limit);
        Ok(tasks)
    }

    /// The `limit` newest tasks assigned to `user`
    pub async fn get_recent_user_tasks(&self, user: &User, limit: usize) -> ServiceResult<Vec<Task>> {
        let mut tasks = self.get_tasks_by_user(user).await?;
        tasks.truncate(limit);
        Ok(tasks)
    }

    async fn require_task(&self, id: Uuid) -> ServiceResult<Task> {
        self.store
            .find_task(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", id))
    }

    async fn save(&self, task: Task) -> ServiceResult<Task> {
        let id = task.id;
        self.store
            .save_task(&task)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", id))
    }
}
