/// Task model and database operations
///
/// Tasks are assigned to exactly one user and move through three statuses.
///
/// # Status
///
/// ```text
/// pending ⇄ in_progress ⇄ completed
/// ```
///
/// Every status can be set from every other status; no transition graph is
/// enforced. A task that is not completed and whose due date lies before
/// today is *delayed*. Delayed is derived on read and never stored.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     assigned_user_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     start_date DATE NOT NULL,
///     due_date DATE NOT NULL,
///     status task_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use worknest_shared::models::task::{Task, CreateTask, TaskStatus};
/// use worknest_shared::db::pool::{create_pool, DatabaseConfig};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Write docs".to_string(),
///     description: String::new(),
///     assigned_user_id: Uuid::new_v4(),
///     start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     due_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
///     status: TaskStatus::Pending,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Task progress status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Pending,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    /// All statuses, in display order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Case-insensitive, accepts `IN_PROGRESS` as well as `in_progress`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("Unknown task status: {}", other)),
        }
    }
}

/// Listing filter: a concrete status, or the derived delayed classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    Status(TaskStatus),
    Delayed,
}

impl TaskFilter {
    /// Checks whether a task passes this filter on the given day
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            TaskFilter::Status(status) => task.status == *status,
            TaskFilter::Delayed => task.is_delayed_on(today),
        }
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("delayed") {
            return Ok(TaskFilter::Delayed);
        }
        s.parse::<TaskStatus>().map(TaskFilter::Status)
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    pub title: String,

    pub description: String,

    /// The assignee
    pub assigned_user_id: Uuid,

    /// Assignee display name, joined in on read
    pub assigned_user_name: Option<String>,

    pub start_date: NaiveDate,

    /// Day the task is due; no ordering against `start_date` is enforced
    pub due_date: NaiveDate,

    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Delayed classification against an explicit day
    pub fn is_delayed_on(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_date < today
    }

    /// Delayed classification against the current UTC date
    pub fn is_delayed(&self) -> bool {
        self.is_delayed_on(today())
    }

    /// Overwrites every editable field
    pub fn apply(&mut self, fields: TaskFields) {
        self.title = fields.title;
        self.description = fields.description;
        if self.assigned_user_id != fields.assigned_user_id {
            self.assigned_user_name = None;
        }
        self.assigned_user_id = fields.assigned_user_id;
        self.start_date = fields.start_date;
        self.due_date = fields.due_date;
        self.status = fields.status;
    }
}

/// The calendar day used for delayed classification
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub assigned_user_id: Uuid,

    pub start_date: NaiveDate,

    pub due_date: NaiveDate,

    #[serde(default)]
    pub status: TaskStatus,
}

/// Full set of editable task fields, used for whole-record overwrites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub assigned_user_id: Uuid,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
}

const SELECT_TASKS: &str = r#"
    SELECT t.id, t.title, t.description, t.assigned_user_id, u.name AS assigned_user_name,
           t.start_date, t.due_date, t.status, t.created_at
    FROM tasks t
    LEFT JOIN users u ON u.id = t.assigned_user_id
"#;

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the assignee doesn't exist (foreign key violation)
    /// or the database connection fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            WITH inserted AS (
                INSERT INTO tasks (title, description, assigned_user_id, start_date, due_date, status)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT i.id, i.title, i.description, i.assigned_user_id, u.name AS assigned_user_name,
                   i.start_date, i.due_date, i.status, i.created_at
            FROM inserted i
            LEFT JOIN users u ON u.id = i.assigned_user_id
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.assigned_user_id)
        .bind(data.start_date)
        .bind(data.due_date)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!("{} WHERE t.id = $1", SELECT_TASKS))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists every task, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "{} ORDER BY t.created_at DESC",
            SELECT_TASKS
        ))
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists the tasks assigned to a user, newest first
    pub async fn list_by_assignee(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "{} WHERE t.assigned_user_id = $1 ORDER BY t.created_at DESC",
            SELECT_TASKS
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks with the given status, newest first
    pub async fn list_by_status(pool: &PgPool, status: TaskStatus) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "{} WHERE t.status = $1 ORDER BY t.created_at DESC",
            SELECT_TASKS
        ))
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks that are not completed and were due before `today`
    pub async fn list_delayed(pool: &PgPool, today: NaiveDate) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "{} WHERE t.status <> 'completed' AND t.due_date < $1 ORDER BY t.due_date ASC, t.created_at DESC",
            SELECT_TASKS
        ))
        .bind(today)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Writes every editable field of `task` back by ID
    ///
    /// # Returns
    ///
    /// The stored task, or None if no row has this ID
    pub async fn save(pool: &PgPool, task: &Task) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            WITH updated AS (
                UPDATE tasks
                SET title = $2,
                    description = $3,
                    assigned_user_id = $4,
                    start_date = $5,
                    due_date = $6,
                    status = $7
                WHERE id = $1
                RETURNING *
            )
            SELECT d.id, d.title, d.description, d.assigned_user_id, u.name AS assigned_user_name,
                   d.start_date, d.due_date, d.status, d.created_at
            FROM updated d
            LEFT JOIN users u ON u.id = d.assigned_user_id
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assigned_user_id)
        .bind(task.start_date)
        .bind(task.due_date)
        .bind(task.status)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Counts all tasks
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts tasks with the given status
    pub async fn count_by_status(pool: &PgPool, status: TaskStatus) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts delayed tasks as of `today`
    pub async fn count_delayed(pool: &PgPool, today: NaiveDate) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE status <> 'completed' AND due_date < $1",
        )
        .bind(today)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Deletes a task
    ///
    /// ⚠️  This also deletes the task's comments due to CASCADE.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
