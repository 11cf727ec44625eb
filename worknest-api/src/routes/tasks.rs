/// Task endpoints
///
/// # Endpoints
///
/// Any authenticated user:
/// - `GET /api/tasks/my-tasks?filter=` - Own tasks, optionally filtered
/// - `POST /api/tasks` - Create a task
/// - `GET /api/tasks/:id` - Task with its comments (assignee or admin)
/// - `PATCH /api/tasks/:id/status` - Change status (assignee only)
/// - `POST /api/tasks/:id/assign` - Take over a task
/// - `POST /api/tasks/:id/comments` - Comment on a task (assignee or admin)
///
/// Admin only:
/// - `GET /api/tasks?status=` - All tasks, by status or `delayed`
/// - `PUT /api/tasks/:id` - Overwrite every field
/// - `DELETE /api/tasks/:id` - Delete a task and its comments

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::acting_user,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use worknest_shared::{
    auth::{middleware::AuthContext, policy},
    models::{
        comment::Comment,
        task::{CreateTask, Task, TaskFields, TaskFilter, TaskStatus},
        user::User,
    },
    services::ServiceError,
};

/// A task as returned by the API, with its delayed classification
#[derive(Debug, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,

    /// Not completed and past its due date
    pub delayed: bool,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        let delayed = task.is_delayed();
        Self { task, delayed }
    }
}

pub(crate) fn views(tasks: Vec<Task>) -> Vec<TaskView> {
    tasks.into_iter().map(TaskView::from).collect()
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Serialize)]
pub struct TaskDetailResponse {
    pub task: TaskView,

    /// Oldest first
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub struct MyTasksQuery {
    /// A status, `delayed`, or `all`
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// A status or `delayed`
    pub status: Option<String>,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub start_date: NaiveDate,

    pub due_date: NaiveDate,

    #[serde(default)]
    pub status: TaskStatus,

    /// Defaults to the caller; only admins may name someone else
    pub assigned_user_id: Option<Uuid>,
}

/// Full task overwrite request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub assigned_user_id: Uuid,

    pub start_date: NaiveDate,

    pub due_date: NaiveDate,

    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub comment_text: String,
}

fn parse_filter(value: &str) -> ApiResult<TaskFilter> {
    value.parse::<TaskFilter>().map_err(ApiError::BadRequest)
}

/// Lists the caller's tasks, newest first
///
/// `filter` accepts a status, `delayed`, or `all` (same as omitting it).
pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<MyTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let user = acting_user(&state, &auth).await?;
    let tasks = &state.services.tasks;

    let tasks = match query.filter.as_deref() {
        None | Some("") => tasks.get_tasks_by_user(&user).await?,
        Some(f) if f.eq_ignore_ascii_case("all") => tasks.get_tasks_by_user(&user).await?,
        Some(f) => tasks.get_user_tasks_filtered(&user, parse_filter(f)?).await?,
    };

    Ok(Json(TaskListResponse {
        tasks: views(tasks),
    }))
}

/// Creates a task
///
/// # Errors
///
/// - `403 Forbidden`: A non-admin tried to assign someone else
/// - `409 Conflict`: The named assignee does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    req.validate()?;
    let user = acting_user(&state, &auth).await?;

    let assigned_user_id = match req.assigned_user_id {
        Some(id) if id != user.id && !policy::is_admin(&user) => {
            return Err(ApiError::Forbidden(
                "Only admins can assign tasks to other users".to_string(),
            ));
        }
        Some(id) => id,
        None => user.id,
    };

    let task = state
        .services
        .tasks
        .create_task(CreateTask {
            title: req.title,
            description: req.description,
            assigned_user_id,
            start_date: req.start_date,
            due_date: req.due_date,
            status: req.status,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Returns a task with its comments
///
/// # Errors
///
/// - `404 Not Found`: No such task
/// - `403 Forbidden`: Caller is neither the assignee nor an admin
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskDetailResponse>> {
    let user = acting_user(&state, &auth).await?;
    let task = visible_task(&state, id, &user).await?;
    let comments = state.services.comments.get_comments_by_task(&task).await?;

    Ok(Json(TaskDetailResponse {
        task: task.into(),
        comments,
    }))
}

/// Changes a task's status; only the assignee may do this
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TaskView>> {
    let user = acting_user(&state, &auth).await?;
    let task = state
        .services
        .tasks
        .update_task_status(id, req.status, &user)
        .await?;

    Ok(Json(task.into()))
}

/// Assigns a task to the caller
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskView>> {
    let user = acting_user(&state, &auth).await?;
    let task = state.services.tasks.assign_task_to_user(id, &user).await?;

    Ok(Json(task.into()))
}

/// Adds a comment authored by the caller
///
/// The text is stored as given.
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let user = acting_user(&state, &auth).await?;
    let task = visible_task(&state, id, &user).await?;

    let comment = state
        .services
        .comments
        .create_comment(&task, &user, &req.comment_text)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Lists every task (admin)
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = &state.services.tasks;

    let tasks = match query.status.as_deref() {
        None | Some("") => tasks.get_all_tasks().await?,
        Some(s) => match parse_filter(s)? {
            TaskFilter::Status(status) => tasks.get_tasks_by_status(status).await?,
            TaskFilter::Delayed => tasks.get_delayed_tasks().await?,
        },
    };

    Ok(Json(TaskListResponse {
        tasks: views(tasks),
    }))
}

/// Overwrites every editable field of a task (admin)
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskView>> {
    req.validate()?;

    let task = state
        .services
        .tasks
        .update_task(
            id,
            TaskFields {
                title: req.title,
                description: req.description,
                assigned_user_id: req.assigned_user_id,
                start_date: req.start_date,
                due_date: req.due_date,
                status: req.status,
            },
        )
        .await?;

    Ok(Json(task.into()))
}

/// Deletes a task and its comments (admin)
///
/// Deleting a task that does not exist still answers 204.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.tasks.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn visible_task(state: &AppState, id: Uuid, user: &User) -> ApiResult<Task> {
    let task = state
        .services
        .tasks
        .get_task_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Task", id))?;

    if !policy::can_view_task(user, &task) {
        tracing::warn!(user_id = %user.id, task_id = %id, "Task access denied");
        return Err(ApiError::Forbidden(
            "You can only view tasks assigned to you".to_string(),
        ));
    }

    Ok(task)
}
