/// Dashboard endpoints
///
/// - `GET /api/dashboard/user` - Own statistics and five most recent tasks
/// - `GET /api/dashboard/admin` - Global statistics, ten most recent tasks
///   and ten most recent comments

use crate::{app::AppState, error::ApiResult, routes::acting_user};
use axum::{extract::State, Extension, Json};
use serde::Serialize;
use worknest_shared::{
    auth::middleware::AuthContext, models::comment::Comment, services::TaskStatistics,
};

use super::tasks::{views, TaskView};

const USER_RECENT_TASKS: usize = 5;
const ADMIN_RECENT_ITEMS: usize = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboard {
    pub task_stats: TaskStatistics,
    pub recent_tasks: Vec<TaskView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub task_stats: TaskStatistics,
    pub recent_tasks: Vec<TaskView>,
    pub recent_comments: Vec<Comment>,
}

pub async fn user_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserDashboard>> {
    let user = acting_user(&state, &auth).await?;
    let tasks = &state.services.tasks;

    Ok(Json(UserDashboard {
        task_stats: tasks.get_user_task_statistics(&user).await?,
        recent_tasks: views(tasks.get_recent_user_tasks(&user, USER_RECENT_TASKS).await?),
    }))
}

pub async fn admin_dashboard(State(state): State<AppState>) -> ApiResult<Json<AdminDashboard>> {
    let services = &state.services;

    Ok(Json(AdminDashboard {
        task_stats: services.tasks.get_task_statistics().await?,
        recent_tasks: views(services.tasks.get_recent_tasks(ADMIN_RECENT_ITEMS).await?),
        recent_comments: services
            .comments
            .get_recent_comments(ADMIN_RECENT_ITEMS)
            .await?,
    }))
}
