/// User management endpoints (admin only)
///
/// - `GET /api/users?role=` - List users, optionally by role
/// - `POST /api/users` - Create a user with any role
/// - `GET /api/users/:id` - Fetch one user
/// - `DELETE /api/users/:id` - Delete a user with no tasks or comments

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use worknest_shared::{
    models::user::{User, UserRole},
    services::ServiceError,
};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// `admin` or `user`, case-insensitive
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::User
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let users = match query.role.as_deref() {
        None | Some("") => state.services.users.get_all_users().await?,
        Some(role) => {
            let role = role.parse::<UserRole>().map_err(ApiError::BadRequest)?;
            state.services.users.get_users_by_role(role).await?
        }
    };

    Ok(Json(UserListResponse { users }))
}

/// Creates a user
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn create_user(
    State(state): State<AppState>,
    Json(mut req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.name = req.name.trim().to_string();
    req.validate()?;

    let user = state
        .services
        .users
        .register_user(&req.name, &req.email, &req.password, req.role)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = state
        .services
        .users
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User", id))?;

    Ok(Json(user))
}

/// Deletes a user
///
/// # Errors
///
/// - `404 Not Found`: No such user
/// - `409 Conflict`: The user still has assigned tasks or comments
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
