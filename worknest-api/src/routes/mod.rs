/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `dashboard`: User and admin dashboards
/// - `tasks`: Task listing, editing, status changes and comments
/// - `users`: User management (admin)
/// - `comments`: Comment listing (admin) and deletion

pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod health;
pub mod tasks;
pub mod users;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use worknest_shared::auth::middleware::AuthContext;
use worknest_shared::models::user::User;

/// Loads the user behind a validated token
///
/// A token can outlive its user; that case is treated as unauthenticated.
pub(crate) async fn acting_user(state: &AppState, auth: &AuthContext) -> ApiResult<User> {
    state
        .services
        .users
        .get_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))
}
