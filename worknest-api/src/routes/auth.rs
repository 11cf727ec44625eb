/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new user
/// - `POST /api/auth/login` - Login and get tokens
/// - `POST /api/auth/refresh` - Exchange a refresh token for a new pair
///
/// All three answer with the same body:
///
/// ```json
/// {
///   "token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "user": { "id": "uuid", "name": "Naina", "email": "naina@example.com", "role": "user", ... }
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;
use worknest_shared::{
    auth::jwt::{self, Claims, TokenType},
    models::user::{User, UserRole},
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair plus the authenticated user
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Access token (24h)
    pub token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    pub user: User,
}

/// Register a new user
///
/// Self-registration always creates a `user`; admins are created through
/// `POST /api/users`.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(mut req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    // A blank name must fail the length check
    req.name = req.name.trim().to_string();
    req.validate()?;

    let user = state
        .services
        .users
        .register_user(&req.name, &req.email, &req.password, UserRole::User)
        .await?;

    Ok((StatusCode::CREATED, Json(issue_tokens(&state, user)?)))
}

/// Login endpoint
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = state
        .services
        .users
        .authenticate(&req.email, &req.password)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(issue_tokens(&state, user)?))
}

/// Token refresh endpoint
///
/// The user is reloaded so a role change or deletion since the refresh
/// token was issued takes effect.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token, or the user is gone
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = state
        .services
        .users
        .get_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(issue_tokens(&state, user)?))
}

fn issue_tokens(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let access_claims = Claims::new(user.id, user.role, TokenType::Access);
    let refresh_claims = Claims::new(user.id, user.role, TokenType::Refresh);

    Ok(AuthResponse {
        token: jwt::create_token(&access_claims, state.jwt_secret())?,
        refresh_token: jwt::create_token(&refresh_claims, state.jwt_secret())?,
        user,
    })
}
