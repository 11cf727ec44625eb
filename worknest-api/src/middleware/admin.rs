/// Admin gate for management routes
///
/// Runs behind the JWT middleware. The token's `role` claim is not trusted:
/// the account is reloaded so that a deleted or demoted admin loses access
/// as soon as the change is stored, not when the token expires.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use worknest_api::{app::AppState, middleware::admin::require_admin};
///
/// fn admin_routes(state: AppState) -> Router<AppState> {
///     Router::new()
///         .route("/stats", get(|| async { "OK" }))
///         .route_layer(middleware::from_fn_with_state(state, require_admin))
/// }
/// ```

use crate::{
    app::AppState,
    error::ApiError,
    routes::acting_user,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use worknest_shared::auth::{middleware::AuthContext, policy};

/// Rejects the request unless the stored account behind the token is an admin
///
/// # Errors
///
/// - 401 if there is no auth context or the account no longer exists
/// - 403 if the account is not an admin
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

    let user = acting_user(&state, &auth).await?;

    if !policy::is_admin(&user) {
        tracing::warn!(
            user_id = %user.id,
            claimed_role = %auth.role,
            path = %req.uri().path(),
            "Non-admin denied admin route"
        );
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }

    Ok(next.run(req).await)
}
