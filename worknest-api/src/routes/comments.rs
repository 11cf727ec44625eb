/// Comment endpoints
///
/// - `GET /api/comments` - Every comment, newest first (admin)
/// - `DELETE /api/comments/:id` - Delete a comment (author only)

use crate::{app::AppState, error::ApiResult, routes::acting_user};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;
use worknest_shared::{auth::middleware::AuthContext, models::comment::Comment};

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
}

pub async fn list_comments(State(state): State<AppState>) -> ApiResult<Json<CommentListResponse>> {
    let comments = state.services.comments.get_all_comments().await?;
    Ok(Json(CommentListResponse { comments }))
}

/// Deletes a comment
///
/// Admins get no exemption: only the author may delete.
///
/// # Errors
///
/// - `404 Not Found`: No such comment
/// - `403 Forbidden`: Caller is not the author
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let user = acting_user(&state, &auth).await?;
    state.services.comments.delete_comment(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
