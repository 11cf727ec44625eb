/// Comment rules
///
/// `get_recent_comments` is capped by the store at
/// [`RECENT_COMMENTS_CAP`](crate::models::comment::RECENT_COMMENTS_CAP)
/// before the caller's limit applies, so asking for more than that returns
/// at most that many comments.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::policy::can_delete_comment;
use crate::models::comment::{Comment, CreateComment};
use crate::models::task::Task;
use crate::models::user::User;
use crate::store::CommentStore;

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn CommentStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self { store }
    }

    /// Appends a comment by `user` to `task`. The text is not validated.
    pub async fn create_comment(&self, task: &Task, user: &User, text: &str) -> ServiceResult<Comment> {
        let comment = self
            .store
            .insert_comment(CreateComment {
                task_id: task.id,
                user_id: user.id,
                comment_text: text.to_string(),
            })
            .await?;

        info!(comment_id = %comment.id, task_id = %task.id, user_id = %user.id, "Comment created");
        Ok(comment)
    }

    /// A task's comments, oldest first
    pub async fn get_comments_by_task(&self, task: &Task) -> ServiceResult<Vec<Comment>> {
        Ok(self.store.find_comments_by_task_oldest_first(task.id).await?)
    }

    /// Every comment, newest first
    pub async fn get_all_comments(&self) -> ServiceResult<Vec<Comment>> {
        Ok(self.store.find_all_comments_recent_first().await?)
    }

    /// Up to `limit` newest comments, never more than
    /// [`RECENT_COMMENTS_CAP`](crate::models::comment::RECENT_COMMENTS_CAP)
    pub async fn get_recent_comments(&self, limit: usize) -> ServiceResult<Vec<Comment>> {
        let mut comments = self.store.find_recent_comments_capped().await?;
        comments.truncate(limit);
        Ok(comments)
    }

    /// Deletes a comment on behalf of `acting_user`
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the comment does not exist
    /// - `ServiceError::AccessDenied` if `acting_user` is not the author
    pub async fn delete_comment(&self, id: Uuid, acting_user: &User) -> ServiceResult<()> {
        let comment = self
            .store
            .find_comment(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment", id))?;

        if !can_delete_comment(acting_user, &comment) {
            warn!(comment_id = %id, user_id = %acting_user.id, "Comment delete denied, not the author");
            return Err(ServiceError::AccessDenied(
                "You can only delete your own comments".to_string(),
            ));
        }

        if !self.store.delete_comment(id).await? {
            return Err(ServiceError::not_found("Comment", id));
        }

        info!(comment_id = %id, "Comment deleted");
        Ok(())
    }
}
