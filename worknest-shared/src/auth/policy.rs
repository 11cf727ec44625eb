/// Access rules for tasks and comments
///
/// Pure predicates over the acting user and the resource, with no storage or
/// transport involved. The services and HTTP handlers call these instead of
/// comparing IDs inline.
///
/// | Rule                      | Allowed for            |
/// |---------------------------|------------------------|
/// | [`can_transition_status`] | the assignee only      |
/// | [`can_delete_comment`]    | the author only        |
/// | [`can_view_task`]         | the assignee or admins |
///
/// Admins get no exemption from the first two rules.
///
/// # Example
///
/// ```no_run
/// use worknest_shared::auth::policy::can_transition_status;
/// # use worknest_shared::models::{task::Task, user::User};
/// # fn example(user: &User, task: &Task) {
/// if !can_transition_status(user, task) {
///     // reject
/// }
/// # }
/// ```

use crate::models::comment::Comment;
use crate::models::task::Task;
use crate::models::user::User;

/// Whether `user` may change the status of `task`
pub fn can_transition_status(user: &User, task: &Task) -> bool {
    user.id == task.assigned_user_id
}

/// Whether `user` may delete `comment`
pub fn can_delete_comment(user: &User, comment: &Comment) -> bool {
    user.id == comment.user_id
}

/// Whether `user` may see `task`, its comments, and comment on it
pub fn can_view_task(user: &User, task: &Task) -> bool {
    is_admin(user) || user.id == task.assigned_user_id
}

pub fn is_admin(user: &User) -> bool {
    user.is_admin()
}
