/// Business rules for users, tasks and comments
///
/// Each service owns a handle to one store trait and enforces the rules the
/// storage layer cannot: existence checks, ownership gates, statistics and
/// the "recent" truncation. Every operation that needs an actor takes it as
/// an explicit `acting_user` argument.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use worknest_shared::services::Services;
/// use worknest_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let services = Services::new(Arc::new(MemoryStore::new()));
/// let stats = services.tasks.get_task_statistics().await?;
/// assert_eq!(stats.total, 0);
/// # Ok(())
/// # }
/// ```

pub mod comment_service;
pub mod task_service;
pub mod user_service;

use std::sync::Arc;
use uuid::Uuid;

pub use comment_service::CommentService;
pub use task_service::{TaskService, TaskStatistics};
pub use user_service::UserService;

use crate::auth::password::PasswordError;
use crate::store::{Store, StoreError};

/// Service error types
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// The acting user may not perform this operation
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Email already registered, or a referenced row blocks the change
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Login failed; deliberately does not say which part was wrong
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(StoreError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        ServiceError::NotFound { entity, id }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Store(other),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// All three services over one backend
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub tasks: TaskService,
    pub comments: CommentService,
}

impl Services {
    pub fn new<S: Store + 'static>(store: Arc<S>) -> Self {
        Self {
            users: UserService::new(store.clone()),
            tasks: TaskService::new(store.clone()),
            comments: CommentService::new(store),
        }
    }
}
