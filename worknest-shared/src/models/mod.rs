/// Database models for WorkNest
///
/// This module contains the three entities and the SQL query functions the
/// PostgreSQL store delegates to.
///
/// # Models
///
/// - `user`: User accounts and roles
/// - `task`: Tasks, statuses and the delayed classification
/// - `comment`: Comments on tasks
///
/// # Example
///
/// ```no_run
/// use worknest_shared::models::user::{User, CreateUser, UserRole};
/// use worknest_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "John Doe".to_string(),
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: UserRole::User,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod task;
pub mod user;
