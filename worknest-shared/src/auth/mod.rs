/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Axum middleware producing an [`middleware::AuthContext`]
/// - [`policy`]: access rules for tasks and comments
///
/// # Example
///
/// ```no_run
/// use worknest_shared::auth::password::{hash_password, verify_password};
/// use worknest_shared::auth::jwt::{create_token, Claims, TokenType};
/// use worknest_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), UserRole::User, TokenType::Access);
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;
