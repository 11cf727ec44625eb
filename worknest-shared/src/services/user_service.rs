/// User accounts: creation, lookup, deletion and login
///
/// `create_user` stores the credential exactly as given. The registration
/// path ([`UserService::register_user`]) hashes first; see [`crate::seed`]
/// for the one path that does not.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::models::user::{CreateUser, User, UserRole};
use crate::store::UserStore;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Persists a user with a credential the caller has already prepared
    ///
    /// # Errors
    ///
    /// `ServiceError::Conflict` if the email is taken
    pub async fn create_user(&self, data: CreateUser) -> ServiceResult<User> {
        let user = self.store.insert_user(data).await?;
        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn exists_by_email(&self, email: &str) -> ServiceResult<bool> {
        Ok(self.store.exists_by_email(email).await?)
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> ServiceResult<Option<User>> {
        Ok(self.store.find_user(id).await?)
    }

    pub async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        Ok(self.store.find_user_by_email(email).await?)
    }

    /// Users with the given role, ordered by name
    pub async fn get_users_by_role(&self, role: UserRole) -> ServiceResult<Vec<User>> {
        Ok(self.store.find_users_by_role(role).await?)
    }

    pub async fn get_all_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.find_all_users().await?)
    }

    /// Deletes a user
    ///
    /// ⚠️  Rejected with `Conflict` while the user still has tasks or comments.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if no user has this ID
    /// - `ServiceError::Conflict` if the user is still referenced
    pub async fn delete_user(&self, id: Uuid) -> ServiceResult<()> {
        if !self.store.delete_user(id).await? {
            return Err(ServiceError::not_found("User", id));
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Registers an account with a hashed password
    ///
    /// Checks the email first, then relies on the store's uniqueness
    /// constraint to catch a concurrent registration racing past the check.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Conflict` if the email is already registered
    /// - `ServiceError::Password` if hashing fails
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> ServiceResult<User> {
        if self.exists_by_email(email).await? {
            debug!(email = %email, "Registration rejected, email taken");
            return Err(ServiceError::Conflict(format!(
                "Email already registered: {}",
                email
            )));
        }

        let password_hash = hash_password(password)?;

        self.create_user(CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role,
        })
        .await
    }

    /// Checks an email and password pair
    ///
    /// A stored credential that is not a PHC hash (the clear-text bootstrap
    /// admin) never matches.
    ///
    /// # Errors
    ///
    /// `ServiceError::InvalidCredentials` for an unknown email or a wrong
    /// password
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<User> {
        let user = self
            .get_user_by_email(email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let matches = match verify_password(password, &user.password_hash) {
            Ok(matches) => matches,
            Err(PasswordError::InvalidHash(reason)) => {
                warn!(user_id = %user.id, reason = %reason, "Stored credential is not a password hash");
                false
            }
            Err(e) => return Err(e.into()),
        };

        if !matches {
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(user)
    }
}
