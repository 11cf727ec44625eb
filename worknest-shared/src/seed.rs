/// Bootstrap data loaded at startup
///
/// Creates the default admin and two sample users when they are missing.
/// Running it again is harmless: every account is looked up by its own email
/// first.
///
/// # Admin credential
///
/// ⚠️  The bootstrap admin (`admin@worknest.com` / `admin123`) is stored with
/// its password in **clear text** unless [`SeedOptions::hash_admin_password`]
/// is set. A clear-text credential never verifies, so that admin cannot log in
/// until it is re-created with hashing on. Every other path hashes.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use worknest_shared::seed::{seed_defaults, SeedOptions};
/// use worknest_shared::services::Services;
/// use worknest_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let services = Services::new(Arc::new(MemoryStore::new()));
/// let report = seed_defaults(&services.users, SeedOptions::default()).await?;
/// println!("Created {} accounts", report.created.len());
/// # Ok(())
/// # }
/// ```

use tracing::{info, warn};

use crate::models::user::{CreateUser, UserRole};
use crate::services::{ServiceResult, UserService};

pub const ADMIN_NAME: &str = "Admin User";
pub const ADMIN_EMAIL: &str = "admin@worknest.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Sample accounts as (name, email)
pub const SAMPLE_USERS: [(&str, &str); 2] = [("Naina", "Naina@gmail.com"), ("Vinayak", "vinay@gmail.com")];
pub const SAMPLE_PASSWORD: &str = "password123";

/// Seed behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedOptions {
    /// Hash the bootstrap admin's password instead of storing it as typed
    pub hash_admin_password: bool,
}

/// Emails of the accounts a seed run created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: Vec<String>,
}

/// Creates the bootstrap admin and the sample users if they are missing
pub async fn seed_defaults(users: &UserService, options: SeedOptions) -> ServiceResult<SeedReport> {
    let mut report = SeedReport::default();

    if !users.exists_by_email(ADMIN_EMAIL).await? {
        if options.hash_admin_password {
            users
                .register_user(ADMIN_NAME, ADMIN_EMAIL, ADMIN_PASSWORD, UserRole::Admin)
                .await?;
        } else {
            warn!(email = ADMIN_EMAIL, "Bootstrap admin password stored in clear text");
            users
                .create_user(CreateUser {
                    name: ADMIN_NAME.to_string(),
                    email: ADMIN_EMAIL.to_string(),
                    password_hash: ADMIN_PASSWORD.to_string(),
                    role: UserRole::Admin,
                })
                .await?;
        }
        info!(email = ADMIN_EMAIL, "Default admin user created");
        report.created.push(ADMIN_EMAIL.to_string());
    }

    for (name, email) in SAMPLE_USERS {
        if users.exists_by_email(email).await? {
            continue;
        }
        users
            .register_user(name, email, SAMPLE_PASSWORD, UserRole::User)
            .await?;
        report.created.push(email.to_string());
    }

    if !report.created.is_empty() {
        info!(accounts = report.created.len(), "Seed data created");
    }

    Ok(report)
}
