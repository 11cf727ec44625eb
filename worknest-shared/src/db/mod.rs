/// Database layer for WorkNest
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded sqlx migrations
///
/// Query functions live on the models; see [`crate::models`].

pub mod migrations;
pub mod pool;
