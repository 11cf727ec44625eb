/// Health check endpoint
///
/// Reports whether the server is up and, with the PostgreSQL backend,
/// whether the database answers.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "storage": "postgres",
///   "database": "connected",
///   "pool": { "total_connections": 2, "idle_connections": 1, "active_connections": 1 }
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;
use worknest_shared::db::pool::{get_pool_stats, health_check as ping, PoolStats};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    /// Application version
    pub version: String,

    /// `postgres` or `memory`
    pub storage: String,

    /// `connected`, `disconnected`, or `n/a` for the memory backend
    pub database: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolStats>,
}

/// Health check handler
///
/// Always answers 200; a failed database ping only downgrades `status`.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let (storage, database, pool) = match &state.db {
        Some(pool) => {
            let database = match ping(pool).await {
                Ok(()) => "connected",
                Err(e) => {
                    tracing::warn!(error = %e, "Database health check failed");
                    "disconnected"
                }
            };
            ("postgres", database, Some(get_pool_stats(pool)))
        }
        None => ("memory", "n/a", None),
    };

    Ok(Json(HealthResponse {
        status: if database == "disconnected" {
            "degraded".to_string()
        } else {
            "healthy".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: storage.to_string(),
        database: database.to_string(),
        pool,
    }))
}
