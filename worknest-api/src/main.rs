//! # WorkNest API Server
//!
//! Task tracking service for small teams: users work on the tasks assigned
//! to them and discuss them in comments, admins manage users and tasks.
//!
//! ## Usage
//!
//! ```bash
//! STORAGE_BACKEND=memory JWT_SECRET=$(openssl rand -hex 32) cargo run -p worknest-api
//! ```

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use worknest_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat, StorageBackend},
};
use worknest_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    seed::{seed_defaults, SeedOptions},
    services::Services,
    store::{memory::MemoryStore, postgres::PgStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        "WorkNest API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let (services, pool) = match config.storage {
        StorageBackend::Postgres => {
            let pool = create_pool(DatabaseConfig {
                url: config.database.url.clone(),
                max_connections: config.database.max_connections,
                ..Default::default()
            })
            .await?;
            run_migrations(&pool).await?;

            let services = Services::new(Arc::new(PgStore::new(pool.clone())));
            (services, Some(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on exit");
            (Services::new(Arc::new(MemoryStore::new())), None)
        }
    };

    if config.seed.enabled {
        let report = seed_defaults(
            &services.users,
            SeedOptions {
                hash_admin_password: config.seed.hash_admin_password,
            },
        )
        .await?;
        tracing::info!(created = ?report.created, "Seed complete");
    }

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(services, config, pool.clone()));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "worknest_api=debug,worknest_shared=debug,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
