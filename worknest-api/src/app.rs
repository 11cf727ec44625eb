/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use worknest_api::{app::AppState, config::Config};
/// use worknest_shared::services::Services;
/// use worknest_shared::store::memory::MemoryStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let services = Services::new(Arc::new(MemoryStore::new()));
/// let state = AppState::new(services, config, None);
/// let app = worknest_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{admin::require_admin, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post, put, MethodRouter},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use worknest_shared::auth::middleware::create_jwt_middleware;
use worknest_shared::services::Services;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// User, task and comment services over the configured store
    pub services: Services,

    /// Application configuration
    pub config: Arc<Config>,

    /// Connection pool, present only with the PostgreSQL backend
    pub db: Option<PgPool>,
}

impl AppState {
    /// Creates new application state
    pub fn new(services: Services, config: Config, db: Option<PgPool>) -> Self {
        Self {
            services,
            config: Arc::new(config),
            db,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                          # public
/// └── /api
///     ├── /auth                            # public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /dashboard
///     │   ├── GET /user
///     │   └── GET /admin                   # admin
///     ├── /tasks
///     │   ├── GET    /                     # admin, ?status=
///     │   ├── POST   /
///     │   ├── GET    /my-tasks             # ?filter=
///     │   ├── GET    /:id
///     │   ├── PUT    /:id                  # admin
///     │   ├── DELETE /:id                  # admin
///     │   ├── PATCH  /:id/status
///     │   ├── POST   /:id/assign
///     │   └── POST   /:id/comments
///     ├── /users                           # admin
///     │   ├── GET    /                     # ?role=
///     │   ├── POST   /
///     │   ├── GET    /:id
///     │   └── DELETE /:id
///     └── /comments
///         ├── GET    /                     # admin
///         └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Response compression (gzip, brotli)
/// 4. Logging (tower-http TraceLayer)
/// 5. JWT authentication (everything under `/api` except `/api/auth`)
/// 6. Admin check against the stored account (admin-only methods)
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let dashboard_routes = Router::new()
        .route("/user", get(routes::dashboard::user_dashboard))
        .route(
            "/admin",
            admin_only(&state, get(routes::dashboard::admin_dashboard)),
        );

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task)
                .merge(admin_only(&state, get(routes::tasks::list_tasks))),
        )
        .route("/my-tasks", get(routes::tasks::my_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task).merge(admin_only(
                &state,
                put(routes::tasks::update_task).delete(routes::tasks::delete_task),
            )),
        )
        .route("/:id/status", patch(routes::tasks::update_status))
        .route("/:id/assign", post(routes::tasks::assign_task))
        .route("/:id/comments", post(routes::tasks::add_comment));

    let user_routes = Router::new()
        .route(
            "/",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/:id",
            get(routes::users::get_user).delete(routes::users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let comment_routes = Router::new()
        .route("/", admin_only(&state, get(routes::comments::list_comments)))
        .route("/:id", delete(routes::comments::delete_comment));

    // Everything here needs a valid access token
    let protected_routes = Router::new()
        .nest("/dashboard", dashboard_routes)
        .nest("/tasks", task_routes)
        .nest("/users", user_routes)
        .nest("/comments", comment_routes)
        .route_layer(middleware::from_fn(create_jwt_middleware(
            state.jwt_secret().to_string(),
        )));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Restricts a method router to admins
///
/// Only applies to the methods registered on `route`, so it can be merged
/// with methods open to every authenticated user on the same path.
fn admin_only(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.api.cors_origins.is_empty() {
        // Development: any origin, no credentials
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
