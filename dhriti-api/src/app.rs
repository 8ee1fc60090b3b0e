//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use dhriti_api::{app::{build_router, AppState}, config::Config};
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let app = build_router(AppState::new(pool, config));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::{
    config::Config,
    middleware::auth::{admin_only, jwt_auth_layer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Lifetime of newly issued access tokens
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.config.jwt.expires_minutes)
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET  /                         # liveness message (public)
/// ├── GET  /health                   # health + database probe (public)
/// ├── /auth/                         # public
/// │   ├── POST /register
/// │   └── POST /login
/// ├── /protected                     # any valid token
/// │   ├── GET / (with or without the trailing slash)
/// │   └── GET /admin                 # admin
/// ├── GET /dashboard/summary         # admin
/// ├── /tasks/
/// │   ├── GET /dashboard             # any valid token
/// │   └── /admin/                    # admin
/// │       ├── POST|GET /projects, GET|PUT|DELETE /projects/:id
/// │       ├── GET /users
/// │       ├── POST|GET /assignments, DELETE /assignments/:id
/// │       └── POST /reviews
/// └── /users                         # admin
///     ├── GET|POST / (with or without the trailing slash)
///     └── GET|PUT|DELETE /:id
/// ```
///
/// Layers, outermost first: CORS, request tracing, then authentication per
/// route group.
pub fn build_router(state: AppState) -> Router {
    let authenticated = || from_fn_with_state(state.clone(), jwt_auth_layer);

    let public_routes = Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // collection roots answer with and without the trailing slash
    let protected_routes = Router::new()
        .route("/protected", get(routes::protected::whoami))
        .route("/protected/", get(routes::protected::whoami))
        .route("/protected/admin", get(routes::protected::admin_check))
        .layer(authenticated());

    let dashboard_routes = Router::new()
        .route("/summary", get(routes::dashboard::summary))
        .layer(from_fn(admin_only))
        .layer(authenticated());

    let task_admin_routes = Router::new()
        .route(
            "/projects",
            post(routes::tasks::create_project).get(routes::tasks::list_projects),
        )
        .route(
            "/projects/:id",
            get(routes::tasks::get_project)
                .put(routes::tasks::update_project)
                .delete(routes::tasks::delete_project),
        )
        .route("/users", get(routes::tasks::list_users))
        .route(
            "/assignments",
            post(routes::tasks::upsert_assignment).get(routes::tasks::list_assignments),
        )
        .route("/assignments/:id", delete(routes::tasks::delete_assignment))
        .route("/reviews", post(routes::tasks::create_review))
        .layer(from_fn(admin_only));

    let task_routes = Router::new()
        .route("/dashboard", get(routes::tasks::dashboard))
        .nest("/admin", task_admin_routes)
        .layer(authenticated());

    let user_collection = get(routes::users::list_users).post(routes::users::create_user);
    let user_routes = Router::new()
        .route("/users", user_collection.clone())
        .route("/users/", user_collection)
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .layer(from_fn(admin_only))
        .layer(authenticated());

    Router::new()
        .merge(public_routes)
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .nest("/dashboard", dashboard_routes)
        .nest("/tasks", task_routes)
        .merge(user_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
