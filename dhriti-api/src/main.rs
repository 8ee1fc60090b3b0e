//! # Dhriti API Server
//!
//! Serves authentication, the admin dashboard summary, project and
//! assignment management, user management and the per-user task dashboard.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/dhriti JWT_SECRET=... cargo run -p dhriti-api
//! ```

use dhriti_api::{
    app::{build_router, AppState},
    config::Config,
};
use dhriti_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.api.json_logs);

    tracing::info!(
        "Dhriti API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    if config.database.run_migrations {
        migrations::run_migrations(&db).await?;
    }

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dhriti_api=debug,dhriti_shared=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
