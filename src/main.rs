//! Barbearia - appointment booking for a barbershop

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use barbearia::{
    api::{self, AppState},
    config::Config,
    db,
    services::CustomerService,
    views::ViewEngine,
};

/// How often expired sessions are purged
const SESSION_CLEANUP_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "barbearia=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Barbearia...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    db::ping(&pool).await?;
    tracing::info!("Database connected: {}", config.database.url);

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let views = ViewEngine::new()?;
    tracing::info!("Templates loaded");

    let state = AppState::new(pool, views, config.session.clone());

    // Purge expired sessions periodically
    spawn_session_cleanup(state.customer_service.clone());

    let app = api::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_session_cleanup(customer_service: Arc<CustomerService>) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(SESSION_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match customer_service.cleanup_expired_sessions().await {
                Ok(0) => {}
                Ok(count) => tracing::info!("Removed {} expired session(s)", count),
                Err(e) => tracing::warn!("Session cleanup failed: {}", e),
            }
        }
    });
}
