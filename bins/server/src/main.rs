//! HiveDrive API server.
//!
//! Main entry point for the workshop backend.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hivedrive_api::{AppState, create_router};
use hivedrive_db::open_repositories;
use hivedrive_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hivedrive=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let repos = open_repositories(&config)
        .await
        .context("failed to open the store")?;
    info!(backend = ?config.database.backend, "store ready");

    let state = AppState::from_config(repos, &config).context("invalid auth configuration")?;
    info!(
        default_role = ?state.role_policy,
        low_stock_threshold = state.low_stock_threshold,
        "application state built"
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
