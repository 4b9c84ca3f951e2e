//! Persistence for `HiveDrive`.
//!
//! This crate provides:
//! - `SeaORM` entity definitions and the schema migration
//! - [`PgStore`], the PostgreSQL implementation of the repository ports
//! - [`MemoryStore`], a process-local implementation for development and tests

pub mod entities;
pub mod error;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use error::map_db_err;
pub use memory::MemoryStore;
pub use repositories::PgStore;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use hivedrive_core::repository::Repositories;
use hivedrive_shared::config::{AppConfig, DatabaseConfig, StoreBackend};
use hivedrive_shared::{AppError, AppResult};

/// Opens a connection pool.
///
/// # Errors
///
/// Returns `Validation` when no URL is configured and `BackendUnavailable`
/// when the database cannot be reached.
pub async fn connect(config: &DatabaseConfig) -> AppResult<DatabaseConnection> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| AppError::Validation("database.url is required".to_string()))?;

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    Database::connect(options).await.map_err(map_db_err)
}

/// Builds the configured store.
///
/// # Errors
///
/// Returns an error when the postgres backend is selected and the database
/// cannot be reached.
pub async fn open_repositories(config: &AppConfig) -> AppResult<Repositories> {
    let default_tax = config.pricing.default_tax_percent;
    match config.database.backend {
        StoreBackend::Postgres => {
            let db = connect(&config.database).await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                "connected to postgres"
            );
            Ok(PgStore::new(db, default_tax).repositories())
        }
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on restart");
            Ok(MemoryStore::new(default_tax).repositories())
        }
    }
}
