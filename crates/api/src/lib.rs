//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes under `/api/v1`, one group per repository
//! - Bearer-token middleware resolving the caller's `RequestContext`
//! - Localized error responses
//! - Validated request bodies

pub mod amount;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use hivedrive_core::repository::Repositories;
use hivedrive_shared::{AppConfig, AppResult, JwtService, RolePolicy};

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Storage ports.
    pub repos: Repositories,
    /// JWT service for token validation.
    pub jwt: Arc<JwtService>,
    /// Role assumed for tokens without a role claim.
    pub role_policy: RolePolicy,
    /// Default low-stock threshold for parts without their own minimum.
    pub low_stock_threshold: i32,
    /// Symbol appended to formatted amounts.
    pub currency_symbol: Arc<str>,
}

impl AppState {
    /// Builds the state from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when `auth.default_role` names an unknown role.
    pub fn from_config(repos: Repositories, config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            repos,
            jwt: Arc::new(JwtService::new(&config.jwt)),
            role_policy: RolePolicy::from_config(config.auth.default_role.as_deref())?,
            low_stock_threshold: config.inventory.low_stock_threshold,
            currency_symbol: Arc::from(config.pricing.currency_symbol.as_str()),
        })
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
