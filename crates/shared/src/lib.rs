//! Shared types, errors, and configuration for HiveDrive.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Money rounding and formatting helpers
//! - Pagination and typed list queries
//! - The request-scoped identity (`RequestContext`)
//! - Application-wide error types and their localized messages
//! - Configuration management and JWT handling

pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod i18n;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use context::{RequestContext, Role, RolePolicy};
pub use error::{AppError, AppResult};
pub use i18n::Locale;
pub use jwt::{JwtError, JwtService};
