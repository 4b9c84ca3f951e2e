//! Application-wide error types.
//!
//! Every failure surfaced to a caller is one of these kinds. Domain modules
//! keep their own narrower error enums and convert into `AppError` at the
//! repository boundary.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before any state was touched.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Operation is not legal in the record's current status.
    #[error("Cannot {action} {entity} in status {status}")]
    InvalidState {
        /// Kind of document.
        entity: &'static str,
        /// Current status of the document.
        status: String,
        /// The attempted operation.
        action: String,
    },

    /// Quotation must be approved before it can be converted.
    #[error("Quotation {0} must be approved before conversion")]
    NotApproved(Uuid),

    /// Outbound stock movement exceeds the quantity on hand.
    #[error(
        "Insufficient stock for part {part_id} at branch {branch_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        /// Part being moved.
        part_id: Uuid,
        /// Branch holding the stock.
        branch_id: Uuid,
        /// Quantity on hand.
        available: i32,
        /// Quantity requested.
        requested: i32,
    },

    /// Monetary amount is zero, negative, or otherwise unusable.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Transient failure talking to the backing store.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Access denied.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for an `InvalidState` error.
    pub fn invalid_state(
        entity: &'static str,
        status: impl ToString,
        action: impl ToString,
    ) -> Self {
        Self::InvalidState {
            entity,
            status: status.to_string(),
            action: action.to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidAmount(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::InvalidState { .. } | Self::NotApproved(_) | Self::InsufficientStock { .. } => {
                422
            }
            Self::BackendUnavailable(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::NotApproved(_) => "NOT_APPROVED",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the caller may retry the operation unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
