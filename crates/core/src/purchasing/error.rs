//! Purchasing error types.

use rust_decimal::Decimal;
use thiserror::Error;

use hivedrive_shared::AppError;

/// Errors raised when building a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchasingError {
    /// No lines.
    #[error("Purchase order must have at least one item")]
    EmptyOrder,

    /// Line quantity must be positive.
    #[error("Quantity must be greater than zero, got {0}")]
    NonPositiveQuantity(i32),

    /// Line price must not be negative.
    #[error("Unit price must not be negative, got {0}")]
    NegativePrice(Decimal),

    /// Line price has more than two decimals or exceeds the stored maximum.
    #[error("Unit price must have at most 2 decimals and not exceed 999999999999.99: {0}")]
    PriceNotStorable(Decimal),

    /// A line or order total past the stored maximum.
    #[error("Purchase order total exceeds 999999999999.99")]
    TotalTooLarge,
}

impl From<PurchasingError> for AppError {
    fn from(err: PurchasingError) -> Self {
        Self::Validation(err.to_string())
    }
}
