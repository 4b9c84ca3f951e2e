//! Treasury error types.

use rust_decimal::Decimal;
use thiserror::Error;

use hivedrive_shared::AppError;

/// Errors raised by treasury postings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreasuryError {
    /// Amount must be strictly positive and fit a money column.
    #[error("Amount must be greater than zero and at most 999999999999.99, got {0}")]
    InvalidAmount(Decimal),

    /// The balance after posting would not fit a money column.
    #[error("Treasury balance would exceed 999999999999.99")]
    BalanceOutOfRange,

    /// Category is blank.
    #[error("Category is required")]
    MissingCategory,
}

impl From<TreasuryError> for AppError {
    fn from(err: TreasuryError) -> Self {
        match err {
            TreasuryError::InvalidAmount(amount) => Self::InvalidAmount(amount),
            other @ (TreasuryError::MissingCategory | TreasuryError::BalanceOutOfRange) => {
                Self::Validation(other.to_string())
            }
        }
    }
}
