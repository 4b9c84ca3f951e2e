//! Pricing validation errors.

use rust_decimal::Decimal;
use thiserror::Error;

use hivedrive_shared::AppError;

/// Errors raised while validating line items and percentages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Quantity must be strictly positive.
    #[error("Quantity must be greater than zero, got {0}")]
    NonPositiveQuantity(Decimal),

    /// Unit price must not be negative.
    #[error("Unit price must not be negative, got {0}")]
    NegativeUnitPrice(Decimal),

    /// Line discount outside 0..=100.
    #[error("Line discount must be between 0 and 100 percent, got {0}")]
    LineDiscountOutOfRange(Decimal),

    /// Document discount outside 0..=100.
    #[error("Discount must be between 0 and 100 percent, got {0}")]
    DiscountOutOfRange(Decimal),

    /// Tax outside 0..=100.
    #[error("Tax must be between 0 and 100 percent, got {0}")]
    TaxOutOfRange(Decimal),

    /// Quantity has more than three decimals or exceeds the stored maximum.
    #[error("Quantity must have at most 3 decimals and not exceed 999999999.999, got {0}")]
    QuantityNotStorable(Decimal),

    /// Unit price has more than two decimals or exceeds the stored maximum.
    #[error("Unit price must have at most 2 decimals and not exceed 999999999999.99: {0}")]
    UnitPriceNotStorable(Decimal),

    /// A percentage with more than two decimals.
    #[error("Percentages allow at most 2 decimal places, got {0}")]
    PercentPrecision(Decimal),

    /// A line or document amount past the stored maximum.
    #[error("Amount exceeds 999999999999.99")]
    TotalTooLarge,

    /// Description is blank.
    #[error("Line item description is required")]
    MissingDescription,

    /// A `part` line without a part reference.
    #[error("Part line items must reference a part")]
    MissingPart,
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        Self::Validation(err.to_string())
    }
}
