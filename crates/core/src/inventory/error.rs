//! Inventory error types.

use thiserror::Error;

use hivedrive_shared::AppError;
use hivedrive_shared::types::{BranchId, PartId};

use crate::inventory::types::MovementType;

/// Errors raised by stock operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The part does not exist.
    #[error("Part not found: {0}")]
    PartNotFound(PartId),

    /// A zero delta moves nothing.
    #[error("Stock adjustment must change the quantity")]
    ZeroDelta,

    /// Delta sign disagrees with the movement type.
    #[error("Movement type {movement_type} cannot apply a delta of {delta}")]
    DirectionMismatch {
        /// Movement type requested.
        movement_type: MovementType,
        /// Delta requested.
        delta: i32,
    },

    /// Outbound movement larger than the quantity on hand.
    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock {
        /// Part.
        part_id: PartId,
        /// Branch.
        branch_id: BranchId,
        /// Quantity on hand.
        available: i32,
        /// Quantity requested.
        requested: i32,
    },

    /// Quantity would not fit the stored integer.
    #[error("Stock quantity overflow")]
    Overflow,

    /// Part input rejected.
    #[error("Invalid part: {0}")]
    InvalidPart(String),
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::PartNotFound(id) => Self::not_found("Part", id),
            InventoryError::InsufficientStock {
                part_id,
                branch_id,
                available,
                requested,
            } => Self::InsufficientStock {
                part_id: part_id.into_inner(),
                branch_id: branch_id.into_inner(),
                available,
                requested,
            },
            other => Self::Validation(other.to_string()),
        }
    }
}
