//! Inventory stock tracking.
//!
//! Stock is held per (part, branch). Every change is a signed delta recorded
//! as one immutable movement; the on-hand quantity never goes negative.
//!
//! # Modules
//!
//! - `types` - Parts, stock records, movements, and inputs
//! - `error` - Inventory errors
//! - `service` - Adjustment planning and low-stock rules

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::InventoryError;
pub use service::StockService;
pub use types::{
    AdjustStockInput, CreatePartInput, Direction, InventoryRecord, IssuePartInput, LowStockItem,
    MovementFilter, MovementQuery, MovementSort, MovementType, Part, PartFilter, PartQuery,
    PartSort, StockMovement, UpdatePartInput,
};
