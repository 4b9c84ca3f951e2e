//! Purchase orders to suppliers and the stock they bring in.
//!
//! # Modules
//!
//! - `types` - Orders, lines, statuses, and events
//! - `error` - Purchasing validation errors
//! - `service` - Order creation, transitions, and stock receipt

pub mod error;
pub mod service;
pub mod types;

pub use error::PurchasingError;
pub use service::{PurchaseOrderMachine, PurchasingService};
pub use types::{
    CreatePurchaseOrderInput, PurchaseEvent, PurchaseFilter, PurchaseItemInput, PurchaseOrder,
    PurchaseOrderItem, PurchaseQuery, PurchaseSort, PurchaseStatus,
};
