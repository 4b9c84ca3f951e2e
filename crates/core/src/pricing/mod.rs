//! Ledger arithmetic for priced documents.
//!
//! Quotations, work orders, and invoices all carry line items and the same
//! four derived amounts. This module owns how those amounts are computed.
//!
//! # Modules
//!
//! - `types` - Line items, percentages, and totals
//! - `error` - Pricing validation errors
//! - `service` - Line and document total computation

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PricingError;
pub use service::PricingService;
pub use types::{DEFAULT_TAX_PERCENT, ItemType, LineItem, LineItemInput, Percentages, Totals};
