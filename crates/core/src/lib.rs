//! Core business logic for HiveDrive.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here; the
//! persistence crates only load, lock, and store.
//!
//! # Modules
//!
//! - `pricing` - Line item and document totals
//! - `inventory` - Per-branch stock levels and the movement log
//! - `lifecycle` - Quotation, work order, and invoice state machines
//! - `treasury` - Branch cash ledger and expenses
//! - `purchasing` - Purchase orders and stock receipt
//! - `registry` - Customers, vehicles, and suppliers
//! - `numbering` - Human-readable document numbers
//! - `repository` - Storage ports implemented by `hivedrive-db`

pub mod inventory;
pub mod lifecycle;
pub mod numbering;
pub mod pricing;
pub mod purchasing;
pub mod registry;
pub mod repository;
pub mod treasury;
