//! `SeaORM` entities, one module per table.
//!
//! Status and type columns are stored as their lowercase names; conversion
//! to domain enums happens in `repositories::convert`.

pub mod customers;
pub mod document_sequences;
pub mod expenses;
pub mod inventory;
pub mod invoices;
pub mod parts;
pub mod payments;
pub mod purchase_order_items;
pub mod purchase_orders;
pub mod quotation_items;
pub mod quotations;
pub mod stock_movements;
pub mod suppliers;
pub mod treasury;
pub mod treasury_transactions;
pub mod vehicles;
pub mod work_order_items;
pub mod work_orders;
