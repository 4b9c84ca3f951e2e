//! PostgreSQL implementations of the repository ports.
//!
//! Every write runs in one database transaction. Rows read for modification
//! are selected `FOR UPDATE`; rows created lazily (stock records, treasury
//! accounts) are inserted with `ON CONFLICT DO NOTHING` before the locking
//! select so concurrent first writers converge on one row.

mod convert;
mod inventory;
mod invoice;
mod purchase;
mod quotation;
mod registry;
mod sequence;
mod treasury;
mod work_order;

use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Order};

use hivedrive_core::repository::Repositories;
use hivedrive_shared::types::SortDirection;

/// SeaORM-backed store implementing every repository trait.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabaseConnection,
    default_tax_percent: Decimal,
}

impl PgStore {
    /// Creates a store over an open connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection, default_tax_percent: Decimal) -> Self {
        Self {
            db,
            default_tax_percent,
        }
    }

    /// Bundles the store as trait objects.
    #[must_use]
    pub fn repositories(self) -> Repositories {
        Repositories::from_store(Arc::new(self))
    }
}

const fn order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
