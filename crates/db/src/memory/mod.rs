//! Process-local implementations of the repository ports.
//!
//! Used by the `memory` backend and by tests. Each operation first takes the
//! keyed locks of every aggregate it modifies, computes its writes against a
//! read view of the tables, then applies them in one write section. Readers
//! never see half of an operation, and a failed operation writes nothing.
//!
//! Document numbers come from an in-process counter and are not returned on
//! failure, so a failed create can leave a gap in the sequence.

mod documents;
mod inventory;
mod locks;
mod purchase;
mod registry;
mod tables;
mod treasury;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use hivedrive_core::numbering::{DocumentPrefix, format_number};
use hivedrive_core::repository::Repositories;
use hivedrive_shared::types::{BranchId, PageRequest, PageResponse, PartId};

use locks::KeyedLocks;
use tables::Tables;

/// In-memory store implementing every repository trait.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    locks: KeyedLocks,
    sequences: DashMap<(DocumentPrefix, NaiveDate), u32>,
    default_tax_percent: Decimal,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(default_tax_percent: Decimal) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            locks: KeyedLocks::default(),
            sequences: DashMap::new(),
            default_tax_percent,
        }
    }

    /// Bundles the store as trait objects.
    #[must_use]
    pub fn repositories(self) -> Repositories {
        Repositories::from_store(Arc::new(self))
    }

    fn next_number(&self, prefix: DocumentPrefix, now: DateTime<Utc>) -> String {
        let date = now.date_naive();
        let sequence = {
            let mut counter = self.sequences.entry((prefix, date)).or_insert(0);
            *counter += 1;
            *counter
        };
        format_number(prefix, date, sequence)
    }
}

fn stock_key(part_id: PartId, branch_id: BranchId) -> String {
    format!("stock:{part_id}:{branch_id}")
}

fn treasury_key(branch_id: BranchId) -> String {
    format!("treasury:{branch_id}")
}

fn document_key(kind: &str, id: impl std::fmt::Display) -> String {
    format!("{kind}:{id}")
}

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> PageResponse<T> {
    let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
    PageResponse::new(page.slice(items), page, total)
}

fn matches_search(term: Option<&str>, fields: &[Option<&str>]) -> bool {
    term.is_none_or(|term| {
        fields
            .iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(term))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_count_per_prefix_and_day() {
        let store = MemoryStore::new(Decimal::ZERO);
        let now = Utc::now();
        let day = now.format("%Y%m%d");

        assert_eq!(store.next_number(DocumentPrefix::Quotation, now), format!("QT-{day}-0001"));
        assert_eq!(store.next_number(DocumentPrefix::Quotation, now), format!("QT-{day}-0002"));
        assert_eq!(store.next_number(DocumentPrefix::Invoice, now), format!("INV-{day}-0001"));
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        assert!(matches_search(None, &[]));
        assert!(matches_search(Some("pad"), &[Some("Brake PAD"), None]));
        assert!(matches_search(Some("bp-1"), &[None, Some("BP-100")]));
        assert!(!matches_search(Some("oil"), &[Some("Brake pad"), None]));
    }
}
