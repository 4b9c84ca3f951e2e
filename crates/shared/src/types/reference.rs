//! Links from ledger rows back to the record that caused them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of record a stock movement or treasury transaction points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// A work order consuming parts.
    WorkOrder,
    /// A purchase order being received.
    PurchaseOrder,
    /// An invoice.
    Invoice,
    /// A payment against an invoice.
    Payment,
    /// A recorded expense.
    Expense,
    /// A manual correction with no source document.
    Manual,
}

impl ReferenceKind {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WorkOrder => "work_order",
            Self::PurchaseOrder => "purchase_order",
            Self::Invoice => "invoice",
            Self::Payment => "payment",
            Self::Expense => "expense",
            Self::Manual => "manual",
        }
    }

    /// Parses a stored name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "work_order" => Some(Self::WorkOrder),
            "purchase_order" => Some(Self::PurchaseOrder),
            "invoice" => Some(Self::Invoice),
            "payment" => Some(Self::Payment),
            "expense" => Some(Self::Expense),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed pointer to a source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Kind of the source record.
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    /// Identifier of the source record. `None` for manual entries.
    pub id: Option<Uuid>,
}

impl Reference {
    /// Creates a reference to a record.
    #[must_use]
    pub const fn new(kind: ReferenceKind, id: Uuid) -> Self {
        Self { kind, id: Some(id) }
    }

    /// A manual entry with no source record.
    #[must_use]
    pub const fn manual() -> Self {
        Self {
            kind: ReferenceKind::Manual,
            id: None,
        }
    }
}
