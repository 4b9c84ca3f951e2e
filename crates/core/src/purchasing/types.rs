//! Purchasing domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hivedrive_shared::types::{BranchId, LineItemId, PartId, PurchaseOrderId, QuerySpec, UserId};

use crate::lifecycle::types::named_enum;

/// Purchase order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Raised, awaiting approval.
    Pending,
    /// Approved for ordering.
    Approved,
    /// Sent to the supplier.
    Ordered,
    /// Goods in stock.
    Received,
    /// Abandoned.
    Cancelled,
}

named_enum!(PurchaseStatus {
    Pending => "pending",
    Approved => "approved",
    Ordered => "ordered",
    Received => "received",
    Cancelled => "cancelled",
});

impl PurchaseStatus {
    /// Returns true if no event leaves this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Received | Self::Cancelled)
    }
}

/// Purchase order events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseEvent {
    /// Approve the order.
    Approve,
    /// Send it to the supplier.
    Order,
    /// Book the goods into stock.
    Receive,
    /// Abandon the order.
    Cancel,
}

named_enum!(PurchaseEvent {
    Approve => "approve",
    Order => "order",
    Receive => "receive",
    Cancel => "cancel",
});

/// One line of a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    /// Line ID.
    pub id: LineItemId,
    /// Part ordered.
    pub part_id: PartId,
    /// Units ordered.
    pub quantity: i32,
    /// Agreed unit price.
    pub unit_price: Decimal,
    /// `quantity * unit_price` at currency precision.
    pub total: Decimal,
}

/// An order placed with a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Order ID.
    pub id: PurchaseOrderId,
    /// Human-readable number, `PO-YYYYMMDD-NNNN`.
    pub order_number: String,
    /// Supplier.
    pub supplier_id: Uuid,
    /// Receiving branch.
    pub branch_id: BranchId,
    /// Status.
    pub status: PurchaseStatus,
    /// Lines.
    pub items: Vec<PurchaseOrderItem>,
    /// Sum of line totals.
    pub total: Decimal,
    /// Notes.
    pub notes: Option<String>,
    /// Expected delivery.
    pub expected_date: Option<NaiveDate>,
    /// Time the goods were booked in.
    pub received_at: Option<DateTime<Utc>>,
    /// Approver.
    pub approved_by: Option<UserId>,
    /// Author.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

/// A requested purchase line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseItemInput {
    /// Part.
    pub part_id: PartId,
    /// Units, positive.
    pub quantity: i32,
    /// Unit price, not negative.
    pub unit_price: Decimal,
}

/// Input for creating a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePurchaseOrderInput {
    /// Supplier.
    pub supplier_id: Uuid,
    /// Lines.
    pub items: Vec<PurchaseItemInput>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Expected delivery.
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
}

/// Equality filters for purchase orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseFilter {
    /// Status.
    pub status: Option<PurchaseStatus>,
    /// Supplier.
    pub supplier_id: Option<Uuid>,
    /// Branch.
    pub branch_id: Option<BranchId>,
}

/// Sort fields for purchase orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseSort {
    /// By creation time.
    #[default]
    CreatedAt,
    /// By total.
    Total,
}

/// Purchase order list query.
pub type PurchaseQuery = QuerySpec<PurchaseFilter, PurchaseSort>;
