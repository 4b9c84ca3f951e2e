//! Inventory domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hivedrive_shared::types::{
    BranchId, PartId, QuerySpec, Reference, StockMovementId, UserId,
};

/// Whether a movement adds or removes stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Stock comes in; delta must be positive.
    Inbound,
    /// Stock goes out; delta must be negative.
    Outbound,
}

/// Reason for a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Goods received against a purchase order.
    PurchaseIn,
    /// Parts returned by a customer or technician.
    ReturnIn,
    /// Manual count correction upwards.
    AdjustmentIn,
    /// Opening stock when a part is created.
    Initial,
    /// Parts consumed by a work order.
    WorkOrderOut,
    /// Parts sold over the counter.
    SaleOut,
    /// Manual count correction downwards.
    AdjustmentOut,
}

impl MovementType {
    /// All movement types.
    pub const ALL: [Self; 7] = [
        Self::PurchaseIn,
        Self::ReturnIn,
        Self::AdjustmentIn,
        Self::Initial,
        Self::WorkOrderOut,
        Self::SaleOut,
        Self::AdjustmentOut,
    ];

    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PurchaseIn => "purchase_in",
            Self::ReturnIn => "return_in",
            Self::AdjustmentIn => "adjustment_in",
            Self::Initial => "initial",
            Self::WorkOrderOut => "work_order_out",
            Self::SaleOut => "sale_out",
            Self::AdjustmentOut => "adjustment_out",
        }
    }

    /// Parses a stored name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Returns the direction this movement type moves stock.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::PurchaseIn | Self::ReturnIn | Self::AdjustmentIn | Self::Initial => {
                Direction::Inbound
            }
            Self::WorkOrderOut | Self::SaleOut | Self::AdjustmentOut => Direction::Outbound,
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalogue part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Part ID.
    pub id: PartId,
    /// Stock keeping unit, unique.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// English name.
    pub name_en: Option<String>,
    /// Purchase cost, snapshotted onto movements.
    pub cost_price: Decimal,
    /// Default selling price.
    pub sell_price: Decimal,
    /// Reorder level; zero means "use the configured threshold".
    pub min_quantity: i32,
    /// Usual supplier.
    pub supplier_id: Option<Uuid>,
    /// Inactive parts are hidden from pickers but keep their history.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePartInput {
    /// Stock keeping unit.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// English name.
    #[serde(default)]
    pub name_en: Option<String>,
    /// Purchase cost.
    pub cost_price: Decimal,
    /// Selling price.
    pub sell_price: Decimal,
    /// Reorder level.
    #[serde(default)]
    pub min_quantity: i32,
    /// Usual supplier.
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    /// Opening stock in the caller's branch.
    #[serde(default)]
    pub initial_quantity: i32,
}

/// Changes to a part. Unset fields keep their value; the SKU is fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePartInput {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// English name.
    #[serde(default)]
    pub name_en: Option<String>,
    /// Purchase cost.
    #[serde(default)]
    pub cost_price: Option<Decimal>,
    /// Selling price.
    #[serde(default)]
    pub sell_price: Option<Decimal>,
    /// Reorder level.
    #[serde(default)]
    pub min_quantity: Option<i32>,
    /// Usual supplier.
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    /// Active flag; inactive parts drop out of low-stock reports.
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// On-hand stock of one part in one branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Part.
    pub part_id: PartId,
    /// Branch.
    pub branch_id: BranchId,
    /// Quantity on hand, never negative.
    pub quantity: i32,
    /// Quantity promised to open work orders.
    pub reserved_quantity: i32,
    /// Last change.
    pub updated_at: Option<DateTime<Utc>>,
}

impl InventoryRecord {
    /// The implicit record before the first movement.
    #[must_use]
    pub const fn empty(part_id: PartId, branch_id: BranchId) -> Self {
        Self {
            part_id,
            branch_id,
            quantity: 0,
            reserved_quantity: 0,
            updated_at: None,
        }
    }
}

/// An immutable stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Movement ID.
    pub id: StockMovementId,
    /// Part moved.
    pub part_id: PartId,
    /// Branch whose stock changed.
    pub branch_id: BranchId,
    /// Reason.
    pub movement_type: MovementType,
    /// Magnitude of the change, always positive.
    pub quantity: i32,
    /// Part cost at the time of the movement.
    pub unit_cost: Decimal,
    /// Source record.
    pub reference: Reference,
    /// Free-text note.
    pub notes: Option<String>,
    /// Acting user.
    pub created_by: UserId,
    /// Time of the movement.
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// The signed change this movement applied.
    #[must_use]
    pub const fn signed_quantity(&self) -> i32 {
        match self.movement_type.direction() {
            Direction::Inbound => self.quantity,
            Direction::Outbound => -self.quantity,
        }
    }
}

/// A signed stock adjustment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStockInput {
    /// Part to move.
    pub part_id: PartId,
    /// Branch whose stock changes.
    pub branch_id: BranchId,
    /// Signed change; sign must match the movement type.
    pub delta: i32,
    /// Reason.
    pub movement_type: MovementType,
    /// Source record.
    pub reference: Reference,
    /// Free-text note.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Parts issued from stock to a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePartInput {
    /// Part to issue.
    pub part_id: PartId,
    /// Units to issue, positive.
    pub quantity: i32,
}

/// A part at or below its reorder level in one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockItem {
    /// The part.
    pub part: Part,
    /// Quantity on hand.
    pub quantity: i32,
    /// Level the quantity was compared against.
    pub threshold: i32,
}

/// Equality filters for parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartFilter {
    /// Active flag.
    pub is_active: Option<bool>,
    /// Usual supplier.
    pub supplier_id: Option<Uuid>,
}

/// Sort fields for parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartSort {
    /// By name.
    #[default]
    Name,
    /// By SKU.
    Sku,
    /// By creation time.
    CreatedAt,
}

/// Part list query.
pub type PartQuery = QuerySpec<PartFilter, PartSort>;

/// Equality filters for movements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    /// Part moved.
    pub part_id: Option<PartId>,
    /// Branch.
    pub branch_id: Option<BranchId>,
    /// Movement reason.
    pub movement_type: Option<MovementType>,
    /// Source record ID.
    pub reference_id: Option<Uuid>,
}

/// Sort fields for movements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementSort {
    /// By time.
    #[default]
    CreatedAt,
    /// By magnitude.
    Quantity,
}

/// Movement history query.
pub type MovementQuery = QuerySpec<MovementFilter, MovementSort>;
