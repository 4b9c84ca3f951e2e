//! Stock adjustment planning.
//!
//! Storage implementations lock the (part, branch) record, call
//! [`StockService::plan`], and persist both halves of the result together.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use hivedrive_shared::types::money::fits_amount;
use hivedrive_shared::types::{
    BranchId, PartId, Reference, ReferenceKind, StockMovementId, UserId, WorkOrderId,
};

use crate::inventory::error::InventoryError;
use crate::inventory::types::{
    AdjustStockInput, CreatePartInput, Direction, InventoryRecord, IssuePartInput, MovementType,
    Part, StockMovement, UpdatePartInput,
};

/// Stateless stock rules.
pub struct StockService;

impl StockService {
    /// Validates and builds a new part.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::InvalidPart` describing the first bad field.
    pub fn new_part(input: &CreatePartInput, now: DateTime<Utc>) -> Result<Part, InventoryError> {
        if input.sku.trim().is_empty() {
            return Err(invalid_part("sku is required"));
        }
        if input.initial_quantity < 0 {
            return Err(invalid_part("initial_quantity must not be negative"));
        }

        let part = Part {
            id: PartId::new(),
            sku: input.sku.trim().to_string(),
            name: input.name.trim().to_string(),
            name_en: input.name_en.clone(),
            cost_price: input.cost_price,
            sell_price: input.sell_price,
            min_quantity: input.min_quantity,
            supplier_id: input.supplier_id,
            is_active: true,
            created_at: now,
        };
        Self::check_part(&part)?;
        Ok(part)
    }

    /// Applies an update to a part. The SKU and history are untouched.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::InvalidPart` when the updated part breaks a
    /// catalogue rule; `part` is unchanged in that case.
    pub fn update_part(part: &Part, input: &UpdatePartInput) -> Result<Part, InventoryError> {
        let updated = Part {
            name: input
                .name
                .as_deref()
                .map_or_else(|| part.name.clone(), |name| name.trim().to_string()),
            name_en: input.name_en.clone().or_else(|| part.name_en.clone()),
            cost_price: input.cost_price.unwrap_or(part.cost_price),
            sell_price: input.sell_price.unwrap_or(part.sell_price),
            min_quantity: input.min_quantity.unwrap_or(part.min_quantity),
            supplier_id: input.supplier_id.or(part.supplier_id),
            is_active: input.is_active.unwrap_or(part.is_active),
            ..part.clone()
        };
        Self::check_part(&updated)?;
        Ok(updated)
    }

    fn check_part(part: &Part) -> Result<(), InventoryError> {
        if part.name.is_empty() {
            return Err(invalid_part("name is required"));
        }
        if part.cost_price < Decimal::ZERO || part.sell_price < Decimal::ZERO {
            return Err(invalid_part("prices must not be negative"));
        }
        if !fits_amount(part.cost_price) || !fits_amount(part.sell_price) {
            return Err(invalid_part(
                "prices allow 2 decimals and at most 999999999999.99",
            ));
        }
        if part.min_quantity < 0 {
            return Err(invalid_part("min_quantity must not be negative"));
        }
        Ok(())
    }

    /// The opening-stock adjustment for a new part, if any.
    #[must_use]
    pub fn initial_stock(
        part: &Part,
        branch_id: BranchId,
        quantity: i32,
    ) -> Option<AdjustStockInput> {
        (quantity > 0).then(|| AdjustStockInput {
            part_id: part.id,
            branch_id,
            delta: quantity,
            movement_type: MovementType::Initial,
            reference: Reference::manual(),
            notes: None,
        })
    }

    /// The outbound adjustment that issues parts to a work order.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::ZeroDelta` for a non-positive quantity.
    pub fn issue_for_work_order(
        work_order_id: WorkOrderId,
        branch_id: BranchId,
        input: IssuePartInput,
    ) -> Result<AdjustStockInput, InventoryError> {
        if input.quantity <= 0 {
            return Err(InventoryError::ZeroDelta);
        }
        Ok(AdjustStockInput {
            part_id: input.part_id,
            branch_id,
            delta: -input.quantity,
            movement_type: MovementType::WorkOrderOut,
            reference: Reference::new(ReferenceKind::WorkOrder, work_order_id.into_inner()),
            notes: None,
        })
    }

    /// Checks an adjustment before any record is touched.
    ///
    /// # Errors
    ///
    /// Returns `ZeroDelta` or `DirectionMismatch`.
    pub fn validate_adjustment(input: &AdjustStockInput) -> Result<(), InventoryError> {
        if input.delta == 0 {
            return Err(InventoryError::ZeroDelta);
        }
        let agrees = match input.movement_type.direction() {
            Direction::Inbound => input.delta > 0,
            Direction::Outbound => input.delta < 0,
        };
        if !agrees {
            return Err(InventoryError::DirectionMismatch {
                movement_type: input.movement_type,
                delta: input.delta,
            });
        }
        Ok(())
    }

    /// Applies an adjustment to the current record.
    ///
    /// Returns the updated record and the movement to append. The caller must
    /// hold the record's lock and persist both or neither.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStock` when the result would be negative, or any
    /// error from [`StockService::validate_adjustment`].
    pub fn plan(
        record: InventoryRecord,
        input: &AdjustStockInput,
        unit_cost: Decimal,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(InventoryRecord, StockMovement), InventoryError> {
        Self::validate_adjustment(input)?;

        let new_quantity = record
            .quantity
            .checked_add(input.delta)
            .ok_or(InventoryError::Overflow)?;
        if new_quantity < 0 {
            return Err(InventoryError::InsufficientStock {
                part_id: input.part_id,
                branch_id: input.branch_id,
                available: record.quantity,
                requested: input.delta.saturating_abs(),
            });
        }

        let updated = InventoryRecord {
            quantity: new_quantity,
            updated_at: Some(now),
            ..record
        };
        let movement = StockMovement {
            id: StockMovementId::new(),
            part_id: input.part_id,
            branch_id: input.branch_id,
            movement_type: input.movement_type,
            quantity: input.delta.saturating_abs(),
            unit_cost,
            reference: input.reference,
            notes: input.notes.clone(),
            created_by,
            created_at: now,
        };

        Ok((updated, movement))
    }

    /// Reorder level for a part: its own minimum, or `default_threshold`
    /// when it has none.
    #[must_use]
    pub const fn threshold(part: &Part, default_threshold: i32) -> i32 {
        if part.min_quantity > 0 {
            part.min_quantity
        } else {
            default_threshold
        }
    }

    /// True when `quantity` is at or below the part's reorder level.
    #[must_use]
    pub const fn is_low(part: &Part, quantity: i32, default_threshold: i32) -> bool {
        quantity <= Self::threshold(part, default_threshold)
    }
}

fn invalid_part(message: &str) -> InventoryError {
    InventoryError::InvalidPart(message.to_string())
}
