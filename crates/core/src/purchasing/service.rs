//! Purchase order creation, transitions, and stock receipt.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use hivedrive_shared::context::{APPROVERS, RequestContext};
use hivedrive_shared::types::money::{MAX_AMOUNT, fits_amount, round_currency};
use hivedrive_shared::types::{
    BranchId, LineItemId, PurchaseOrderId, Reference, ReferenceKind, UserId,
};
use hivedrive_shared::AppResult;

use crate::inventory::{AdjustStockInput, MovementType};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::machine::{Rule, SideEffect, StateMachine, Transition};
use crate::purchasing::error::PurchasingError;
use crate::purchasing::types::{
    CreatePurchaseOrderInput, PurchaseEvent, PurchaseOrder, PurchaseOrderItem, PurchaseStatus,
};

/// Purchase order lifecycle: `pending -> approved -> ordered -> received`,
/// cancellable until received.
pub struct PurchaseOrderMachine;

impl StateMachine for PurchaseOrderMachine {
    type State = PurchaseStatus;
    type Event = PurchaseEvent;

    const ENTITY: &'static str = "PurchaseOrder";

    const RULES: &'static [Rule<PurchaseStatus, PurchaseEvent>] = &[
        Rule {
            from: PurchaseStatus::Pending,
            event: PurchaseEvent::Approve,
            to: PurchaseStatus::Approved,
            effects: &[SideEffect::RecordApproval],
        },
        Rule {
            from: PurchaseStatus::Approved,
            event: PurchaseEvent::Order,
            to: PurchaseStatus::Ordered,
            effects: &[],
        },
        Rule {
            from: PurchaseStatus::Ordered,
            event: PurchaseEvent::Receive,
            to: PurchaseStatus::Received,
            effects: &[SideEffect::RecordReceipt, SideEffect::ReceiveStock],
        },
        Rule {
            from: PurchaseStatus::Pending,
            event: PurchaseEvent::Cancel,
            to: PurchaseStatus::Cancelled,
            effects: &[],
        },
        Rule {
            from: PurchaseStatus::Approved,
            event: PurchaseEvent::Cancel,
            to: PurchaseStatus::Cancelled,
            effects: &[],
        },
        Rule {
            from: PurchaseStatus::Ordered,
            event: PurchaseEvent::Cancel,
            to: PurchaseStatus::Cancelled,
            effects: &[],
        },
    ];
}

/// Stateless purchasing rules.
pub struct PurchasingService;

impl PurchasingService {
    /// Builds a pending purchase order.
    ///
    /// # Errors
    ///
    /// Returns the first line rule broken, or `TotalTooLarge` when the order
    /// total would not fit its column.
    pub fn new_order(
        input: &CreatePurchaseOrderInput,
        order_number: String,
        branch_id: BranchId,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<PurchaseOrder, PurchasingError> {
        if input.items.is_empty() {
            return Err(PurchasingError::EmptyOrder);
        }

        let items = input
            .items
            .iter()
            .map(|line| {
                if line.quantity <= 0 {
                    return Err(PurchasingError::NonPositiveQuantity(line.quantity));
                }
                if line.unit_price < Decimal::ZERO {
                    return Err(PurchasingError::NegativePrice(line.unit_price));
                }
                if !fits_amount(line.unit_price) {
                    return Err(PurchasingError::PriceNotStorable(line.unit_price));
                }
                let total = Decimal::from(line.quantity)
                    .checked_mul(line.unit_price)
                    .map(round_currency)
                    .ok_or(PurchasingError::TotalTooLarge)?;
                Ok(PurchaseOrderItem {
                    id: LineItemId::new(),
                    part_id: line.part_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    total,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let total = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total))
            .filter(|total| *total <= MAX_AMOUNT)
            .ok_or(PurchasingError::TotalTooLarge)?;

        Ok(PurchaseOrder {
            id: PurchaseOrderId::new(),
            order_number,
            supplier_id: input.supplier_id,
            branch_id,
            status: PurchaseStatus::Pending,
            items,
            total,
            notes: input.notes.clone(),
            expected_date: input.expected_date,
            received_at: None,
            approved_by: None,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Checks the caller may fire `event`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when approving or receiving without an
    /// approver role.
    pub fn authorize(ctx: &RequestContext, event: PurchaseEvent) -> AppResult<()> {
        match event {
            PurchaseEvent::Approve | PurchaseEvent::Receive => ctx.require_any(APPROVERS),
            PurchaseEvent::Order | PurchaseEvent::Cancel => Ok(()),
        }
    }

    /// Fires an event on a purchase order.
    ///
    /// When the transition carries `ReceiveStock` the caller must apply
    /// [`PurchasingService::receipt_adjustments`] in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` when the event is not legal.
    pub fn transition(
        order: &mut PurchaseOrder,
        event: PurchaseEvent,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Transition<PurchaseStatus>, LifecycleError> {
        let transition = PurchaseOrderMachine::next(order.status, event)?;
        if transition.has(SideEffect::RecordApproval) {
            order.approved_by = Some(actor);
        }
        if transition.has(SideEffect::RecordReceipt) {
            order.received_at = Some(now);
        }
        order.status = transition.to;
        order.updated_at = now;
        Ok(transition)
    }

    /// One inbound `purchase_in` adjustment per line, into the order's branch.
    #[must_use]
    pub fn receipt_adjustments(order: &PurchaseOrder) -> Vec<AdjustStockInput> {
        order
            .items
            .iter()
            .map(|line| AdjustStockInput {
                part_id: line.part_id,
                branch_id: order.branch_id,
                delta: line.quantity,
                movement_type: MovementType::PurchaseIn,
                reference: Reference::new(ReferenceKind::PurchaseOrder, order.id.into_inner()),
                notes: Some(order.order_number.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purchasing::types::PurchaseItemInput;
    use hivedrive_shared::Locale;
    use hivedrive_shared::context::Role;
    use hivedrive_shared::types::PartId;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order() -> PurchaseOrder {
        let input = CreatePurchaseOrderInput {
            supplier_id: Uuid::new_v4(),
            items: vec![
                PurchaseItemInput {
                    part_id: PartId::new(),
                    quantity: 10,
                    unit_price: dec!(45.50),
                },
                PurchaseItemInput {
                    part_id: PartId::new(),
                    quantity: 2,
                    unit_price: dec!(300),
                },
            ],
            notes: None,
            expected_date: None,
        };
        PurchasingService::new_order(
            &input,
            "PO-20260101-0001".to_string(),
            BranchId::new(),
            UserId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_order_totals() {
        let order = order();
        assert_eq!(order.status, PurchaseStatus::Pending);
        assert_eq!(order.items[0].total, dec!(455));
        assert_eq!(order.total, dec!(1055));
    }

    #[test]
    fn test_new_order_validation() {
        let mut input = CreatePurchaseOrderInput {
            supplier_id: Uuid::new_v4(),
            items: vec![],
            notes: None,
            expected_date: None,
        };
        let build = |input: &CreatePurchaseOrderInput| {
            PurchasingService::new_order(
                input,
                "PO-1".to_string(),
                BranchId::new(),
                UserId::new(),
                Utc::now(),
            )
        };
        assert_eq!(build(&input), Err(PurchasingError::EmptyOrder));

        input.items.push(PurchaseItemInput {
            part_id: PartId::new(),
            quantity: 0,
            unit_price: dec!(1),
        });
        assert_eq!(build(&input), Err(PurchasingError::NonPositiveQuantity(0)));

        input.items[0].quantity = 1;
        input.items[0].unit_price = dec!(0.004);
        assert_eq!(build(&input), Err(PurchasingError::PriceNotStorable(dec!(0.004))));

        input.items[0].quantity = i32::MAX;
        input.items[0].unit_price = dec!(999999999999.99);
        assert_eq!(build(&input), Err(PurchasingError::TotalTooLarge));
    }

    #[test]
    fn test_receive_path_and_adjustments() {
        let mut order = order();
        let user = UserId::new();
        PurchasingService::transition(&mut order, PurchaseEvent::Approve, user, Utc::now())
            .unwrap();
        PurchasingService::transition(&mut order, PurchaseEvent::Order, user, Utc::now()).unwrap();
        let transition =
            PurchasingService::transition(&mut order, PurchaseEvent::Receive, user, Utc::now())
                .unwrap();

        assert!(transition.has(SideEffect::ReceiveStock));
        assert_eq!(order.status, PurchaseStatus::Received);
        assert!(order.received_at.is_some());
        assert_eq!(order.approved_by, Some(user));

        let adjustments = PurchasingService::receipt_adjustments(&order);
        assert_eq!(adjustments.len(), 2);
        assert!(adjustments.iter().all(|a| a.movement_type == MovementType::PurchaseIn));
        assert_eq!(adjustments[0].delta, 10);
        assert_eq!(adjustments[0].branch_id, order.branch_id);
    }

    #[test]
    fn test_cannot_receive_pending_order() {
        let mut order = order();
        assert!(matches!(
            PurchasingService::transition(
                &mut order,
                PurchaseEvent::Receive,
                UserId::new(),
                Utc::now()
            ),
            Err(LifecycleError::InvalidTransition { .. })
        ));
        assert_eq!(order.status, PurchaseStatus::Pending);
    }

    #[test]
    fn test_received_order_cannot_be_cancelled() {
        for &status in PurchaseStatus::ALL {
            let allowed = PurchaseOrderMachine::next(status, PurchaseEvent::Cancel).is_ok();
            assert_eq!(allowed, !status.is_terminal(), "{status}");
        }
    }

    #[test]
    fn test_receiving_requires_approver() {
        let warehouse =
            RequestContext::new(UserId::new(), BranchId::new(), Role::Warehouse, Locale::En);
        assert!(PurchasingService::authorize(&warehouse, PurchaseEvent::Order).is_ok());
        assert!(PurchasingService::authorize(&warehouse, PurchaseEvent::Receive).is_err());
    }
}
