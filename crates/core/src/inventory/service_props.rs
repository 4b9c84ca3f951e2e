//! Property-based tests for stock adjustments.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use hivedrive_shared::types::{BranchId, PartId, Reference, UserId};

use crate::inventory::error::InventoryError;
use crate::inventory::service::StockService;
use crate::inventory::types::{AdjustStockInput, InventoryRecord, MovementType};

/// Strategy for generating non-zero deltas with a matching movement type.
fn arb_adjustment() -> impl Strategy<Value = (i32, MovementType)> {
    prop_oneof![
        (1i32..50).prop_map(|d| (d, MovementType::PurchaseIn)),
        (1i32..50).prop_map(|d| (d, MovementType::AdjustmentIn)),
        (1i32..50).prop_map(|d| (-d, MovementType::WorkOrderOut)),
        (1i32..50).prop_map(|d| (-d, MovementType::AdjustmentOut)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Final quantity is the initial quantity plus the sum of accepted deltas,
    /// one movement is produced per accepted call, and refused calls change
    /// nothing.
    #[test]
    fn prop_sequence_conserves_stock(
        initial in 0i32..100,
        adjustments in prop::collection::vec(arb_adjustment(), 0..40),
    ) {
        let part_id = PartId::new();
        let branch_id = BranchId::new();
        let mut record = InventoryRecord {
            quantity: initial,
            ..InventoryRecord::empty(part_id, branch_id)
        };
        let mut accepted_sum = 0i32;
        let mut movements = Vec::new();

        for (delta, movement_type) in adjustments {
            let input = AdjustStockInput {
                part_id,
                branch_id,
                delta,
                movement_type,
                reference: Reference::manual(),
                notes: None,
            };
            match StockService::plan(record, &input, Decimal::ONE, UserId::new(), Utc::now()) {
                Ok((updated, movement)) => {
                    accepted_sum += delta;
                    record = updated;
                    movements.push(movement);
                }
                Err(InventoryError::InsufficientStock { available, .. }) => {
                    prop_assert_eq!(available, record.quantity);
                    prop_assert!(record.quantity + delta < 0);
                }
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
            prop_assert!(record.quantity >= 0);
        }

        prop_assert_eq!(record.quantity, initial + accepted_sum);
        let replayed: i32 = movements.iter().map(|m| m.signed_quantity()).sum();
        prop_assert_eq!(replayed, accepted_sum);
        prop_assert!(movements.iter().all(|m| m.quantity > 0));
    }
}
