//! Property-based tests for document totals.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::pricing::service::PricingService;
use crate::pricing::types::{ItemType, LineItemInput, Percentages};

/// Strategy for generating positive quantities (0.01 to 1000.00).
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|c| Decimal::new(c, 2))
}

/// Strategy for generating unit prices (0.00 to 10,000.00).
fn arb_price() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|c| Decimal::new(c, 2))
}

/// Strategy for generating percentages (0.00 to 100.00).
fn arb_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|c| Decimal::new(c, 2))
}

fn arb_item() -> impl Strategy<Value = LineItemInput> {
    (arb_quantity(), arb_price(), arb_percent()).prop_map(|(quantity, unit_price, discount)| {
        LineItemInput {
            item_type: ItemType::Service,
            part_id: None,
            description: "item".to_string(),
            description_en: None,
            quantity,
            unit_price,
            discount_percent: discount,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Valid inputs never produce a negative total.
    #[test]
    fn prop_total_is_non_negative(
        items in prop::collection::vec(arb_item(), 0..10),
        discount in arb_percent(),
        tax in arb_percent(),
    ) {
        let priced = PricingService::price_items(&items).unwrap();
        let pct = Percentages::new(Some(discount), Some(tax));
        let totals = PricingService::compute_totals(&priced, pct).unwrap();
        prop_assert!(totals.total >= Decimal::ZERO);
        prop_assert!(totals.rounded().total >= Decimal::ZERO);
    }

    /// With non-negative tax the total never falls below the discounted subtotal.
    #[test]
    fn prop_total_at_least_discounted_subtotal(
        items in prop::collection::vec(arb_item(), 1..10),
        discount in arb_percent(),
        tax in arb_percent(),
    ) {
        let priced = PricingService::price_items(&items).unwrap();
        let pct = Percentages::new(Some(discount), Some(tax));
        let totals = PricingService::compute_totals(&priced, pct).unwrap();
        let floor = totals.subtotal * (Decimal::ONE - discount / Decimal::ONE_HUNDRED);
        prop_assert!(totals.total >= floor);
        prop_assert_eq!(totals.taxable(), floor);
    }

    /// Recomputing from unchanged items and percentages is idempotent.
    #[test]
    fn prop_recompute_is_idempotent(
        items in prop::collection::vec(arb_item(), 0..10),
        discount in arb_percent(),
        tax in arb_percent(),
    ) {
        let priced = PricingService::price_items(&items).unwrap();
        let pct = Percentages::new(Some(discount), Some(tax));
        let first = PricingService::recompute(&priced, pct).unwrap();
        let second = PricingService::recompute(&priced, pct).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Subtotal equals the sum of stored line totals.
    #[test]
    fn prop_subtotal_is_sum_of_lines(items in prop::collection::vec(arb_item(), 0..10)) {
        let priced = PricingService::price_items(&items).unwrap();
        let expected: Decimal = priced.iter().map(|i| i.total).sum();
        let totals = PricingService::compute_totals(&priced, Percentages::default()).unwrap();
        prop_assert_eq!(totals.subtotal, expected);
    }
}
