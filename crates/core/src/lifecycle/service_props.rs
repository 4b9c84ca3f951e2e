//! Property-based tests for conversion and payments.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use hivedrive_shared::types::{BranchId, UserId};

use crate::lifecycle::documents::{AddPaymentInput, CreateQuotationInput};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::service::DocumentService;
use crate::lifecycle::types::{
    InvoiceStatus, PaymentMethod, QuotationEvent, QuotationStatus, WorkOrderEvent,
};
use crate::pricing::{ItemType, LineItemInput};

/// Strategy for generating line items with cent prices.
fn arb_item() -> impl Strategy<Value = LineItemInput> {
    (1i64..20, 0i64..500_000).prop_map(|(quantity, cents)| LineItemInput {
        item_type: ItemType::Service,
        part_id: None,
        description: "service".to_string(),
        description_en: None,
        quantity: Decimal::from(quantity),
        unit_price: Decimal::new(cents, 2),
        discount_percent: Decimal::ZERO,
    })
}

/// Strategy for generating positive payment amounts.
fn arb_payment() -> impl Strategy<Value = Decimal> {
    (1i64..200_000i64).prop_map(|c| Decimal::new(c, 2))
}

fn quotation_input(items: Vec<LineItemInput>) -> CreateQuotationInput {
    CreateQuotationInput {
        customer_id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        items,
        discount_percent: Some(Decimal::new(5, 0)),
        tax_percent: None,
        notes: None,
        valid_until: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Conversion only succeeds from approved and preserves totals and item count.
    #[test]
    fn prop_conversion_preserves_totals(
        items in prop::collection::vec(arb_item(), 0..8),
        events in prop::collection::vec(
            prop::sample::select(vec![
                QuotationEvent::Submit,
                QuotationEvent::Approve,
                QuotationEvent::Reject,
            ]),
            0..4,
        ),
    ) {
        let user = UserId::new();
        let mut quotation = DocumentService::new_quotation(
            &quotation_input(items),
            "QT-1".to_string(),
            BranchId::new(),
            user,
            Decimal::new(14, 0),
            Utc::now(),
        ).unwrap();
        for event in events {
            let _ = DocumentService::transition_quotation(&mut quotation, event, user, Utc::now());
        }

        let before = quotation.clone();
        match DocumentService::convert(&mut quotation, "WO-1".to_string(), user, Utc::now()) {
            Ok(work_order) => {
                prop_assert_eq!(before.status, QuotationStatus::Approved);
                prop_assert_eq!(quotation.status, QuotationStatus::Converted);
                prop_assert_eq!(work_order.totals, before.totals);
                prop_assert_eq!(work_order.items.len(), before.items.len());
            }
            Err(err) => {
                prop_assert_ne!(before.status, QuotationStatus::Approved);
                prop_assert_eq!(err, LifecycleError::NotApproved(before.id));
                prop_assert_eq!(quotation, before);
            }
        }
    }

    /// paid = sum of accepted payments, remaining = total - paid, and the
    /// status follows the balance.
    #[test]
    fn prop_payments_track_balance(
        total_cents in 1i64..500_000,
        payments in prop::collection::vec(arb_payment(), 1..10),
    ) {
        let user = UserId::new();
        let mut quotation = DocumentService::new_quotation(
            &quotation_input(vec![]),
            "QT-1".to_string(),
            BranchId::new(),
            user,
            Decimal::new(14, 0),
            Utc::now(),
        ).unwrap();
        for event in [QuotationEvent::Submit, QuotationEvent::Approve] {
            DocumentService::transition_quotation(&mut quotation, event, user, Utc::now()).unwrap();
        }
        let mut work_order =
            DocumentService::convert(&mut quotation, "WO-1".to_string(), user, Utc::now()).unwrap();
        work_order.totals.total = Decimal::new(total_cents, 2);
        for event in [WorkOrderEvent::Start, WorkOrderEvent::Complete] {
            DocumentService::transition_work_order(&mut work_order, event, user, Utc::now())
                .unwrap();
        }
        let mut invoice =
            DocumentService::build_invoice(&work_order, "INV-1".to_string(), user, Utc::now())
                .unwrap();

        let mut accepted = Decimal::ZERO;
        for amount in payments {
            let input = AddPaymentInput {
                amount,
                method: PaymentMethod::Cash,
                reference_number: None,
                notes: None,
            };
            match DocumentService::apply_payment(&mut invoice, &input, user, Utc::now()) {
                Ok(payment) => accepted += payment.amount,
                Err(err) => {
                    prop_assert_eq!(err, LifecycleError::AlreadyPaid(invoice.id));
                    prop_assert_eq!(invoice.status, InvoiceStatus::Paid);
                }
            }
            prop_assert_eq!(invoice.paid_amount, accepted);
            prop_assert_eq!(invoice.remaining_amount, invoice.totals.total - accepted);
            let expected = if invoice.remaining_amount <= Decimal::ZERO {
                InvoiceStatus::Paid
            } else {
                InvoiceStatus::Partial
            };
            prop_assert_eq!(invoice.status, expected);
        }
    }
}
