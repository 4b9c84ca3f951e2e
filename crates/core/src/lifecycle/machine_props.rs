//! Exhaustive checks of the transition tables.
//!
//! Every (state, event) pair is enumerated; the tables must agree with the
//! documented lifecycles and never contain duplicates.

use std::collections::HashSet;

use proptest::prelude::*;

use crate::lifecycle::machine::{
    InvoiceMachine, QuotationMachine, StateMachine, WorkOrderMachine,
};
use crate::lifecycle::types::{
    InvoiceEvent, InvoiceStatus, QuotationEvent, QuotationStatus, WorkOrderEvent,
    WorkOrderStatus,
};

fn expected_quotation(from: QuotationStatus, event: QuotationEvent) -> Option<QuotationStatus> {
    use QuotationEvent as E;
    use QuotationStatus as S;
    match (from, event) {
        (S::Draft, E::Submit) => Some(S::Pending),
        (S::Pending, E::Approve) => Some(S::Approved),
        (S::Pending, E::Reject) => Some(S::Rejected),
        (S::Draft | S::Pending, E::Expire) => Some(S::Expired),
        (S::Approved, E::Convert) => Some(S::Converted),
        _ => None,
    }
}

fn expected_work_order(from: WorkOrderStatus, event: WorkOrderEvent) -> Option<WorkOrderStatus> {
    use WorkOrderEvent as E;
    use WorkOrderStatus as S;
    match (from, event) {
        (S::Pending, E::Start) | (S::OnHold, E::Resume) => Some(S::InProgress),
        (S::InProgress, E::Hold) => Some(S::OnHold),
        (S::InProgress, E::Complete) => Some(S::Completed),
        (S::Completed, E::Deliver) => Some(S::Delivered),
        (S::Pending | S::InProgress | S::OnHold, E::Cancel) => Some(S::Cancelled),
        _ => None,
    }
}

fn expected_invoice(from: InvoiceStatus, event: InvoiceEvent) -> Option<InvoiceStatus> {
    match (from, event) {
        (InvoiceStatus::Issued | InvoiceStatus::Partial, InvoiceEvent::PartialPayment) => {
            Some(InvoiceStatus::Partial)
        }
        (InvoiceStatus::Issued | InvoiceStatus::Partial, InvoiceEvent::SettlingPayment) => {
            Some(InvoiceStatus::Paid)
        }
        _ => None,
    }
}

fn assert_no_duplicates<M: StateMachine>()
where
    M::State: std::hash::Hash,
    M::Event: std::hash::Hash,
{
    let mut seen = HashSet::new();
    for rule in M::RULES {
        assert!(
            seen.insert((rule.from, rule.event)),
            "duplicate rule for {} {}",
            rule.from,
            rule.event
        );
    }
}

#[test]
fn quotation_table_is_exhaustively_correct() {
    for &from in QuotationStatus::ALL {
        for &event in QuotationEvent::ALL {
            let actual = QuotationMachine::next(from, event).ok().map(|t| t.to);
            assert_eq!(actual, expected_quotation(from, event), "{from} + {event}");
        }
    }
    assert_no_duplicates::<QuotationMachine>();
}

#[test]
fn work_order_table_is_exhaustively_correct() {
    for &from in WorkOrderStatus::ALL {
        for &event in WorkOrderEvent::ALL {
            let actual = WorkOrderMachine::next(from, event).ok().map(|t| t.to);
            assert_eq!(actual, expected_work_order(from, event), "{from} + {event}");
        }
    }
    assert_no_duplicates::<WorkOrderMachine>();
}

#[test]
fn invoice_table_is_exhaustively_correct() {
    for &from in InvoiceStatus::ALL {
        for &event in InvoiceEvent::ALL {
            let actual = InvoiceMachine::next(from, event).ok().map(|t| t.to);
            assert_eq!(actual, expected_invoice(from, event), "{from} + {event}");
        }
    }
    assert_no_duplicates::<InvoiceMachine>();
}

#[test]
fn terminal_statuses_have_no_outgoing_rules() {
    for &status in QuotationStatus::ALL {
        assert_eq!(
            status.is_terminal(),
            QuotationMachine::allowed_events(status).is_empty(),
            "{status}"
        );
    }
    for &status in WorkOrderStatus::ALL {
        assert_eq!(
            status.is_terminal(),
            WorkOrderMachine::allowed_events(status).is_empty(),
            "{status}"
        );
    }
}

fn arb_work_order_event() -> impl Strategy<Value = WorkOrderEvent> {
    prop::sample::select(WorkOrderEvent::ALL)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any event sequence only ever moves through table rules, and a
    /// delivered or cancelled work order never changes again.
    #[test]
    fn prop_work_order_walks_follow_table(
        events in prop::collection::vec(arb_work_order_event(), 0..30),
    ) {
        let mut status = WorkOrderStatus::Pending;
        for event in events {
            match WorkOrderMachine::next(status, event) {
                Ok(t) => {
                    prop_assert!(!status.is_terminal());
                    prop_assert!(WorkOrderMachine::is_valid_transition(status, t.to));
                    status = t.to;
                }
                Err(_) => prop_assert!(expected_work_order(status, event).is_none()),
            }
        }
    }
}
