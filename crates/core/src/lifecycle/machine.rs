//! Explicit transition tables for every document type.
//!
//! A table lists every legal `(state, event) -> state` triple together with
//! the side effects the storage layer must perform in the same transaction.
//! Anything not listed is an invalid transition.

use std::fmt::{Debug, Display};

use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::types::{
    InvoiceEvent, InvoiceStatus, QuotationEvent, QuotationStatus, WorkOrderEvent,
    WorkOrderStatus,
};

/// Work the storage layer performs alongside a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideEffect {
    /// Stamp approver and approval time.
    RecordApproval,
    /// Create a work order from the quotation's items and totals.
    CreateWorkOrder,
    /// Stamp the actual completion time.
    RecordCompletion,
    /// Stamp who delivered the vehicle and when.
    RecordDelivery,
    /// Append the payment and recompute paid and remaining amounts.
    RecordPayment,
    /// Post a treasury income for the payment amount.
    PostTreasuryIncome,
    /// Stamp the receipt time of a purchase order.
    RecordReceipt,
    /// Apply one inbound stock movement per purchase order line.
    ReceiveStock,
}

/// One row of a transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule<S, E> {
    /// Status the rule applies in.
    pub from: S,
    /// Event that fires it.
    pub event: E,
    /// Status after the event.
    pub to: S,
    /// Side effects to perform atomically with the change.
    pub effects: &'static [SideEffect],
}

/// An accepted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    /// Status before.
    pub from: S,
    /// Status after.
    pub to: S,
    /// Side effects to perform.
    pub effects: &'static [SideEffect],
}

impl<S> Transition<S> {
    /// Returns true if the transition requires `effect`.
    #[must_use]
    pub fn has(&self, effect: SideEffect) -> bool {
        self.effects.contains(&effect)
    }
}

/// A document type with a finite set of statuses and events.
pub trait StateMachine {
    /// Status type.
    type State: Copy + Eq + Debug + Display + 'static;
    /// Event type.
    type Event: Copy + Eq + Debug + Display + 'static;

    /// Name used in errors.
    const ENTITY: &'static str;

    /// Every legal transition.
    const RULES: &'static [Rule<Self::State, Self::Event>];

    /// Looks up the rule for `event` in `from`.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidTransition` when no rule matches.
    fn next(
        from: Self::State,
        event: Self::Event,
    ) -> Result<Transition<Self::State>, LifecycleError> {
        Self::RULES
            .iter()
            .find(|rule| rule.from == from && rule.event == event)
            .map(|rule| Transition {
                from,
                to: rule.to,
                effects: rule.effects,
            })
            .ok_or_else(|| LifecycleError::InvalidTransition {
                entity: Self::ENTITY,
                from: from.to_string(),
                event: event.to_string(),
            })
    }

    /// Returns true if some event leads from `from` to `to`.
    fn is_valid_transition(from: Self::State, to: Self::State) -> bool {
        Self::RULES.iter().any(|rule| rule.from == from && rule.to == to)
    }

    /// Events accepted in `from`.
    fn allowed_events(from: Self::State) -> Vec<Self::Event> {
        Self::RULES
            .iter()
            .filter(|rule| rule.from == from)
            .map(|rule| rule.event)
            .collect()
    }
}

/// Quotation lifecycle: `draft -> pending -> approved | rejected`,
/// `approved -> converted`, undecided quotations may expire.
pub struct QuotationMachine;

impl StateMachine for QuotationMachine {
    type State = QuotationStatus;
    type Event = QuotationEvent;

    const ENTITY: &'static str = "Quotation";

    const RULES: &'static [Rule<QuotationStatus, QuotationEvent>] = &[
        Rule {
            from: QuotationStatus::Draft,
            event: QuotationEvent::Submit,
            to: QuotationStatus::Pending,
            effects: &[],
        },
        Rule {
            from: QuotationStatus::Pending,
            event: QuotationEvent::Approve,
            to: QuotationStatus::Approved,
            effects: &[SideEffect::RecordApproval],
        },
        Rule {
            from: QuotationStatus::Pending,
            event: QuotationEvent::Reject,
            to: QuotationStatus::Rejected,
            effects: &[],
        },
        Rule {
            from: QuotationStatus::Draft,
            event: QuotationEvent::Expire,
            to: QuotationStatus::Expired,
            effects: &[],
        },
        Rule {
            from: QuotationStatus::Pending,
            event: QuotationEvent::Expire,
            to: QuotationStatus::Expired,
            effects: &[],
        },
        Rule {
            from: QuotationStatus::Approved,
            event: QuotationEvent::Convert,
            to: QuotationStatus::Converted,
            effects: &[SideEffect::CreateWorkOrder],
        },
    ];
}

/// Work order lifecycle: `pending -> in_progress -> completed -> delivered`,
/// with `on_hold` pauses and cancellation before completion.
pub struct WorkOrderMachine;

impl StateMachine for WorkOrderMachine {
    type State = WorkOrderStatus;
    type Event = WorkOrderEvent;

    const ENTITY: &'static str = "WorkOrder";

    const RULES: &'static [Rule<WorkOrderStatus, WorkOrderEvent>] = &[
        Rule {
            from: WorkOrderStatus::Pending,
            event: WorkOrderEvent::Start,
            to: WorkOrderStatus::InProgress,
            effects: &[],
        },
        Rule {
            from: WorkOrderStatus::InProgress,
            event: WorkOrderEvent::Hold,
            to: WorkOrderStatus::OnHold,
            effects: &[],
        },
        Rule {
            from: WorkOrderStatus::OnHold,
            event: WorkOrderEvent::Resume,
            to: WorkOrderStatus::InProgress,
            effects: &[],
        },
        Rule {
            from: WorkOrderStatus::InProgress,
            event: WorkOrderEvent::Complete,
            to: WorkOrderStatus::Completed,
            effects: &[SideEffect::RecordCompletion],
        },
        Rule {
            from: WorkOrderStatus::Completed,
            event: WorkOrderEvent::Deliver,
            to: WorkOrderStatus::Delivered,
            effects: &[SideEffect::RecordDelivery],
        },
        Rule {
            from: WorkOrderStatus::Pending,
            event: WorkOrderEvent::Cancel,
            to: WorkOrderStatus::Cancelled,
            effects: &[],
        },
        Rule {
            from: WorkOrderStatus::InProgress,
            event: WorkOrderEvent::Cancel,
            to: WorkOrderStatus::Cancelled,
            effects: &[],
        },
        Rule {
            from: WorkOrderStatus::OnHold,
            event: WorkOrderEvent::Cancel,
            to: WorkOrderStatus::Cancelled,
            effects: &[],
        },
    ];
}

/// Invoice lifecycle: `issued -> partial -> paid`, driven by payments.
pub struct InvoiceMachine;

const PAYMENT_EFFECTS: &[SideEffect] = &[SideEffect::RecordPayment, SideEffect::PostTreasuryIncome];

impl StateMachine for InvoiceMachine {
    type State = InvoiceStatus;
    type Event = InvoiceEvent;

    const ENTITY: &'static str = "Invoice";

    const RULES: &'static [Rule<InvoiceStatus, InvoiceEvent>] = &[
        Rule {
            from: InvoiceStatus::Issued,
            event: InvoiceEvent::PartialPayment,
            to: InvoiceStatus::Partial,
            effects: PAYMENT_EFFECTS,
        },
        Rule {
            from: InvoiceStatus::Issued,
            event: InvoiceEvent::SettlingPayment,
            to: InvoiceStatus::Paid,
            effects: PAYMENT_EFFECTS,
        },
        Rule {
            from: InvoiceStatus::Partial,
            event: InvoiceEvent::PartialPayment,
            to: InvoiceStatus::Partial,
            effects: PAYMENT_EFFECTS,
        },
        Rule {
            from: InvoiceStatus::Partial,
            event: InvoiceEvent::SettlingPayment,
            to: InvoiceStatus::Paid,
            effects: PAYMENT_EFFECTS,
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotation_happy_path() {
        let submitted =
            QuotationMachine::next(QuotationStatus::Draft, QuotationEvent::Submit).unwrap();
        assert_eq!(submitted.to, QuotationStatus::Pending);

        let approved =
            QuotationMachine::next(QuotationStatus::Pending, QuotationEvent::Approve).unwrap();
        assert_eq!(approved.to, QuotationStatus::Approved);
        assert!(approved.has(SideEffect::RecordApproval));

        let converted =
            QuotationMachine::next(QuotationStatus::Approved, QuotationEvent::Convert).unwrap();
        assert_eq!(converted.to, QuotationStatus::Converted);
        assert!(converted.has(SideEffect::CreateWorkOrder));
    }

    #[test]
    fn test_converted_is_one_shot() {
        let err = QuotationMachine::next(QuotationStatus::Converted, QuotationEvent::Convert)
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                entity: "Quotation",
                ..
            }
        ));
    }

    #[test]
    fn test_work_order_happy_path() {
        let mut status = WorkOrderStatus::Pending;
        for event in [
            WorkOrderEvent::Start,
            WorkOrderEvent::Hold,
            WorkOrderEvent::Resume,
            WorkOrderEvent::Complete,
            WorkOrderEvent::Deliver,
        ] {
            status = WorkOrderMachine::next(status, event).unwrap().to;
        }
        assert_eq!(status, WorkOrderStatus::Delivered);
    }

    #[test]
    fn test_completed_work_order_cannot_be_cancelled() {
        let cancel = WorkOrderMachine::next(WorkOrderStatus::Completed, WorkOrderEvent::Cancel);
        assert!(cancel.is_err());
    }

    #[test]
    fn test_invoice_payments_post_income() {
        let t = InvoiceMachine::next(InvoiceStatus::Issued, InvoiceEvent::PartialPayment).unwrap();
        assert!(t.has(SideEffect::RecordPayment));
        assert!(t.has(SideEffect::PostTreasuryIncome));
        assert!(InvoiceMachine::next(InvoiceStatus::Paid, InvoiceEvent::PartialPayment).is_err());
    }

    #[test]
    fn test_is_valid_transition() {
        assert!(WorkOrderMachine::is_valid_transition(
            WorkOrderStatus::Pending,
            WorkOrderStatus::Cancelled
        ));
        assert!(!WorkOrderMachine::is_valid_transition(
            WorkOrderStatus::Delivered,
            WorkOrderStatus::Pending
        ));
    }

    #[test]
    fn test_allowed_events() {
        assert_eq!(
            QuotationMachine::allowed_events(QuotationStatus::Pending),
            vec![
                QuotationEvent::Approve,
                QuotationEvent::Reject,
                QuotationEvent::Expire
            ]
        );
        assert!(QuotationMachine::allowed_events(QuotationStatus::Converted).is_empty());
    }
}
