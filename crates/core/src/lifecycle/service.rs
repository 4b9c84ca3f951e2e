//! Document lifecycle operations.
//!
//! Every function here is pure: it takes the current document (already
//! locked by the caller), validates the request against the transition
//! tables, and returns or mutates the records to persist. Storage
//! implementations wrap each call in one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use hivedrive_shared::context::{APPROVERS, RequestContext};
use hivedrive_shared::types::money::{MAX_AMOUNT, round_currency};
use hivedrive_shared::types::{
    BranchId, InvoiceId, LineItemId, PaymentId, QuotationId, Reference, ReferenceKind, UserId,
    WorkOrderId,
};
use hivedrive_shared::AppResult;

use crate::lifecycle::documents::{
    AddPaymentInput, CreateQuotationInput, CreateWorkOrderInput, Invoice, Payment, Quotation,
    UpdateDocumentInput, WorkOrder,
};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::machine::{
    InvoiceMachine, QuotationMachine, SideEffect, StateMachine, Transition, WorkOrderMachine,
};
use crate::lifecycle::types::{
    InvoiceEvent, InvoiceStatus, Priority, QuotationEvent, QuotationStatus, WorkOrderEvent,
    WorkOrderStatus,
};
use crate::pricing::{LineItem, LineItemInput, Percentages, PricingService, Totals};
use crate::treasury::{PostTransactionInput, TransactionType, categories};

/// Stateless document lifecycle service.
pub struct DocumentService;

impl DocumentService {
    /// Builds a new draft quotation.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Pricing` if an item or percentage is invalid.
    pub fn new_quotation(
        input: &CreateQuotationInput,
        quotation_number: String,
        branch_id: BranchId,
        created_by: UserId,
        default_tax: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Quotation, LifecycleError> {
        let percentages =
            Percentages::with_default_tax(input.discount_percent, input.tax_percent, default_tax);
        let (items, totals) = Self::price(&input.items, percentages)?;

        Ok(Quotation {
            id: QuotationId::new(),
            quotation_number,
            customer_id: input.customer_id,
            vehicle_id: input.vehicle_id,
            branch_id,
            status: QuotationStatus::Draft,
            items,
            percentages,
            totals,
            notes: input.notes.clone(),
            valid_until: input.valid_until,
            created_by,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Builds a new pending work order without a quotation.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Pricing` if an item or percentage is invalid.
    pub fn new_work_order(
        input: &CreateWorkOrderInput,
        order_number: String,
        branch_id: BranchId,
        created_by: UserId,
        default_tax: Decimal,
        now: DateTime<Utc>,
    ) -> Result<WorkOrder, LifecycleError> {
        let percentages =
            Percentages::with_default_tax(input.discount_percent, input.tax_percent, default_tax);
        let (items, totals) = Self::price(&input.items, percentages)?;

        Ok(WorkOrder {
            id: WorkOrderId::new(),
            order_number,
            quotation_id: None,
            customer_id: input.customer_id,
            vehicle_id: input.vehicle_id,
            branch_id,
            status: WorkOrderStatus::Pending,
            priority: input.priority,
            items,
            percentages,
            totals,
            complaint: input.complaint.clone(),
            mileage_in: input.mileage_in,
            expected_completion: input.expected_completion,
            actual_completion: None,
            delivered_at: None,
            delivered_by: None,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies an edit to a quotation, recomputing its totals.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` outside draft/pending, or a pricing error.
    pub fn update_quotation(
        quotation: &mut Quotation,
        input: &UpdateDocumentInput,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        if !quotation.status.is_editable() {
            return Err(LifecycleError::NotEditable {
                entity: QuotationMachine::ENTITY,
                status: quotation.status.to_string(),
            });
        }

        let (items, percentages, totals) =
            Self::reprice(&quotation.items, quotation.percentages, input)?;
        quotation.items = items;
        quotation.percentages = percentages;
        quotation.totals = totals;
        if let Some(notes) = &input.notes {
            quotation.notes = Some(notes.clone());
        }
        quotation.updated_at = now;
        Ok(())
    }

    /// Applies an edit to a work order, recomputing its totals.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` once the work is completed or cancelled, or a
    /// pricing error.
    pub fn update_work_order(
        work_order: &mut WorkOrder,
        input: &UpdateDocumentInput,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        if !work_order.status.is_editable() {
            return Err(LifecycleError::NotEditable {
                entity: WorkOrderMachine::ENTITY,
                status: work_order.status.to_string(),
            });
        }

        let (items, percentages, totals) =
            Self::reprice(&work_order.items, work_order.percentages, input)?;
        work_order.items = items;
        work_order.percentages = percentages;
        work_order.totals = totals;
        if let Some(notes) = &input.notes {
            work_order.complaint = Some(notes.clone());
        }
        work_order.updated_at = now;
        Ok(())
    }

    /// Checks the caller may fire `event` on a quotation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when approving without an approver role.
    pub fn authorize_quotation_event(ctx: &RequestContext, event: QuotationEvent) -> AppResult<()> {
        match event {
            QuotationEvent::Approve => ctx.require_any(APPROVERS),
            _ => Ok(()),
        }
    }

    /// Fires a quotation event other than `convert`.
    ///
    /// # Errors
    ///
    /// Returns `ConversionRequired` for `convert`, or `InvalidTransition`.
    pub fn transition_quotation(
        quotation: &mut Quotation,
        event: QuotationEvent,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Transition<QuotationStatus>, LifecycleError> {
        if event == QuotationEvent::Convert {
            return Err(LifecycleError::ConversionRequired);
        }

        let transition = QuotationMachine::next(quotation.status, event)?;
        if transition.has(SideEffect::RecordApproval) {
            quotation.approved_by = Some(actor);
            quotation.approved_at = Some(now);
        }
        quotation.status = transition.to;
        quotation.updated_at = now;
        Ok(transition)
    }

    /// Converts an approved quotation into a pending work order.
    ///
    /// Items are copied with new identities; totals, percentages, customer,
    /// vehicle, and branch carry over. The quotation becomes `converted`.
    ///
    /// # Errors
    ///
    /// Returns `NotApproved` unless the quotation is `approved`.
    pub fn convert(
        quotation: &mut Quotation,
        order_number: String,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<WorkOrder, LifecycleError> {
        if quotation.status != QuotationStatus::Approved {
            return Err(LifecycleError::NotApproved(quotation.id));
        }
        let transition = QuotationMachine::next(quotation.status, QuotationEvent::Convert)?;
        debug_assert!(transition.has(SideEffect::CreateWorkOrder));

        let items = quotation
            .items
            .iter()
            .map(|item| LineItem {
                id: LineItemId::new(),
                ..item.clone()
            })
            .collect();

        let work_order = WorkOrder {
            id: WorkOrderId::new(),
            order_number,
            quotation_id: Some(quotation.id),
            customer_id: quotation.customer_id,
            vehicle_id: quotation.vehicle_id,
            branch_id: quotation.branch_id,
            status: WorkOrderStatus::Pending,
            priority: Priority::default(),
            items,
            percentages: quotation.percentages,
            totals: quotation.totals,
            complaint: quotation.notes.clone(),
            mileage_in: None,
            expected_completion: None,
            actual_completion: None,
            delivered_at: None,
            delivered_by: None,
            created_by: actor,
            created_at: now,
            updated_at: now,
        };

        quotation.status = transition.to;
        quotation.updated_at = now;
        Ok(work_order)
    }

    /// Fires a work order event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` when the event is not legal.
    pub fn transition_work_order(
        work_order: &mut WorkOrder,
        event: WorkOrderEvent,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Transition<WorkOrderStatus>, LifecycleError> {
        let transition = WorkOrderMachine::next(work_order.status, event)?;
        if transition.has(SideEffect::RecordCompletion) {
            work_order.actual_completion = Some(now);
        }
        if transition.has(SideEffect::RecordDelivery) {
            work_order.delivered_at = Some(now);
            work_order.delivered_by = Some(actor);
        }
        work_order.status = transition.to;
        work_order.updated_at = now;
        Ok(transition)
    }

    /// Checks parts may be issued to the work order.
    ///
    /// # Errors
    ///
    /// Returns `NotAcceptingParts` unless the order is pending or in progress.
    pub fn check_accepts_parts(work_order: &WorkOrder) -> Result<(), LifecycleError> {
        if work_order.status.accepts_parts() {
            Ok(())
        } else {
            Err(LifecycleError::NotAcceptingParts {
                status: work_order.status.to_string(),
            })
        }
    }

    /// Builds the invoice for a finished work order.
    ///
    /// The caller must also ensure the work order has no invoice yet.
    ///
    /// # Errors
    ///
    /// Returns `NotInvoiceable` unless the work order is completed or
    /// delivered.
    pub fn build_invoice(
        work_order: &WorkOrder,
        invoice_number: String,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Invoice, LifecycleError> {
        if !work_order.status.is_invoiceable() {
            return Err(LifecycleError::NotInvoiceable {
                status: work_order.status.to_string(),
            });
        }

        Ok(Invoice {
            id: InvoiceId::new(),
            invoice_number,
            work_order_id: work_order.id,
            customer_id: work_order.customer_id,
            branch_id: work_order.branch_id,
            status: InvoiceStatus::Issued,
            percentages: work_order.percentages,
            totals: work_order.totals,
            paid_amount: Decimal::ZERO,
            remaining_amount: work_order.totals.total,
            created_by: actor,
            created_at: now,
            updated_at: now,
        })
    }

    /// Records a payment on an invoice.
    ///
    /// Updates `paid_amount`, `remaining_amount`, and `status` and returns
    /// the payment to append. Overpayment is accepted and leaves a negative
    /// remaining amount.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for a non-positive amount and `AlreadyPaid`
    /// for a settled invoice.
    pub fn apply_payment(
        invoice: &mut Invoice,
        input: &AddPaymentInput,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Payment, LifecycleError> {
        let amount = round_currency(input.amount);
        if amount <= Decimal::ZERO || amount > MAX_AMOUNT {
            return Err(LifecycleError::InvalidAmount(input.amount));
        }
        if invoice.status.is_terminal() {
            return Err(LifecycleError::AlreadyPaid(invoice.id));
        }

        let paid_amount = invoice
            .paid_amount
            .checked_add(amount)
            .filter(|paid| *paid <= MAX_AMOUNT)
            .ok_or(LifecycleError::InvalidAmount(input.amount))?;
        let remaining_amount = invoice.totals.total - paid_amount;
        let event = if remaining_amount <= Decimal::ZERO {
            InvoiceEvent::SettlingPayment
        } else {
            InvoiceEvent::PartialPayment
        };
        let transition = InvoiceMachine::next(invoice.status, event)?;

        invoice.paid_amount = paid_amount;
        invoice.remaining_amount = remaining_amount;
        invoice.status = transition.to;
        invoice.updated_at = now;

        Ok(Payment {
            id: PaymentId::new(),
            invoice_id: invoice.id,
            amount,
            method: input.method,
            reference_number: input.reference_number.clone(),
            notes: input.notes.clone(),
            received_by: actor,
            paid_at: now,
        })
    }

    /// The treasury income posted for a payment.
    #[must_use]
    pub fn payment_income(invoice: &Invoice, payment: &Payment) -> PostTransactionInput {
        PostTransactionInput {
            branch_id: invoice.branch_id,
            transaction_type: TransactionType::Income,
            category: categories::INVOICE_PAYMENT.to_string(),
            amount: payment.amount,
            reference: Reference::new(ReferenceKind::Payment, payment.id.into_inner()),
            description: Some(format!("Payment for invoice {}", invoice.invoice_number)),
            transaction_date: Some(payment.paid_at.date_naive()),
        }
    }

    /// Checks a quotation may be deleted.
    ///
    /// # Errors
    ///
    /// Returns `HasWorkOrder` when a work order references it and
    /// `NotDeletable` for terminal quotations.
    pub fn check_delete(quotation: &Quotation, has_work_order: bool) -> Result<(), LifecycleError> {
        if has_work_order {
            return Err(LifecycleError::HasWorkOrder(quotation.id));
        }
        if quotation.status.is_terminal() {
            return Err(LifecycleError::NotDeletable {
                status: quotation.status.to_string(),
            });
        }
        Ok(())
    }

    fn price(
        inputs: &[LineItemInput],
        percentages: Percentages,
    ) -> Result<(Vec<LineItem>, Totals), LifecycleError> {
        PricingService::validate_percentages(percentages)?;
        let items = PricingService::price_items(inputs)?;
        let totals = PricingService::recompute(&items, percentages)?;
        Ok((items, totals))
    }

    fn reprice(
        current_items: &[LineItem],
        current: Percentages,
        input: &UpdateDocumentInput,
    ) -> Result<(Vec<LineItem>, Percentages, Totals), LifecycleError> {
        let percentages = Percentages {
            discount_percent: input.discount_percent.unwrap_or(current.discount_percent),
            tax_percent: input.tax_percent.unwrap_or(current.tax_percent),
        };
        PricingService::validate_percentages(percentages)?;

        let items = match &input.items {
            Some(replacement) => PricingService::price_items(replacement)?,
            None => current_items.to_vec(),
        };
        let totals = PricingService::recompute(&items, percentages)?;
        Ok((items, percentages, totals))
    }
}
