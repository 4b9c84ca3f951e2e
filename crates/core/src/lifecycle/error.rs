//! Lifecycle error types.

use rust_decimal::Decimal;
use thiserror::Error;

use hivedrive_shared::AppError;
use hivedrive_shared::types::{InvoiceId, QuotationId, WorkOrderId};

use crate::pricing::PricingError;

/// Errors raised by document transitions and their side effects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// No rule for this event in the current status.
    #[error("Cannot {event} {entity} in status {from}")]
    InvalidTransition {
        /// Document type.
        entity: &'static str,
        /// Current status.
        from: String,
        /// Attempted event.
        event: String,
    },

    /// Only approved quotations convert.
    #[error("Quotation {0} must be approved before conversion")]
    NotApproved(QuotationId),

    /// Conversion goes through `convert_to_work_order`, not `transition`.
    #[error("Quotations are converted through the conversion operation")]
    ConversionRequired,

    /// Items or percentages changed on a document that no longer allows it.
    #[error("{entity} in status {status} cannot be edited")]
    NotEditable {
        /// Document type.
        entity: &'static str,
        /// Current status.
        status: String,
    },

    /// Invoice requested before the work was finished.
    #[error("Work order in status {status} cannot be invoiced")]
    NotInvoiceable {
        /// Current work order status.
        status: String,
    },

    /// Work order already has its invoice.
    #[error("Work order {0} already has an invoice")]
    AlreadyInvoiced(WorkOrderId),

    /// Parts issued to a work order that is not open.
    #[error("Cannot issue parts to work order in status {status}")]
    NotAcceptingParts {
        /// Current work order status.
        status: String,
    },

    /// Payment amount must be positive and fit a money column.
    #[error("Amount must be greater than zero and at most 999999999999.99, got {0}")]
    InvalidAmount(Decimal),

    /// Invoice is settled.
    #[error("Invoice {0} is already paid")]
    AlreadyPaid(InvoiceId),

    /// Delete refused.
    #[error("Quotation in status {status} cannot be deleted")]
    NotDeletable {
        /// Current status.
        status: String,
    },

    /// Delete refused because a work order references the quotation.
    #[error("Quotation {0} has a work order")]
    HasWorkOrder(QuotationId),

    /// Line items or percentages rejected.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        let message = err.to_string();
        match err {
            LifecycleError::InvalidTransition {
                entity,
                from,
                event,
            } => Self::invalid_state(entity, from, event),
            LifecycleError::NotApproved(id) => Self::NotApproved(id.into_inner()),
            LifecycleError::NotEditable { entity, status } => {
                Self::invalid_state(entity, status, "edit")
            }
            LifecycleError::NotInvoiceable { status } => {
                Self::invalid_state("WorkOrder", status, "invoice")
            }
            LifecycleError::NotAcceptingParts { status } => {
                Self::invalid_state("WorkOrder", status, "issue parts to")
            }
            LifecycleError::AlreadyPaid(_) => Self::invalid_state("Invoice", "paid", "pay"),
            LifecycleError::NotDeletable { status } => {
                Self::invalid_state("Quotation", status, "delete")
            }
            LifecycleError::HasWorkOrder(_) => {
                Self::invalid_state("Quotation", "converted", "delete")
            }
            LifecycleError::AlreadyInvoiced(_) => Self::Conflict(message),
            LifecycleError::InvalidAmount(amount) => Self::InvalidAmount(amount),
            LifecycleError::ConversionRequired => Self::Validation(message),
            LifecycleError::Pricing(inner) => inner.into(),
        }
    }
}
