//! Document lifecycle for quotations, work orders, and invoices.
//!
//! # Modules
//!
//! - `types` - Statuses, events, payment methods, priorities
//! - `machine` - Transition tables and side effects
//! - `documents` - Document records, inputs, and list queries
//! - `error` - Lifecycle errors
//! - `service` - Conversion, invoicing, payments, and edits

pub mod documents;
pub mod error;
pub mod machine;
pub mod service;
pub mod types;

#[cfg(test)]
mod machine_props;
#[cfg(test)]
mod service_props;

pub use documents::{
    AddPaymentInput, CreateQuotationInput, CreateWorkOrderInput, DocumentSort, Invoice,
    InvoiceFilter, InvoiceQuery, Payment, PaymentReceipt, Quotation, QuotationFilter,
    QuotationQuery, UpdateDocumentInput, WorkOrder, WorkOrderFilter, WorkOrderQuery,
};
pub use error::LifecycleError;
pub use machine::{
    InvoiceMachine, QuotationMachine, Rule, SideEffect, StateMachine, Transition,
    WorkOrderMachine,
};
pub use service::DocumentService;
pub use types::{
    InvoiceEvent, InvoiceStatus, PaymentMethod, Priority, QuotationEvent, QuotationStatus,
    WorkOrderEvent, WorkOrderStatus,
};
