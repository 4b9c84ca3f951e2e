//! Quotations, work orders, invoices, and payments.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hivedrive_shared::types::{
    BranchId, InvoiceId, PaymentId, QuerySpec, QuotationId, UserId, WorkOrderId,
};

use crate::lifecycle::types::{
    InvoiceStatus, PaymentMethod, Priority, QuotationStatus, WorkOrderStatus,
};
use crate::pricing::{LineItem, LineItemInput, Percentages, Totals};
use crate::treasury::TreasuryTransaction;

/// A priced offer to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotation {
    /// Quotation ID.
    pub id: QuotationId,
    /// Human-readable number, `QT-YYYYMMDD-NNNN`.
    pub quotation_number: String,
    /// Customer.
    pub customer_id: Uuid,
    /// Vehicle.
    pub vehicle_id: Uuid,
    /// Issuing branch.
    pub branch_id: BranchId,
    /// Status.
    pub status: QuotationStatus,
    /// Line items in display order.
    pub items: Vec<LineItem>,
    /// Document discount and tax.
    pub percentages: Percentages,
    /// Derived amounts at currency precision.
    pub totals: Totals,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Offer validity.
    pub valid_until: Option<NaiveDate>,
    /// Author.
    pub created_by: UserId,
    /// Approver.
    pub approved_by: Option<UserId>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

/// A job being executed on a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    /// Work order ID.
    pub id: WorkOrderId,
    /// Human-readable number, `WO-YYYYMMDD-NNNN`.
    pub order_number: String,
    /// Source quotation, when converted.
    pub quotation_id: Option<QuotationId>,
    /// Customer.
    pub customer_id: Uuid,
    /// Vehicle.
    pub vehicle_id: Uuid,
    /// Executing branch.
    pub branch_id: BranchId,
    /// Status.
    pub status: WorkOrderStatus,
    /// Urgency.
    pub priority: Priority,
    /// Line items in display order.
    pub items: Vec<LineItem>,
    /// Document discount and tax.
    pub percentages: Percentages,
    /// Derived amounts at currency precision.
    pub totals: Totals,
    /// Customer complaint.
    pub complaint: Option<String>,
    /// Odometer at check-in.
    pub mileage_in: Option<i32>,
    /// Promised completion date.
    pub expected_completion: Option<NaiveDate>,
    /// When work finished.
    pub actual_completion: Option<DateTime<Utc>>,
    /// When the vehicle was handed back.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Who handed it back.
    pub delivered_by: Option<UserId>,
    /// Author.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

/// A bill raised from a finished work order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Human-readable number, `INV-YYYYMMDD-NNNN`.
    pub invoice_number: String,
    /// Source work order.
    pub work_order_id: WorkOrderId,
    /// Customer.
    pub customer_id: Uuid,
    /// Billing branch.
    pub branch_id: BranchId,
    /// Status.
    pub status: InvoiceStatus,
    /// Percentages copied from the work order.
    pub percentages: Percentages,
    /// Amounts copied from the work order.
    pub totals: Totals,
    /// Sum of payments.
    pub paid_amount: Decimal,
    /// `total - paid_amount`.
    pub remaining_amount: Decimal,
    /// Author.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

/// Money received against an invoice. Never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID.
    pub id: PaymentId,
    /// Invoice paid.
    pub invoice_id: InvoiceId,
    /// Amount received.
    pub amount: Decimal,
    /// How it was paid.
    pub method: PaymentMethod,
    /// Card slip, transfer, or cheque number.
    pub reference_number: Option<String>,
    /// Free-text note.
    pub notes: Option<String>,
    /// Cashier.
    pub received_by: UserId,
    /// Time received.
    pub paid_at: DateTime<Utc>,
}

/// Result of recording a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Invoice after the payment.
    pub invoice: Invoice,
    /// The payment.
    pub payment: Payment,
    /// The treasury income posted for it.
    pub transaction: TreasuryTransaction,
}

/// Input for creating a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateQuotationInput {
    /// Customer.
    pub customer_id: Uuid,
    /// Vehicle.
    pub vehicle_id: Uuid,
    /// Line items.
    #[serde(default)]
    pub items: Vec<LineItemInput>,
    /// Document discount; zero when unset.
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
    /// Tax; the configured default when unset.
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Offer validity.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
}

/// Input for creating a work order directly, without a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWorkOrderInput {
    /// Customer.
    pub customer_id: Uuid,
    /// Vehicle.
    pub vehicle_id: Uuid,
    /// Line items.
    #[serde(default)]
    pub items: Vec<LineItemInput>,
    /// Document discount.
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
    /// Tax.
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
    /// Urgency.
    #[serde(default)]
    pub priority: Priority,
    /// Customer complaint.
    #[serde(default)]
    pub complaint: Option<String>,
    /// Odometer at check-in.
    #[serde(default)]
    pub mileage_in: Option<i32>,
    /// Promised completion date.
    #[serde(default)]
    pub expected_completion: Option<NaiveDate>,
}

/// Changes to a document's items, percentages, or notes. Unset fields keep
/// their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDocumentInput {
    /// Replacement item set.
    #[serde(default)]
    pub items: Option<Vec<LineItemInput>>,
    /// New document discount.
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
    /// New tax.
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPaymentInput {
    /// Amount received.
    pub amount: Decimal,
    /// How it was paid.
    pub method: PaymentMethod,
    /// Card slip, transfer, or cheque number.
    #[serde(default)]
    pub reference_number: Option<String>,
    /// Free-text note.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Equality filters for quotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationFilter {
    /// Status.
    pub status: Option<QuotationStatus>,
    /// Customer.
    pub customer_id: Option<Uuid>,
    /// Vehicle.
    pub vehicle_id: Option<Uuid>,
    /// Branch.
    pub branch_id: Option<BranchId>,
}

/// Equality filters for work orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderFilter {
    /// Status.
    pub status: Option<WorkOrderStatus>,
    /// Urgency.
    pub priority: Option<Priority>,
    /// Customer.
    pub customer_id: Option<Uuid>,
    /// Vehicle.
    pub vehicle_id: Option<Uuid>,
    /// Branch.
    pub branch_id: Option<BranchId>,
}

/// Equality filters for invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFilter {
    /// Status.
    pub status: Option<InvoiceStatus>,
    /// Customer.
    pub customer_id: Option<Uuid>,
    /// Source work order.
    pub work_order_id: Option<WorkOrderId>,
    /// Branch.
    pub branch_id: Option<BranchId>,
}

/// Sort fields shared by the document lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSort {
    /// By creation time.
    #[default]
    CreatedAt,
    /// By document number.
    Number,
    /// By total.
    Total,
}

/// Quotation list query.
pub type QuotationQuery = QuerySpec<QuotationFilter, DocumentSort>;
/// Work order list query.
pub type WorkOrderQuery = QuerySpec<WorkOrderFilter, DocumentSort>;
/// Invoice list query.
pub type InvoiceQuery = QuerySpec<InvoiceFilter, DocumentSort>;
