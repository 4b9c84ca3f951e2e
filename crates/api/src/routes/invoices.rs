//! Invoice and payment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use hivedrive_core::lifecycle::{
    AddPaymentInput, DocumentSort, Invoice, InvoiceFilter, InvoiceQuery, InvoiceStatus, Payment,
    PaymentMethod, PaymentReceipt,
};
use hivedrive_shared::types::{BranchId, InvoiceId, PageResponse, SortDirection, WorkOrderId};

use super::common::page;
use crate::error::{ApiError, Localize};
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;
use crate::{AppState, amount};

/// Creates the invoice routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices/{id}", get(get_invoice))
        .route(
            "/invoices/{id}/payments",
            get(list_payments).post(add_payment),
        )
}

/// Query parameters for listing invoices.
#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by work order.
    pub work_order_id: Option<WorkOrderId>,
    /// Filter by branch.
    pub branch_id: Option<BranchId>,
    /// Matches the invoice number.
    pub search: Option<String>,
    /// Sort field.
    pub sort: Option<DocumentSort>,
    /// Sort direction.
    pub direction: Option<SortDirection>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl From<ListInvoicesQuery> for InvoiceQuery {
    fn from(query: ListInvoicesQuery) -> Self {
        Self {
            filter: InvoiceFilter {
                status: query.status,
                customer_id: query.customer_id,
                work_order_id: query.work_order_id,
                branch_id: query.branch_id,
            },
            search: query.search,
            sort: query.sort.unwrap_or_default(),
            direction: query.direction.unwrap_or_default(),
            page: page(query.page, query.per_page),
        }
    }
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize, Validate)]
pub struct AddPaymentRequest {
    /// Amount received. Must be positive.
    #[serde(deserialize_with = "amount::deserialize")]
    pub amount: Decimal,
    /// How it was paid.
    pub method: PaymentMethod,
    /// Card slip, transfer, or cheque number.
    #[validate(length(max = 100))]
    pub reference_number: Option<String>,
    /// Free-text notes.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// GET `/invoices` - List invoices.
async fn list_invoices(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<PageResponse<Invoice>>, ApiError> {
    let page = state
        .repos
        .invoices
        .list(&ctx, &query.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(page))
}

/// GET `/invoices/{id}` - Load an invoice.
async fn get_invoice(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<InvoiceId>,
) -> Result<Json<Invoice>, ApiError> {
    let invoice = state
        .repos
        .invoices
        .get(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(invoice))
}

/// GET `/invoices/{id}/payments` - Payments against an invoice, oldest first.
async fn list_payments(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<InvoiceId>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = state
        .repos
        .invoices
        .payments(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(payments))
}

/// POST `/invoices/{id}/payments` - Record a payment and post it to the treasury.
async fn add_payment(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<InvoiceId>,
    ValidatedJson(payload): ValidatedJson<AddPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentReceipt>), ApiError> {
    let input = AddPaymentInput {
        amount: payload.amount,
        method: payload.method,
        reference_number: payload.reference_number,
        notes: payload.notes,
    };
    let receipt = state
        .repos
        .invoices
        .add_payment(&ctx, id, input)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
