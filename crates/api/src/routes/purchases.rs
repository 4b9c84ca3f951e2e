//! Purchase order routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use hivedrive_core::purchasing::{
    CreatePurchaseOrderInput, PurchaseEvent, PurchaseFilter, PurchaseItemInput, PurchaseOrder,
    PurchaseQuery, PurchaseSort, PurchaseStatus,
};
use hivedrive_shared::types::{BranchId, PageResponse, PartId, PurchaseOrderId, SortDirection};

use super::common::{TransitionRequest, page};
use crate::error::{ApiError, Localize};
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;
use crate::{AppState, amount};

/// Creates the purchase order routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/purchase-orders", get(list_purchases).post(create_purchase))
        .route("/purchase-orders/{id}", get(get_purchase))
        .route("/purchase-orders/{id}/transitions", post(transition_purchase))
}

/// Query parameters for listing purchase orders.
#[derive(Debug, Default, Deserialize)]
pub struct ListPurchasesQuery {
    /// Filter by status.
    pub status: Option<PurchaseStatus>,
    /// Filter by supplier.
    pub supplier_id: Option<Uuid>,
    /// Filter by branch.
    pub branch_id: Option<BranchId>,
    /// Matches the order number.
    pub search: Option<String>,
    /// Sort field.
    pub sort: Option<PurchaseSort>,
    /// Sort direction.
    pub direction: Option<SortDirection>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl From<ListPurchasesQuery> for PurchaseQuery {
    fn from(query: ListPurchasesQuery) -> Self {
        Self {
            filter: PurchaseFilter {
                status: query.status,
                supplier_id: query.supplier_id,
                branch_id: query.branch_id,
            },
            search: query.search,
            sort: query.sort.unwrap_or_default(),
            direction: query.direction.unwrap_or_default(),
            page: page(query.page, query.per_page),
        }
    }
}

/// One line of a purchase order.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct PurchaseItemRequest {
    /// Part ordered.
    pub part_id: PartId,
    /// Units ordered.
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Agreed price per unit.
    #[serde(deserialize_with = "amount::deserialize")]
    pub unit_price: Decimal,
}

/// Request body for raising a purchase order.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePurchaseOrderRequest {
    /// Supplier reference.
    pub supplier_id: Uuid,
    /// Lines ordered.
    #[validate(length(min = 1), nested)]
    pub items: Vec<PurchaseItemRequest>,
    /// Free-text notes.
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Expected delivery date.
    pub expected_date: Option<NaiveDate>,
}

impl From<CreatePurchaseOrderRequest> for CreatePurchaseOrderInput {
    fn from(request: CreatePurchaseOrderRequest) -> Self {
        Self {
            supplier_id: request.supplier_id,
            items: request
                .items
                .into_iter()
                .map(|line| PurchaseItemInput {
                    part_id: line.part_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
            notes: request.notes,
            expected_date: request.expected_date,
        }
    }
}

/// GET `/purchase-orders` - List purchase orders.
async fn list_purchases(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<ListPurchasesQuery>,
) -> Result<Json<PageResponse<PurchaseOrder>>, ApiError> {
    let page = state
        .repos
        .purchases
        .list(&ctx, &query.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(page))
}

/// POST `/purchase-orders` - Raise a pending purchase order in the caller's branch.
async fn create_purchase(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreatePurchaseOrderRequest>,
) -> Result<(StatusCode, Json<PurchaseOrder>), ApiError> {
    let purchase = state
        .repos
        .purchases
        .create(&ctx, payload.into())
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

/// GET `/purchase-orders/{id}` - Load a purchase order.
async fn get_purchase(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<PurchaseOrderId>,
) -> Result<Json<PurchaseOrder>, ApiError> {
    let purchase = state
        .repos
        .purchases
        .get(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(purchase))
}

/// POST `/purchase-orders/{id}/transitions` - Approve, order, receive, or cancel.
async fn transition_purchase(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<PurchaseOrderId>,
    ValidatedJson(payload): ValidatedJson<TransitionRequest<PurchaseEvent>>,
) -> Result<Json<PurchaseOrder>, ApiError> {
    let purchase = state
        .repos
        .purchases
        .transition(&ctx, id, payload.event)
        .await
        .localize(ctx.locale)?;
    Ok(Json(purchase))
}
