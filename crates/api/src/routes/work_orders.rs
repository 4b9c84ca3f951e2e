//! Work order routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use hivedrive_core::inventory::{IssuePartInput, StockMovement};
use hivedrive_core::lifecycle::{
    CreateWorkOrderInput, DocumentSort, Invoice, Priority, WorkOrder, WorkOrderEvent,
    WorkOrderFilter, WorkOrderQuery, WorkOrderStatus,
};
use hivedrive_shared::types::{BranchId, PageResponse, PartId, SortDirection, WorkOrderId};

use super::common::{LineItemRequest, TransitionRequest, UpdateDocumentRequest, line_inputs, page};
use crate::error::{ApiError, Localize};
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;
use crate::{AppState, amount};

/// Creates the work order routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/work-orders", get(list_work_orders).post(create_work_order))
        .route(
            "/work-orders/{id}",
            get(get_work_order).put(update_work_order),
        )
        .route("/work-orders/{id}/transitions", post(transition_work_order))
        .route("/work-orders/{id}/invoice", post(create_invoice))
        .route("/work-orders/{id}/parts", post(issue_part))
}

/// Query parameters for listing work orders.
#[derive(Debug, Default, Deserialize)]
pub struct ListWorkOrdersQuery {
    /// Filter by status.
    pub status: Option<WorkOrderStatus>,
    /// Filter by priority.
    pub priority: Option<Priority>,
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by vehicle.
    pub vehicle_id: Option<Uuid>,
    /// Filter by branch.
    pub branch_id: Option<BranchId>,
    /// Matches the order number.
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

impl From<ListWorkOrdersQuery> for WorkOrderQuery {
    fn from(query: ListWorkOrdersQuery) -> Self {
        Self {
            filter: WorkOrderFilter {
                status: query.status,
                priority: query.priority,
                customer_id: query.customer_id,
                vehicle_id: query.vehicle_id,
                branch_id: query.branch_id,
            },
            search: query.search,
            sort: query.sort.unwrap_or_default(),
            direction: query.direction.unwrap_or_default(),
            page: page(query.page, query.per_page),
        }
    }
}

/// Request body for opening a work order without a quotation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkOrderRequest {
    /// Customer reference.
    pub customer_id: Uuid,
    /// Vehicle reference.
    pub vehicle_id: Uuid,
    /// Work to be done.
    #[validate(nested)]
    #[serde(default)]
    pub items: Vec<LineItemRequest>,
    /// Document discount percent (default 0).
    #[serde(default, deserialize_with = "amount::deserialize_option")]
    pub discount_percent: Option<Decimal>,
    /// Tax percent (default from configuration).
    #[serde(default, deserialize_with = "amount::deserialize_option")]
    pub tax_percent: Option<Decimal>,
    /// Urgency (default `normal`).
    #[serde(default)]
    pub priority: Priority,
    /// What the customer reported.
    #[validate(length(max = 2000))]
    pub complaint: Option<String>,
    /// Odometer reading at check-in.
    #[validate(range(min = 0))]
    pub mileage_in: Option<i32>,
    /// Promised completion date.
    pub expected_completion: Option<NaiveDate>,
}

impl From<CreateWorkOrderRequest> for CreateWorkOrderInput {
    fn from(request: CreateWorkOrderRequest) -> Self {
        Self {
            customer_id: request.customer_id,
            vehicle_id: request.vehicle_id,
            items: line_inputs(request.items),
            discount_percent: request.discount_percent,
            tax_percent: request.tax_percent,
            priority: request.priority,
            complaint: request.complaint,
            mileage_in: request.mileage_in,
            expected_completion: request.expected_completion,
        }
    }
}

/// Request body for issuing a part to a work order.
#[derive(Debug, Deserialize, Validate)]
pub struct IssuePartRequest {
    /// Part taken from stock.
    pub part_id: PartId,
    /// Units taken.
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// GET `/work-orders` - List work orders.
async fn list_work_orders(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<ListWorkOrdersQuery>,
) -> Result<Json<PageResponse<WorkOrder>>, ApiError> {
    let page = state
        .repos
        .work_orders
        .list(&ctx, &query.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(page))
}

/// POST `/work-orders` - Open a pending work order in the caller's branch.
async fn create_work_order(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateWorkOrderRequest>,
) -> Result<(StatusCode, Json<WorkOrder>), ApiError> {
    let order = state
        .repos
        .work_orders
        .create(&ctx, payload.into())
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET `/work-orders/{id}` - Load a work order with its items.
async fn get_work_order(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<WorkOrderId>,
) -> Result<Json<WorkOrder>, ApiError> {
    let order = state
        .repos
        .work_orders
        .get(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(order))
}

/// PUT `/work-orders/{id}` - Edit items or percentages.
async fn update_work_order(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<WorkOrderId>,
    ValidatedJson(payload): ValidatedJson<UpdateDocumentRequest>,
) -> Result<Json<WorkOrder>, ApiError> {
    let order = state
        .repos
        .work_orders
        .update(&ctx, id, payload.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(order))
}

/// POST `/work-orders/{id}/transitions` - Start, hold, resume, complete, deliver, or cancel.
async fn transition_work_order(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<WorkOrderId>,
    ValidatedJson(payload): ValidatedJson<TransitionRequest<WorkOrderEvent>>,
) -> Result<Json<WorkOrder>, ApiError> {
    let order = state
        .repos
        .work_orders
        .transition(&ctx, id, payload.event)
        .await
        .localize(ctx.locale)?;
    Ok(Json(order))
}

/// POST `/work-orders/{id}/invoice` - Invoice a completed work order.
async fn create_invoice(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<WorkOrderId>,
) -> Result<(StatusCode, Json<Invoice>), ApiError> {
    let invoice = state
        .repos
        .work_orders
        .create_invoice(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// POST `/work-orders/{id}/parts` - Issue parts from the branch's stock.
async fn issue_part(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<WorkOrderId>,
    ValidatedJson(payload): ValidatedJson<IssuePartRequest>,
) -> Result<(StatusCode, Json<StockMovement>), ApiError> {
    let input = IssuePartInput {
        part_id: payload.part_id,
        quantity: payload.quantity,
    };
    let movement = state
        .repos
        .work_orders
        .issue_part(&ctx, id, input)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(movement)))
}
