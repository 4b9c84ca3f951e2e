//! Quotation routes.

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

use hivedrive_core::lifecycle::{
    CreateQuotationInput, DocumentSort, Quotation, QuotationEvent, QuotationFilter,
    QuotationQuery, QuotationStatus, WorkOrder,
};
use hivedrive_shared::types::{BranchId, PageResponse, QuotationId, SortDirection};

use super::common::{LineItemRequest, TransitionRequest, UpdateDocumentRequest, line_inputs, page};
use crate::error::{ApiError, Localize};
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;
use crate::{AppState, amount};

/// Creates the quotation routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotations", get(list_quotations).post(create_quotation))
        .route(
            "/quotations/{id}",
            get(get_quotation)
                .put(update_quotation)
                .delete(delete_quotation),
        )
        .route("/quotations/{id}/transitions", post(transition_quotation))
        .route("/quotations/{id}/convert", post(convert_quotation))
}

/// Query parameters for listing quotations.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuotationsQuery {
    /// Filter by status.
    pub status: Option<QuotationStatus>,
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by vehicle.
    pub vehicle_id: Option<Uuid>,
    /// Filter by branch.
    pub branch_id: Option<BranchId>,
    /// Matches the quotation number.
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

impl From<ListQuotationsQuery> for QuotationQuery {
    fn from(query: ListQuotationsQuery) -> Self {
        Self {
            filter: QuotationFilter {
                status: query.status,
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

/// Request body for creating a quotation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuotationRequest {
    /// Customer reference.
    pub customer_id: Uuid,
    /// Vehicle reference.
    pub vehicle_id: Uuid,
    /// Lines to quote.
    #[validate(nested)]
    pub items: Vec<LineItemRequest>,
    /// Document discount percent (default 0).
    #[serde(default, deserialize_with = "amount::deserialize_option")]
    pub discount_percent: Option<Decimal>,
    /// Tax percent (default from configuration).
    #[serde(default, deserialize_with = "amount::deserialize_option")]
    pub tax_percent: Option<Decimal>,
    /// Free-text notes.
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Last day the offer holds.
    pub valid_until: Option<NaiveDate>,
}

impl From<CreateQuotationRequest> for CreateQuotationInput {
    fn from(request: CreateQuotationRequest) -> Self {
        Self {
            customer_id: request.customer_id,
            vehicle_id: request.vehicle_id,
            items: line_inputs(request.items),
            discount_percent: request.discount_percent,
            tax_percent: request.tax_percent,
            notes: request.notes,
            valid_until: request.valid_until,
        }
    }
}

/// GET `/quotations` - List quotations.
async fn list_quotations(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<ListQuotationsQuery>,
) -> Result<Json<PageResponse<Quotation>>, ApiError> {
    let page = state
        .repos
        .quotations
        .list(&ctx, &query.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(page))
}

/// POST `/quotations` - Create a draft quotation in the caller's branch.
async fn create_quotation(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateQuotationRequest>,
) -> Result<(StatusCode, Json<Quotation>), ApiError> {
    let quotation = state
        .repos
        .quotations
        .create(&ctx, payload.into())
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(quotation)))
}

/// GET `/quotations/{id}` - Load a quotation with its items.
async fn get_quotation(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<QuotationId>,
) -> Result<Json<Quotation>, ApiError> {
    let quotation = state
        .repos
        .quotations
        .get(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(quotation))
}

/// PUT `/quotations/{id}` - Edit items or percentages.
async fn update_quotation(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<QuotationId>,
    ValidatedJson(payload): ValidatedJson<UpdateDocumentRequest>,
) -> Result<Json<Quotation>, ApiError> {
    let quotation = state
        .repos
        .quotations
        .update(&ctx, id, payload.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(quotation))
}

/// DELETE `/quotations/{id}` - Delete a quotation that never became a work order.
async fn delete_quotation(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<QuotationId>,
) -> Result<StatusCode, ApiError> {
    state
        .repos
        .quotations
        .delete(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/quotations/{id}/transitions` - Submit, approve, reject, or expire.
async fn transition_quotation(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<QuotationId>,
    ValidatedJson(payload): ValidatedJson<TransitionRequest<QuotationEvent>>,
) -> Result<Json<Quotation>, ApiError> {
    let quotation = state
        .repos
        .quotations
        .transition(&ctx, id, payload.event)
        .await
        .localize(ctx.locale)?;
    Ok(Json(quotation))
}

/// POST `/quotations/{id}/convert` - Turn an approved quotation into a work order.
async fn convert_quotation(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<QuotationId>,
) -> Result<(StatusCode, Json<WorkOrder>), ApiError> {
    let order = state
        .repos
        .quotations
        .convert_to_work_order(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(order)))
}
