//! Part catalogue and stock routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use hivedrive_core::inventory::{
    AdjustStockInput, CreatePartInput, InventoryRecord, LowStockItem, MovementFilter,
    MovementQuery, MovementSort, MovementType, Part, PartFilter, PartQuery, PartSort,
    StockMovement, UpdatePartInput,
};
use hivedrive_shared::types::{BranchId, PageResponse, PartId, Reference, SortDirection};

use super::common::page;
use crate::error::{ApiError, Localize};
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;
use crate::{AppState, amount};

/// Creates the inventory routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/parts", get(list_parts).post(create_part))
        .route("/parts/{id}", get(get_part).put(update_part))
        .route("/parts/{id}/stock", get(stock_level))
        .route("/inventory/adjustments", post(adjust_stock))
        .route("/inventory/movements", get(list_movements))
        .route("/inventory/low-stock", get(low_stock))
}

/// Query parameters for listing parts.
#[derive(Debug, Default, Deserialize)]
pub struct ListPartsQuery {
    /// Filter by active flag.
    pub is_active: Option<bool>,
    /// Filter by supplier.
    pub supplier_id: Option<Uuid>,
    /// Matches name, English name, or SKU.
    pub search: Option<String>,
    /// Sort field.
    pub sort: Option<PartSort>,
    /// Sort direction.
    pub direction: Option<SortDirection>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl From<ListPartsQuery> for PartQuery {
    fn from(query: ListPartsQuery) -> Self {
        Self {
            filter: PartFilter {
                is_active: query.is_active,
                supplier_id: query.supplier_id,
            },
            search: query.search,
            sort: query.sort.unwrap_or_default(),
            // Parts read naturally A to Z.
            direction: query.direction.unwrap_or(SortDirection::Asc),
            page: page(query.page, query.per_page),
        }
    }
}

/// Query parameters for movement history.
#[derive(Debug, Default, Deserialize)]
pub struct ListMovementsQuery {
    /// Filter by part.
    pub part_id: Option<PartId>,
    /// Filter by branch.
    pub branch_id: Option<BranchId>,
    /// Filter by movement reason.
    pub movement_type: Option<MovementType>,
    /// Filter by source record.
    pub reference_id: Option<Uuid>,
    /// Sort field.
    pub sort: Option<MovementSort>,
    /// Sort direction.
    pub direction: Option<SortDirection>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl From<ListMovementsQuery> for MovementQuery {
    fn from(query: ListMovementsQuery) -> Self {
        Self {
            filter: MovementFilter {
                part_id: query.part_id,
                branch_id: query.branch_id,
                movement_type: query.movement_type,
                reference_id: query.reference_id,
            },
            search: None,
            sort: query.sort.unwrap_or_default(),
            direction: query.direction.unwrap_or_default(),
            page: page(query.page, query.per_page),
        }
    }
}

/// Selects a branch; the caller's own when omitted.
#[derive(Debug, Default, Deserialize)]
pub struct BranchQuery {
    /// Branch to read.
    pub branch_id: Option<BranchId>,
}

/// Request body for adding a part to the catalogue.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartRequest {
    /// Stock keeping unit, unique across the catalogue.
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    /// Arabic name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// English name.
    #[validate(length(max = 200))]
    pub name_en: Option<String>,
    /// Purchase cost per unit.
    #[serde(deserialize_with = "amount::deserialize")]
    pub cost_price: Decimal,
    /// Selling price per unit.
    #[serde(deserialize_with = "amount::deserialize")]
    pub sell_price: Decimal,
    /// Low-stock threshold; 0 uses the configured default.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub min_quantity: i32,
    /// Usual supplier.
    pub supplier_id: Option<Uuid>,
    /// Opening stock booked into the caller's branch.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub initial_quantity: i32,
}

/// Request body for editing a part. Absent fields are kept.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePartRequest {
    /// Arabic name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// English name.
    #[validate(length(max = 200))]
    pub name_en: Option<String>,
    /// Purchase cost per unit.
    #[serde(default, deserialize_with = "amount::deserialize_option")]
    pub cost_price: Option<Decimal>,
    /// Selling price per unit.
    #[serde(default, deserialize_with = "amount::deserialize_option")]
    pub sell_price: Option<Decimal>,
    /// Low-stock threshold.
    #[validate(range(min = 0))]
    pub min_quantity: Option<i32>,
    /// Usual supplier.
    pub supplier_id: Option<Uuid>,
    /// Set `false` to retire the part.
    pub is_active: Option<bool>,
}

impl From<UpdatePartRequest> for UpdatePartInput {
    fn from(request: UpdatePartRequest) -> Self {
        Self {
            name: request.name,
            name_en: request.name_en,
            cost_price: request.cost_price,
            sell_price: request.sell_price,
            min_quantity: request.min_quantity,
            supplier_id: request.supplier_id,
            is_active: request.is_active,
        }
    }
}

/// Request body for a manual stock change.
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustStockRequest {
    /// Part to move.
    pub part_id: PartId,
    /// Branch holding the stock; the caller's own when omitted.
    pub branch_id: Option<BranchId>,
    /// Signed change in units.
    pub delta: i32,
    /// Reason, matching the sign of `delta`.
    pub movement_type: MovementType,
    /// Source record; manual when omitted.
    pub reference: Option<Reference>,
    /// Free-text notes.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// GET `/parts` - List catalogue parts.
async fn list_parts(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<ListPartsQuery>,
) -> Result<Json<PageResponse<Part>>, ApiError> {
    let page = state
        .repos
        .inventory
        .list_parts(&ctx, &query.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(page))
}

/// POST `/parts` - Add a part, booking any opening stock.
async fn create_part(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreatePartRequest>,
) -> Result<(StatusCode, Json<Part>), ApiError> {
    let input = CreatePartInput {
        sku: payload.sku,
        name: payload.name,
        name_en: payload.name_en,
        cost_price: payload.cost_price,
        sell_price: payload.sell_price,
        min_quantity: payload.min_quantity,
        supplier_id: payload.supplier_id,
        initial_quantity: payload.initial_quantity,
    };
    let part = state
        .repos
        .inventory
        .create_part(&ctx, input)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(part)))
}

/// GET `/parts/{id}` - Load a part.
async fn get_part(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<PartId>,
) -> Result<Json<Part>, ApiError> {
    let part = state
        .repos
        .inventory
        .get_part(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(part))
}

/// PUT `/parts/{id}` - Edit a part's catalogue fields.
async fn update_part(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<PartId>,
    ValidatedJson(payload): ValidatedJson<UpdatePartRequest>,
) -> Result<Json<Part>, ApiError> {
    let part = state
        .repos
        .inventory
        .update_part(&ctx, id, payload.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(part))
}

/// GET `/parts/{id}/stock` - Quantity on hand in a branch.
async fn stock_level(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<PartId>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<InventoryRecord>, ApiError> {
    let branch_id = query.branch_id.unwrap_or(ctx.branch_id);
    let record = state
        .repos
        .inventory
        .stock_level(&ctx, id, branch_id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(record))
}

/// POST `/inventory/adjustments` - Apply a signed stock change.
async fn adjust_stock(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<AdjustStockRequest>,
) -> Result<(StatusCode, Json<StockMovement>), ApiError> {
    let input = AdjustStockInput {
        part_id: payload.part_id,
        branch_id: payload.branch_id.unwrap_or(ctx.branch_id),
        delta: payload.delta,
        movement_type: payload.movement_type,
        reference: payload.reference.unwrap_or_else(Reference::manual),
        notes: payload.notes,
    };
    let movement = state
        .repos
        .inventory
        .adjust_stock(&ctx, input)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// GET `/inventory/movements` - Movement history, newest first.
async fn list_movements(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<ListMovementsQuery>,
) -> Result<Json<PageResponse<StockMovement>>, ApiError> {
    let page = state
        .repos
        .inventory
        .movements(&ctx, &query.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(page))
}

/// GET `/inventory/low-stock` - Active parts at or below their threshold.
async fn low_stock(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<BranchQuery>,
) -> Result<Json<Vec<LowStockItem>>, ApiError> {
    let branch_id = query.branch_id.unwrap_or(ctx.branch_id);
    let items = state
        .repos
        .inventory
        .low_stock(&ctx, branch_id, state.low_stock_threshold)
        .await
        .localize(ctx.locale)?;
    Ok(Json(items))
}
