//! Customer, vehicle, and supplier routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use validator::Validate;

use hivedrive_core::registry::{
    CreateCustomerInput, CreateSupplierInput, CreateVehicleInput, Customer, CustomerFilter,
    CustomerQuery, CustomerType, RegistrySort, Supplier, SupplierQuery, Vehicle, VehicleFilter,
    VehicleQuery,
};
use hivedrive_shared::types::{CustomerId, PageResponse, SortDirection, SupplierId, VehicleId};

use super::common::page;
use crate::AppState;
use crate::error::{ApiError, Localize};
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;

/// Creates the registry routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/{id}", get(get_customer))
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route("/vehicles/{id}", get(get_vehicle))
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route("/suppliers/{id}", get(get_supplier))
}

/// Query parameters for listing customers.
#[derive(Debug, Default, Deserialize)]
pub struct ListCustomersQuery {
    /// Filter by kind.
    pub customer_type: Option<CustomerType>,
    /// Matches name, phone, or email.
    pub search: Option<String>,
    /// Sort field.
    pub sort: Option<RegistrySort>,
    /// Sort direction.
    pub direction: Option<SortDirection>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl From<ListCustomersQuery> for CustomerQuery {
    fn from(query: ListCustomersQuery) -> Self {
        Self {
            filter: CustomerFilter {
                customer_type: query.customer_type,
            },
            search: query.search,
            sort: query.sort.unwrap_or_default(),
            direction: query.direction.unwrap_or(SortDirection::Asc),
            page: page(query.page, query.per_page),
        }
    }
}

/// Query parameters for listing vehicles.
#[derive(Debug, Default, Deserialize)]
pub struct ListVehiclesQuery {
    /// Only this customer's vehicles.
    pub customer_id: Option<CustomerId>,
    /// Matches plate or chassis number.
    pub search: Option<String>,
    /// Sort field; `name` sorts by plate.
    pub sort: Option<RegistrySort>,
    /// Sort direction.
    pub direction: Option<SortDirection>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl From<ListVehiclesQuery> for VehicleQuery {
    fn from(query: ListVehiclesQuery) -> Self {
        Self {
            filter: VehicleFilter {
                customer_id: query.customer_id,
            },
            search: query.search,
            sort: query.sort.unwrap_or_default(),
            direction: query.direction.unwrap_or(SortDirection::Asc),
            page: page(query.page, query.per_page),
        }
    }
}

/// Query parameters for listing suppliers.
#[derive(Debug, Default, Deserialize)]
pub struct ListSuppliersQuery {
    /// Matches name or phone.
    pub search: Option<String>,
    /// Sort field.
    pub sort: Option<RegistrySort>,
    /// Sort direction.
    pub direction: Option<SortDirection>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl From<ListSuppliersQuery> for SupplierQuery {
    fn from(query: ListSuppliersQuery) -> Self {
        Self {
            filter: (),
            search: query.search,
            sort: query.sort.unwrap_or_default(),
            direction: query.direction.unwrap_or(SortDirection::Asc),
            page: page(query.page, query.per_page),
        }
    }
}

/// Request body for registering a customer.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    /// Full or company name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Contact phone.
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// `individual` when omitted.
    #[serde(default)]
    pub customer_type: CustomerType,
}

/// Request body for registering a vehicle.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    /// Owner.
    pub customer_id: CustomerId,
    /// Licence plate.
    #[validate(length(min = 1, max = 32))]
    pub plate_number: String,
    /// Chassis number.
    #[validate(length(max = 64))]
    pub chassis_number: Option<String>,
    /// Make.
    #[validate(length(max = 64))]
    pub brand: Option<String>,
    /// Model.
    #[validate(length(max = 64))]
    pub model: Option<String>,
    /// Model year.
    pub year: Option<i32>,
    /// Colour.
    #[validate(length(max = 32))]
    pub color: Option<String>,
}

/// Request body for registering a supplier.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    /// Trading name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Contact phone.
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// Postal address.
    #[validate(length(max = 1000))]
    pub address: Option<String>,
}

/// GET `/customers` - List customers, A to Z.
async fn list_customers(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<PageResponse<Customer>>, ApiError> {
    let page = state
        .repos
        .registry
        .list_customers(&ctx, &query.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(page))
}

/// POST `/customers` - Register a customer.
async fn create_customer(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let input = CreateCustomerInput {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        customer_type: payload.customer_type,
    };
    let customer = state
        .repos
        .registry
        .create_customer(&ctx, input)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET `/customers/{id}` - Load a customer.
async fn get_customer(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<CustomerId>,
) -> Result<Json<Customer>, ApiError> {
    let customer = state
        .repos
        .registry
        .get_customer(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(customer))
}

/// GET `/vehicles` - List vehicles, optionally for one customer.
async fn list_vehicles(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<ListVehiclesQuery>,
) -> Result<Json<PageResponse<Vehicle>>, ApiError> {
    let page = state
        .repos
        .registry
        .list_vehicles(&ctx, &query.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(page))
}

/// POST `/vehicles` - Register a vehicle to an existing customer.
async fn create_vehicle(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<Vehicle>), ApiError> {
    let input = CreateVehicleInput {
        customer_id: payload.customer_id,
        plate_number: payload.plate_number,
        chassis_number: payload.chassis_number,
        brand: payload.brand,
        model: payload.model,
        year: payload.year,
        color: payload.color,
    };
    let vehicle = state
        .repos
        .registry
        .create_vehicle(&ctx, input)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// GET `/vehicles/{id}` - Load a vehicle.
async fn get_vehicle(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<VehicleId>,
) -> Result<Json<Vehicle>, ApiError> {
    let vehicle = state
        .repos
        .registry
        .get_vehicle(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(vehicle))
}

/// GET `/suppliers` - List suppliers.
async fn list_suppliers(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<ListSuppliersQuery>,
) -> Result<Json<PageResponse<Supplier>>, ApiError> {
    let page = state
        .repos
        .registry
        .list_suppliers(&ctx, &query.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(page))
}

/// POST `/suppliers` - Register a supplier.
async fn create_supplier(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    let input = CreateSupplierInput {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        address: payload.address,
    };
    let supplier = state
        .repos
        .registry
        .create_supplier(&ctx, input)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// GET `/suppliers/{id}` - Load a supplier.
async fn get_supplier(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<SupplierId>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = state
        .repos
        .registry
        .get_supplier(&ctx, id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(supplier))
}
