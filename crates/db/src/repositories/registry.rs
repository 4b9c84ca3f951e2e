//! Customers, vehicles, and suppliers on PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, TransactionTrait,
};
use uuid::Uuid;

use hivedrive_core::registry::{
    CreateCustomerInput, CreateSupplierInput, CreateVehicleInput, Customer, CustomerQuery,
    RegistryError, RegistryService, RegistrySort, Supplier, SupplierQuery, Vehicle, VehicleQuery,
};
use hivedrive_core::repository::RegistryRepository;
use hivedrive_shared::context::STOCK_KEEPERS;
use hivedrive_shared::types::{CustomerId, PageResponse, SupplierId, VehicleId};
use hivedrive_shared::{AppResult, RequestContext};

use super::{PgStore, convert, like_pattern, order};
use crate::entities::{customers, suppliers, vehicles};
use crate::error::{map_db_err, retry_read};

/// Checks a document's customer and vehicle on the caller's transaction.
///
/// Both rows are read `FOR SHARE` so neither can be removed before commit.
pub(crate) async fn check_parties<C: ConnectionTrait>(
    txn: &C,
    customer_id: Uuid,
    vehicle_id: Uuid,
) -> AppResult<()> {
    let customer = customers::Entity::find_by_id(customer_id)
        .lock_shared()
        .one(txn)
        .await
        .map_err(map_db_err)?
        .map(convert::customer)
        .transpose()?;
    let vehicle = vehicles::Entity::find_by_id(vehicle_id)
        .lock_shared()
        .one(txn)
        .await
        .map_err(map_db_err)?
        .map(convert::vehicle);
    RegistryService::check_parties(customer_id, vehicle_id, customer.as_ref(), vehicle.as_ref())?;
    Ok(())
}

/// Checks a purchase order's supplier on the caller's transaction.
pub(crate) async fn check_supplier<C: ConnectionTrait>(
    txn: &C,
    supplier_id: Uuid,
) -> AppResult<()> {
    let supplier = suppliers::Entity::find_by_id(supplier_id)
        .lock_shared()
        .one(txn)
        .await
        .map_err(map_db_err)?
        .map(convert::supplier);
    RegistryService::check_supplier(supplier_id, supplier.as_ref())?;
    Ok(())
}

impl PgStore {
    async fn find_supplier(&self, id: SupplierId) -> AppResult<Supplier> {
        suppliers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(convert::supplier)
            .ok_or_else(|| RegistryError::SupplierNotFound(id).into())
    }

    async fn find_vehicle(&self, id: VehicleId) -> AppResult<Vehicle> {
        vehicles::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(convert::vehicle)
            .ok_or_else(|| RegistryError::VehicleNotFound(id).into())
    }

    async fn find_customer(&self, id: CustomerId) -> AppResult<Customer> {
        customers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(convert::customer)
            .transpose()?
            .ok_or_else(|| RegistryError::CustomerNotFound(id).into())
    }

    async fn query_customers(&self, query: &CustomerQuery) -> AppResult<PageResponse<Customer>> {
        let mut select = customers::Entity::find().apply_if(query.filter.customer_type, |q, t| {
            q.filter(customers::Column::CustomerType.eq(t.as_str()))
        });
        if let Some(term) = query.search_term() {
            let pattern = like_pattern(&term);
            select = select.filter(
                Condition::any()
                    .add(Expr::col(customers::Column::Name).ilike(&pattern))
                    .add(Expr::col(customers::Column::Phone).ilike(&pattern))
                    .add(Expr::col(customers::Column::Email).ilike(&pattern)),
            );
        }

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let column = match query.sort {
            RegistrySort::Name => customers::Column::Name,
            RegistrySort::CreatedAt => customers::Column::CreatedAt,
        };
        let customers = select
            .order_by(column, order(query.direction))
            .order_by(customers::Column::Id, order(query.direction))
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(convert::customer)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(customers, query.page, total))
    }

    async fn query_vehicles(&self, query: &VehicleQuery) -> AppResult<PageResponse<Vehicle>> {
        let mut select = vehicles::Entity::find().apply_if(query.filter.customer_id, |q, id| {
            q.filter(vehicles::Column::CustomerId.eq(id.into_inner()))
        });
        if let Some(term) = query.search_term() {
            let pattern = like_pattern(&term);
            select = select.filter(
                Condition::any()
                    .add(Expr::col(vehicles::Column::PlateNumber).ilike(&pattern))
                    .add(Expr::col(vehicles::Column::ChassisNumber).ilike(&pattern)),
            );
        }

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let column = match query.sort {
            RegistrySort::Name => vehicles::Column::PlateNumber,
            RegistrySort::CreatedAt => vehicles::Column::CreatedAt,
        };
        let vehicles = select
            .order_by(column, order(query.direction))
            .order_by(vehicles::Column::Id, order(query.direction))
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(convert::vehicle)
            .collect();
        Ok(PageResponse::new(vehicles, query.page, total))
    }

    async fn query_suppliers(&self, query: &SupplierQuery) -> AppResult<PageResponse<Supplier>> {
        let mut select = suppliers::Entity::find();
        if let Some(term) = query.search_term() {
            let pattern = like_pattern(&term);
            select = select.filter(
                Condition::any()
                    .add(Expr::col(suppliers::Column::Name).ilike(&pattern))
                    .add(Expr::col(suppliers::Column::Phone).ilike(&pattern)),
            );
        }

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let column = match query.sort {
            RegistrySort::Name => suppliers::Column::Name,
            RegistrySort::CreatedAt => suppliers::Column::CreatedAt,
        };
        let suppliers = select
            .order_by(column, order(query.direction))
            .order_by(suppliers::Column::Id, order(query.direction))
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(convert::supplier)
            .collect();
        Ok(PageResponse::new(suppliers, query.page, total))
    }
}

#[async_trait]
impl RegistryRepository for PgStore {
    async fn create_customer(
        &self,
        ctx: &RequestContext,
        input: CreateCustomerInput,
    ) -> AppResult<Customer> {
        let customer =
            RegistryService::new_customer(&input, ctx.branch_id, ctx.user_id, Utc::now())?;
        convert::customer_model(&customer)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::info!(customer_id = %customer.id, "customer registered");
        Ok(customer)
    }

    async fn get_customer(&self, _ctx: &RequestContext, id: CustomerId) -> AppResult<Customer> {
        retry_read(|| self.find_customer(id)).await
    }

    async fn list_customers(
        &self,
        _ctx: &RequestContext,
        query: &CustomerQuery,
    ) -> AppResult<PageResponse<Customer>> {
        retry_read(|| self.query_customers(query)).await
    }

    async fn create_vehicle(
        &self,
        _ctx: &RequestContext,
        input: CreateVehicleInput,
    ) -> AppResult<Vehicle> {
        let vehicle = RegistryService::new_vehicle(&input, Utc::now())?;

        let txn = self.db.begin().await.map_err(map_db_err)?;
        customers::Entity::find_by_id(vehicle.customer_id.into_inner())
            .lock_shared()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RegistryError::CustomerNotFound(vehicle.customer_id))?;
        convert::vehicle_model(&vehicle)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            vehicle_id = %vehicle.id,
            customer_id = %vehicle.customer_id,
            "vehicle registered"
        );
        Ok(vehicle)
    }

    async fn get_vehicle(&self, _ctx: &RequestContext, id: VehicleId) -> AppResult<Vehicle> {
        retry_read(|| self.find_vehicle(id)).await
    }

    async fn list_vehicles(
        &self,
        _ctx: &RequestContext,
        query: &VehicleQuery,
    ) -> AppResult<PageResponse<Vehicle>> {
        retry_read(|| self.query_vehicles(query)).await
    }

    async fn create_supplier(
        &self,
        ctx: &RequestContext,
        input: CreateSupplierInput,
    ) -> AppResult<Supplier> {
        ctx.require_any(STOCK_KEEPERS)?;
        let supplier = RegistryService::new_supplier(&input, Utc::now())?;
        convert::supplier_model(&supplier)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::info!(supplier_id = %supplier.id, "supplier registered");
        Ok(supplier)
    }

    async fn get_supplier(&self, _ctx: &RequestContext, id: SupplierId) -> AppResult<Supplier> {
        retry_read(|| self.find_supplier(id)).await
    }

    async fn list_suppliers(
        &self,
        _ctx: &RequestContext,
        query: &SupplierQuery,
    ) -> AppResult<PageResponse<Supplier>> {
        retry_read(|| self.query_suppliers(query)).await
    }
}
