//! Customers, vehicles, and suppliers in memory.

use async_trait::async_trait;
use chrono::Utc;

use hivedrive_core::registry::{
    CreateCustomerInput, CreateSupplierInput, CreateVehicleInput, Customer, CustomerQuery,
    RegistryError, RegistryService, RegistrySort, Supplier, SupplierQuery, Vehicle, VehicleQuery,
};
use hivedrive_core::repository::RegistryRepository;
use hivedrive_shared::context::STOCK_KEEPERS;
use hivedrive_shared::types::{CustomerId, PageResponse, SupplierId, VehicleId};
use hivedrive_shared::{AppError, AppResult, RequestContext};

use super::{MemoryStore, matches_search, paginate};

#[async_trait]
impl RegistryRepository for MemoryStore {
    async fn create_customer(
        &self,
        ctx: &RequestContext,
        input: CreateCustomerInput,
    ) -> AppResult<Customer> {
        let customer =
            RegistryService::new_customer(&input, ctx.branch_id, ctx.user_id, Utc::now())?;
        self.tables
            .write()
            .await
            .customers
            .insert(customer.id, customer.clone());

        tracing::info!(customer_id = %customer.id, "customer registered");
        Ok(customer)
    }

    async fn get_customer(&self, _ctx: &RequestContext, id: CustomerId) -> AppResult<Customer> {
        self.tables
            .read()
            .await
            .customers
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::CustomerNotFound(id).into())
    }

    async fn list_customers(
        &self,
        _ctx: &RequestContext,
        query: &CustomerQuery,
    ) -> AppResult<PageResponse<Customer>> {
        let term = query.search_term();
        let mut items: Vec<Customer> = self
            .tables
            .read()
            .await
            .customers
            .values()
            .filter(|c| query.filter.customer_type.is_none_or(|t| c.customer_type == t))
            .filter(|c| {
                matches_search(
                    term.as_deref(),
                    &[Some(c.name.as_str()), c.phone.as_deref(), c.email.as_deref()],
                )
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let ordering = match query.sort {
                RegistrySort::Name => a.name.cmp(&b.name),
                RegistrySort::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            query.direction.apply(ordering.then_with(|| a.id.cmp(&b.id)))
        });
        Ok(paginate(&items, query.page))
    }

    async fn create_vehicle(
        &self,
        _ctx: &RequestContext,
        input: CreateVehicleInput,
    ) -> AppResult<Vehicle> {
        let vehicle = RegistryService::new_vehicle(&input, Utc::now())?;
        {
            let mut tables = self.tables.write().await;
            if !tables.customers.contains_key(&vehicle.customer_id) {
                return Err(RegistryError::CustomerNotFound(vehicle.customer_id).into());
            }
            if tables
                .vehicles
                .values()
                .any(|v| v.plate_number == vehicle.plate_number)
            {
                return Err(AppError::Conflict(format!(
                    "vehicle with plate {} already exists",
                    vehicle.plate_number
                )));
            }
            tables.vehicles.insert(vehicle.id, vehicle.clone());
        }

        tracing::info!(
            vehicle_id = %vehicle.id,
            customer_id = %vehicle.customer_id,
            "vehicle registered"
        );
        Ok(vehicle)
    }

    async fn get_vehicle(&self, _ctx: &RequestContext, id: VehicleId) -> AppResult<Vehicle> {
        self.tables
            .read()
            .await
            .vehicles
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::VehicleNotFound(id).into())
    }

    async fn list_vehicles(
        &self,
        _ctx: &RequestContext,
        query: &VehicleQuery,
    ) -> AppResult<PageResponse<Vehicle>> {
        let term = query.search_term();
        let mut items: Vec<Vehicle> = self
            .tables
            .read()
            .await
            .vehicles
            .values()
            .filter(|v| query.filter.customer_id.is_none_or(|c| v.customer_id == c))
            .filter(|v| {
                matches_search(
                    term.as_deref(),
                    &[Some(v.plate_number.as_str()), v.chassis_number.as_deref()],
                )
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let ordering = match query.sort {
                RegistrySort::Name => a.plate_number.cmp(&b.plate_number),
                RegistrySort::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            query.direction.apply(ordering.then_with(|| a.id.cmp(&b.id)))
        });
        Ok(paginate(&items, query.page))
    }

    async fn create_supplier(
        &self,
        ctx: &RequestContext,
        input: CreateSupplierInput,
    ) -> AppResult<Supplier> {
        ctx.require_any(STOCK_KEEPERS)?;
        let supplier = RegistryService::new_supplier(&input, Utc::now())?;
        self.tables
            .write()
            .await
            .suppliers
            .insert(supplier.id, supplier.clone());

        tracing::info!(supplier_id = %supplier.id, "supplier registered");
        Ok(supplier)
    }

    async fn get_supplier(&self, _ctx: &RequestContext, id: SupplierId) -> AppResult<Supplier> {
        self.tables
            .read()
            .await
            .suppliers
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::SupplierNotFound(id).into())
    }

    async fn list_suppliers(
        &self,
        _ctx: &RequestContext,
        query: &SupplierQuery,
    ) -> AppResult<PageResponse<Supplier>> {
        let term = query.search_term();
        let mut items: Vec<Supplier> = self
            .tables
            .read()
            .await
            .suppliers
            .values()
            .filter(|s| {
                matches_search(term.as_deref(), &[Some(s.name.as_str()), s.phone.as_deref()])
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let ordering = match query.sort {
                RegistrySort::Name => a.name.cmp(&b.name),
                RegistrySort::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            query.direction.apply(ordering.then_with(|| a.id.cmp(&b.id)))
        });
        Ok(paginate(&items, query.page))
    }
}
