//! Fixtures shared by the store tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use hivedrive_core::inventory::{AdjustStockInput, CreatePartInput, MovementType, Part};
use hivedrive_core::lifecycle::{CreateQuotationInput, CreateWorkOrderInput, Priority};
use hivedrive_core::pricing::{ItemType, LineItemInput};
use hivedrive_core::registry::{CreateCustomerInput, CreateSupplierInput, CreateVehicleInput};
use hivedrive_core::repository::Repositories;
use hivedrive_db::MemoryStore;
use hivedrive_shared::types::{BranchId, PartId, Reference, UserId};
use hivedrive_shared::{Locale, RequestContext, Role};

pub const DEFAULT_TAX: Decimal = dec!(14);

pub fn memory_repos() -> Repositories {
    MemoryStore::new(DEFAULT_TAX).repositories()
}

pub fn ctx(role: Role, branch_id: BranchId) -> RequestContext {
    RequestContext::new(UserId::new(), branch_id, role, Locale::En)
}

pub fn line(quantity: Decimal, unit_price: Decimal) -> LineItemInput {
    LineItemInput {
        item_type: ItemType::Service,
        part_id: None,
        description: "Brake service".to_string(),
        description_en: None,
        quantity,
        unit_price,
        discount_percent: Decimal::ZERO,
    }
}

/// A registered customer and one of their vehicles.
#[derive(Debug, Clone, Copy)]
pub struct Owner {
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
}

pub async fn registered_owner(repos: &Repositories, ctx: &RequestContext) -> Owner {
    let customer = repos
        .registry
        .create_customer(
            ctx,
            CreateCustomerInput {
                name: "Omar Haddad".to_string(),
                phone: Some("0501234567".to_string()),
                email: None,
                customer_type: Default::default(),
            },
        )
        .await
        .unwrap();
    let plate = Uuid::now_v7().simple().to_string();
    let vehicle = repos
        .registry
        .create_vehicle(
            ctx,
            CreateVehicleInput {
                customer_id: customer.id,
                plate_number: plate[plate.len() - 8..].to_string(),
                chassis_number: None,
                brand: Some("Toyota".to_string()),
                model: Some("Camry".to_string()),
                year: Some(2019),
                color: None,
            },
        )
        .await
        .unwrap();
    Owner {
        customer_id: customer.id.into_inner(),
        vehicle_id: vehicle.id.into_inner(),
    }
}

pub async fn registered_supplier(repos: &Repositories, ctx: &RequestContext) -> Uuid {
    repos
        .registry
        .create_supplier(
            ctx,
            CreateSupplierInput {
                name: "Gulf Auto Parts".to_string(),
                phone: None,
                email: None,
                address: None,
            },
        )
        .await
        .unwrap()
        .id
        .into_inner()
}

pub fn quotation_input(
    owner: &Owner,
    items: Vec<LineItemInput>,
    discount: Decimal,
    tax: Decimal,
) -> CreateQuotationInput {
    CreateQuotationInput {
        customer_id: owner.customer_id,
        vehicle_id: owner.vehicle_id,
        items,
        discount_percent: Some(discount),
        tax_percent: Some(tax),
        notes: None,
        valid_until: None,
    }
}

pub fn work_order_input(owner: &Owner, items: Vec<LineItemInput>) -> CreateWorkOrderInput {
    CreateWorkOrderInput {
        customer_id: owner.customer_id,
        vehicle_id: owner.vehicle_id,
        items,
        discount_percent: Some(Decimal::ZERO),
        tax_percent: Some(Decimal::ZERO),
        priority: Priority::Normal,
        complaint: Some("Noise when braking".to_string()),
        mileage_in: Some(120_000),
        expected_completion: None,
    }
}

pub fn part_input(sku: &str, initial_quantity: i32) -> CreatePartInput {
    CreatePartInput {
        sku: sku.to_string(),
        name: format!("Part {sku}"),
        name_en: None,
        cost_price: dec!(40),
        sell_price: dec!(65),
        min_quantity: 0,
        supplier_id: None,
        initial_quantity,
    }
}

pub async fn stocked_part(
    repos: &Repositories,
    ctx: &RequestContext,
    sku: &str,
    quantity: i32,
) -> Part {
    repos
        .inventory
        .create_part(ctx, part_input(sku, quantity))
        .await
        .unwrap()
}

pub fn adjustment(part_id: PartId, branch_id: BranchId, delta: i32) -> AdjustStockInput {
    AdjustStockInput {
        part_id,
        branch_id,
        delta,
        movement_type: if delta > 0 {
            MovementType::AdjustmentIn
        } else {
            MovementType::AdjustmentOut
        },
        reference: Reference::manual(),
        notes: None,
    }
}
