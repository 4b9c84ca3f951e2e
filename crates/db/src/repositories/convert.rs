//! Row to domain conversions.
//!
//! Stored enum names that no longer parse are reported as `Internal`; they
//! can only appear if the database was edited by hand.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use uuid::Uuid;

use hivedrive_core::inventory::{InventoryRecord, MovementType, Part, StockMovement};
use hivedrive_core::lifecycle::{
    Invoice, InvoiceStatus, Payment, PaymentMethod, Priority, Quotation, QuotationStatus,
    WorkOrder, WorkOrderStatus,
};
use hivedrive_core::pricing::{ItemType, LineItem, Percentages, Totals};
use hivedrive_core::purchasing::{PurchaseOrder, PurchaseOrderItem, PurchaseStatus};
use hivedrive_core::registry::{Customer, CustomerType, Supplier, Vehicle};
use hivedrive_core::treasury::{Expense, TransactionType, TreasuryAccount, TreasuryTransaction};
use hivedrive_shared::types::{
    BranchId, CustomerId, InvoiceId, LineItemId, PartId, PaymentId, PurchaseOrderId,
    QuotationId, Reference, ReferenceKind, StockMovementId, SupplierId, TreasuryId,
    TreasuryTransactionId, UserId, VehicleId, WorkOrderId,
};
use hivedrive_shared::{AppError, AppResult};

use crate::entities::{
    customers, expenses, inventory, invoices, parts, payments, purchase_order_items,
    purchase_orders, quotation_items, quotations, stock_movements, suppliers, treasury,
    treasury_transactions, vehicles, work_order_items, work_orders,
};

pub(crate) fn ts(value: DateTime<Utc>) -> DateTime<FixedOffset> {
    value.fixed_offset()
}

fn utc(value: DateTime<FixedOffset>) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

fn parse<T>(column: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> AppResult<T> {
    parse(value).ok_or_else(|| AppError::Internal(format!("unexpected {column} '{value}'")))
}

fn reference(kind: &str, id: Option<Uuid>) -> AppResult<Reference> {
    Ok(Reference {
        kind: parse("reference_type", kind, ReferenceKind::parse)?,
        id,
    })
}

// ---------------------------------------------------------------------------
// Catalogue & stock
// ---------------------------------------------------------------------------

pub(crate) fn part(model: parts::Model) -> Part {
    Part {
        id: PartId::from_uuid(model.id),
        sku: model.sku,
        name: model.name,
        name_en: model.name_en,
        cost_price: model.cost_price,
        sell_price: model.sell_price,
        min_quantity: model.min_quantity,
        supplier_id: model.supplier_id,
        is_active: model.is_active,
        created_at: utc(model.created_at),
    }
}

pub(crate) fn part_model(part: &Part) -> parts::ActiveModel {
    parts::ActiveModel {
        id: Set(part.id.into_inner()),
        sku: Set(part.sku.clone()),
        name: Set(part.name.clone()),
        name_en: Set(part.name_en.clone()),
        cost_price: Set(part.cost_price),
        sell_price: Set(part.sell_price),
        min_quantity: Set(part.min_quantity),
        supplier_id: Set(part.supplier_id),
        is_active: Set(part.is_active),
        created_at: Set(ts(part.created_at)),
    }
}

pub(crate) fn inventory_record(model: inventory::Model) -> InventoryRecord {
    InventoryRecord {
        part_id: PartId::from_uuid(model.part_id),
        branch_id: BranchId::from_uuid(model.branch_id),
        quantity: model.quantity,
        reserved_quantity: model.reserved_quantity,
        updated_at: model.updated_at.map(utc),
    }
}

pub(crate) fn movement(model: stock_movements::Model) -> AppResult<StockMovement> {
    Ok(StockMovement {
        id: StockMovementId::from_uuid(model.id),
        part_id: PartId::from_uuid(model.part_id),
        branch_id: BranchId::from_uuid(model.branch_id),
        movement_type: parse("movement_type", &model.movement_type, MovementType::parse)?,
        quantity: model.quantity,
        unit_cost: model.unit_cost,
        reference: reference(&model.reference_type, model.reference_id)?,
        notes: model.notes,
        created_by: UserId::from_uuid(model.created_by),
        created_at: utc(model.created_at),
    })
}

pub(crate) fn movement_model(movement: &StockMovement) -> stock_movements::ActiveModel {
    stock_movements::ActiveModel {
        id: Set(movement.id.into_inner()),
        part_id: Set(movement.part_id.into_inner()),
        branch_id: Set(movement.branch_id.into_inner()),
        movement_type: Set(movement.movement_type.as_str().to_string()),
        quantity: Set(movement.quantity),
        unit_cost: Set(movement.unit_cost),
        reference_type: Set(movement.reference.kind.as_str().to_string()),
        reference_id: Set(movement.reference.id),
        notes: Set(movement.notes.clone()),
        created_by: Set(movement.created_by.into_inner()),
        created_at: Set(ts(movement.created_at)),
    }
}

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

macro_rules! line_item_conversions {
    ($module:ident, $parent:ident, $from:ident, $to:ident) => {
        pub(crate) fn $from(model: $module::Model) -> AppResult<LineItem> {
            Ok(LineItem {
                id: LineItemId::from_uuid(model.id),
                item_type: parse("item_type", &model.item_type, ItemType::parse)?,
                part_id: model.part_id.map(PartId::from_uuid),
                description: model.description,
                description_en: model.description_en,
                quantity: model.quantity,
                unit_price: model.unit_price,
                discount_percent: model.discount_percent,
                total: model.total,
                sort_order: model.sort_order,
            })
        }

        pub(crate) fn $to(parent: Uuid, item: &LineItem) -> $module::ActiveModel {
            $module::ActiveModel {
                id: Set(item.id.into_inner()),
                $parent: Set(parent),
                item_type: Set(item.item_type.as_str().to_string()),
                part_id: Set(item.part_id.map(PartId::into_inner)),
                description: Set(item.description.clone()),
                description_en: Set(item.description_en.clone()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                discount_percent: Set(item.discount_percent),
                total: Set(item.total),
                sort_order: Set(item.sort_order),
            }
        }
    };
}

line_item_conversions!(quotation_items, quotation_id, quotation_item, quotation_item_model);
line_item_conversions!(work_order_items, work_order_id, work_order_item, work_order_item_model);

fn collect_items<M>(
    models: Vec<M>,
    convert: impl Fn(M) -> AppResult<LineItem>,
) -> AppResult<Vec<LineItem>> {
    let mut items = models.into_iter().map(convert).collect::<AppResult<Vec<_>>>()?;
    items.sort_by_key(|item| item.sort_order);
    Ok(items)
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

pub(crate) fn quotation(
    model: quotations::Model,
    items: Vec<quotation_items::Model>,
) -> AppResult<Quotation> {
    Ok(Quotation {
        id: QuotationId::from_uuid(model.id),
        quotation_number: model.quotation_number,
        customer_id: model.customer_id,
        vehicle_id: model.vehicle_id,
        branch_id: BranchId::from_uuid(model.branch_id),
        status: parse("quotation status", &model.status, QuotationStatus::parse)?,
        items: collect_items(items, quotation_item)?,
        percentages: Percentages {
            discount_percent: model.discount_percent,
            tax_percent: model.tax_percent,
        },
        totals: Totals {
            subtotal: model.subtotal,
            discount_amount: model.discount_amount,
            tax_amount: model.tax_amount,
            total: model.total,
        },
        notes: model.notes,
        valid_until: model.valid_until,
        created_by: UserId::from_uuid(model.created_by),
        approved_by: model.approved_by.map(UserId::from_uuid),
        approved_at: model.approved_at.map(utc),
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

pub(crate) fn quotation_model(q: &Quotation) -> quotations::ActiveModel {
    quotations::ActiveModel {
        id: Set(q.id.into_inner()),
        quotation_number: Set(q.quotation_number.clone()),
        customer_id: Set(q.customer_id),
        vehicle_id: Set(q.vehicle_id),
        branch_id: Set(q.branch_id.into_inner()),
        status: Set(q.status.as_str().to_string()),
        subtotal: Set(q.totals.subtotal),
        discount_percent: Set(q.percentages.discount_percent),
        discount_amount: Set(q.totals.discount_amount),
        tax_percent: Set(q.percentages.tax_percent),
        tax_amount: Set(q.totals.tax_amount),
        total: Set(q.totals.total),
        notes: Set(q.notes.clone()),
        valid_until: Set(q.valid_until),
        created_by: Set(q.created_by.into_inner()),
        approved_by: Set(q.approved_by.map(UserId::into_inner)),
        approved_at: Set(q.approved_at.map(ts)),
        created_at: Set(ts(q.created_at)),
        updated_at: Set(ts(q.updated_at)),
    }
}

pub(crate) fn work_order(
    model: work_orders::Model,
    items: Vec<work_order_items::Model>,
) -> AppResult<WorkOrder> {
    Ok(WorkOrder {
        id: WorkOrderId::from_uuid(model.id),
        order_number: model.order_number,
        quotation_id: model.quotation_id.map(QuotationId::from_uuid),
        customer_id: model.customer_id,
        vehicle_id: model.vehicle_id,
        branch_id: BranchId::from_uuid(model.branch_id),
        status: parse("work order status", &model.status, WorkOrderStatus::parse)?,
        priority: parse("priority", &model.priority, Priority::parse)?,
        items: collect_items(items, work_order_item)?,
        percentages: Percentages {
            discount_percent: model.discount_percent,
            tax_percent: model.tax_percent,
        },
        totals: Totals {
            subtotal: model.subtotal,
            discount_amount: model.discount_amount,
            tax_amount: model.tax_amount,
            total: model.total,
        },
        complaint: model.complaint,
        mileage_in: model.mileage_in,
        expected_completion: model.expected_completion,
        actual_completion: model.actual_completion.map(utc),
        delivered_at: model.delivered_at.map(utc),
        delivered_by: model.delivered_by.map(UserId::from_uuid),
        created_by: UserId::from_uuid(model.created_by),
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

pub(crate) fn work_order_model(wo: &WorkOrder) -> work_orders::ActiveModel {
    work_orders::ActiveModel {
        id: Set(wo.id.into_inner()),
        order_number: Set(wo.order_number.clone()),
        quotation_id: Set(wo.quotation_id.map(QuotationId::into_inner)),
        customer_id: Set(wo.customer_id),
        vehicle_id: Set(wo.vehicle_id),
        branch_id: Set(wo.branch_id.into_inner()),
        status: Set(wo.status.as_str().to_string()),
        priority: Set(wo.priority.as_str().to_string()),
        subtotal: Set(wo.totals.subtotal),
        discount_percent: Set(wo.percentages.discount_percent),
        discount_amount: Set(wo.totals.discount_amount),
        tax_percent: Set(wo.percentages.tax_percent),
        tax_amount: Set(wo.totals.tax_amount),
        total: Set(wo.totals.total),
        complaint: Set(wo.complaint.clone()),
        mileage_in: Set(wo.mileage_in),
        expected_completion: Set(wo.expected_completion),
        actual_completion: Set(wo.actual_completion.map(ts)),
        delivered_at: Set(wo.delivered_at.map(ts)),
        delivered_by: Set(wo.delivered_by.map(UserId::into_inner)),
        created_by: Set(wo.created_by.into_inner()),
        created_at: Set(ts(wo.created_at)),
        updated_at: Set(ts(wo.updated_at)),
    }
}

pub(crate) fn invoice(model: invoices::Model) -> AppResult<Invoice> {
    Ok(Invoice {
        id: InvoiceId::from_uuid(model.id),
        invoice_number: model.invoice_number,
        work_order_id: WorkOrderId::from_uuid(model.work_order_id),
        customer_id: model.customer_id,
        branch_id: BranchId::from_uuid(model.branch_id),
        status: parse("invoice status", &model.status, InvoiceStatus::parse)?,
        percentages: Percentages {
            discount_percent: model.discount_percent,
            tax_percent: model.tax_percent,
        },
        totals: Totals {
            subtotal: model.subtotal,
            discount_amount: model.discount_amount,
            tax_amount: model.tax_amount,
            total: model.total,
        },
        paid_amount: model.paid_amount,
        remaining_amount: model.remaining_amount,
        created_by: UserId::from_uuid(model.created_by),
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

pub(crate) fn invoice_model(inv: &Invoice) -> invoices::ActiveModel {
    invoices::ActiveModel {
        id: Set(inv.id.into_inner()),
        invoice_number: Set(inv.invoice_number.clone()),
        work_order_id: Set(inv.work_order_id.into_inner()),
        customer_id: Set(inv.customer_id),
        branch_id: Set(inv.branch_id.into_inner()),
        status: Set(inv.status.as_str().to_string()),
        subtotal: Set(inv.totals.subtotal),
        discount_percent: Set(inv.percentages.discount_percent),
        discount_amount: Set(inv.totals.discount_amount),
        tax_percent: Set(inv.percentages.tax_percent),
        tax_amount: Set(inv.totals.tax_amount),
        total: Set(inv.totals.total),
        paid_amount: Set(inv.paid_amount),
        remaining_amount: Set(inv.remaining_amount),
        created_by: Set(inv.created_by.into_inner()),
        created_at: Set(ts(inv.created_at)),
        updated_at: Set(ts(inv.updated_at)),
    }
}

pub(crate) fn payment(model: payments::Model) -> AppResult<Payment> {
    Ok(Payment {
        id: PaymentId::from_uuid(model.id),
        invoice_id: InvoiceId::from_uuid(model.invoice_id),
        amount: model.amount,
        method: parse("payment_method", &model.payment_method, PaymentMethod::parse)?,
        reference_number: model.reference_number,
        notes: model.notes,
        received_by: UserId::from_uuid(model.received_by),
        paid_at: utc(model.paid_at),
    })
}

pub(crate) fn payment_model(p: &Payment) -> payments::ActiveModel {
    payments::ActiveModel {
        id: Set(p.id.into_inner()),
        invoice_id: Set(p.invoice_id.into_inner()),
        amount: Set(p.amount),
        payment_method: Set(p.method.as_str().to_string()),
        reference_number: Set(p.reference_number.clone()),
        notes: Set(p.notes.clone()),
        received_by: Set(p.received_by.into_inner()),
        paid_at: Set(ts(p.paid_at)),
    }
}

// ---------------------------------------------------------------------------
// Treasury
// ---------------------------------------------------------------------------

pub(crate) fn account(model: treasury::Model) -> TreasuryAccount {
    TreasuryAccount {
        id: TreasuryId::from_uuid(model.id),
        branch_id: BranchId::from_uuid(model.branch_id),
        current_balance: model.current_balance,
        updated_at: utc(model.updated_at),
    }
}

pub(crate) fn transaction(model: treasury_transactions::Model) -> AppResult<TreasuryTransaction> {
    Ok(TreasuryTransaction {
        id: TreasuryTransactionId::from_uuid(model.id),
        treasury_id: TreasuryId::from_uuid(model.treasury_id),
        branch_id: BranchId::from_uuid(model.branch_id),
        transaction_type: parse(
            "transaction_type",
            &model.transaction_type,
            TransactionType::parse,
        )?,
        category: model.category,
        amount: model.amount,
        balance_after: model.balance_after,
        reference: reference(&model.reference_type, model.reference_id)?,
        description: model.description,
        transaction_date: model.transaction_date,
        created_by: UserId::from_uuid(model.created_by),
        created_at: utc(model.created_at),
    })
}

pub(crate) fn transaction_model(t: &TreasuryTransaction) -> treasury_transactions::ActiveModel {
    treasury_transactions::ActiveModel {
        id: Set(t.id.into_inner()),
        treasury_id: Set(t.treasury_id.into_inner()),
        branch_id: Set(t.branch_id.into_inner()),
        transaction_type: Set(t.transaction_type.as_str().to_string()),
        category: Set(t.category.clone()),
        amount: Set(t.amount),
        balance_after: Set(t.balance_after),
        reference_type: Set(t.reference.kind.as_str().to_string()),
        reference_id: Set(t.reference.id),
        description: Set(t.description.clone()),
        transaction_date: Set(t.transaction_date),
        created_by: Set(t.created_by.into_inner()),
        created_at: Set(ts(t.created_at)),
    }
}

pub(crate) fn expense_model(e: &Expense) -> expenses::ActiveModel {
    expenses::ActiveModel {
        id: Set(e.id.into_inner()),
        expense_number: Set(e.expense_number.clone()),
        branch_id: Set(e.branch_id.into_inner()),
        category: Set(e.category.clone()),
        amount: Set(e.amount),
        description: Set(e.description.clone()),
        expense_date: Set(e.expense_date),
        paid_by: Set(e.paid_by.into_inner()),
        created_at: Set(ts(e.created_at)),
    }
}

// ---------------------------------------------------------------------------
// Purchasing
// ---------------------------------------------------------------------------

pub(crate) fn purchase_order(
    model: purchase_orders::Model,
    mut items: Vec<purchase_order_items::Model>,
) -> AppResult<PurchaseOrder> {
    items.sort_by_key(|item| item.sort_order);
    Ok(PurchaseOrder {
        id: PurchaseOrderId::from_uuid(model.id),
        order_number: model.order_number,
        supplier_id: model.supplier_id,
        branch_id: BranchId::from_uuid(model.branch_id),
        status: parse("purchase status", &model.status, PurchaseStatus::parse)?,
        items: items
            .into_iter()
            .map(|item| PurchaseOrderItem {
                id: LineItemId::from_uuid(item.id),
                part_id: PartId::from_uuid(item.part_id),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total: item.total,
            })
            .collect(),
        total: model.total,
        notes: model.notes,
        expected_date: model.expected_date,
        received_at: model.received_at.map(utc),
        approved_by: model.approved_by.map(UserId::from_uuid),
        created_by: UserId::from_uuid(model.created_by),
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

pub(crate) fn purchase_order_model(po: &PurchaseOrder) -> purchase_orders::ActiveModel {
    purchase_orders::ActiveModel {
        id: Set(po.id.into_inner()),
        order_number: Set(po.order_number.clone()),
        supplier_id: Set(po.supplier_id),
        branch_id: Set(po.branch_id.into_inner()),
        status: Set(po.status.as_str().to_string()),
        total: Set(po.total),
        notes: Set(po.notes.clone()),
        expected_date: Set(po.expected_date),
        received_at: Set(po.received_at.map(ts)),
        approved_by: Set(po.approved_by.map(UserId::into_inner)),
        created_by: Set(po.created_by.into_inner()),
        created_at: Set(ts(po.created_at)),
        updated_at: Set(ts(po.updated_at)),
    }
}

pub(crate) fn purchase_item_models(po: &PurchaseOrder) -> Vec<purchase_order_items::ActiveModel> {
    po.items
        .iter()
        .zip(0..)
        .map(|(item, sort_order)| purchase_order_items::ActiveModel {
            id: Set(item.id.into_inner()),
            purchase_order_id: Set(po.id.into_inner()),
            part_id: Set(item.part_id.into_inner()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            total: Set(item.total),
            sort_order: Set(sort_order),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Registries
// ---------------------------------------------------------------------------

pub(crate) fn customer(model: customers::Model) -> AppResult<Customer> {
    Ok(Customer {
        id: CustomerId::from_uuid(model.id),
        name: model.name,
        phone: model.phone,
        email: model.email,
        customer_type: parse("customer_type", &model.customer_type, CustomerType::parse)?,
        branch_id: BranchId::from_uuid(model.branch_id),
        created_by: UserId::from_uuid(model.created_by),
        created_at: utc(model.created_at),
    })
}

pub(crate) fn customer_model(customer: &Customer) -> customers::ActiveModel {
    customers::ActiveModel {
        id: Set(customer.id.into_inner()),
        name: Set(customer.name.clone()),
        phone: Set(customer.phone.clone()),
        email: Set(customer.email.clone()),
        customer_type: Set(customer.customer_type.as_str().to_string()),
        branch_id: Set(customer.branch_id.into_inner()),
        created_by: Set(customer.created_by.into_inner()),
        created_at: Set(ts(customer.created_at)),
    }
}

pub(crate) fn vehicle(model: vehicles::Model) -> Vehicle {
    Vehicle {
        id: VehicleId::from_uuid(model.id),
        customer_id: CustomerId::from_uuid(model.customer_id),
        plate_number: model.plate_number,
        chassis_number: model.chassis_number,
        brand: model.brand,
        model: model.model,
        year: model.year,
        color: model.color,
        created_at: utc(model.created_at),
    }
}

pub(crate) fn vehicle_model(vehicle: &Vehicle) -> vehicles::ActiveModel {
    vehicles::ActiveModel {
        id: Set(vehicle.id.into_inner()),
        customer_id: Set(vehicle.customer_id.into_inner()),
        plate_number: Set(vehicle.plate_number.clone()),
        chassis_number: Set(vehicle.chassis_number.clone()),
        brand: Set(vehicle.brand.clone()),
        model: Set(vehicle.model.clone()),
        year: Set(vehicle.year),
        color: Set(vehicle.color.clone()),
        created_at: Set(ts(vehicle.created_at)),
    }
}

pub(crate) fn supplier(model: suppliers::Model) -> Supplier {
    Supplier {
        id: SupplierId::from_uuid(model.id),
        name: model.name,
        phone: model.phone,
        email: model.email,
        address: model.address,
        created_at: utc(model.created_at),
    }
}

pub(crate) fn supplier_model(supplier: &Supplier) -> suppliers::ActiveModel {
    suppliers::ActiveModel {
        id: Set(supplier.id.into_inner()),
        name: Set(supplier.name.clone()),
        phone: Set(supplier.phone.clone()),
        email: Set(supplier.email.clone()),
        address: Set(supplier.address.clone()),
        created_at: Set(ts(supplier.created_at)),
    }
}
