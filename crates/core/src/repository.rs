//! Storage ports.
//!
//! One trait per aggregate. Every operation takes the caller's
//! [`RequestContext`] explicitly and runs as a single atomic unit: on error
//! nothing is persisted. `hivedrive-db` provides a PostgreSQL and an
//! in-memory implementation of each.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use hivedrive_shared::types::{
    BranchId, CustomerId, InvoiceId, PageResponse, PartId, PurchaseOrderId, QuotationId,
    SupplierId, VehicleId, WorkOrderId,
};
use hivedrive_shared::{AppResult, RequestContext};

use crate::inventory::{
    AdjustStockInput, CreatePartInput, InventoryRecord, IssuePartInput, LowStockItem,
    MovementQuery, Part, PartQuery, StockMovement, UpdatePartInput,
};
use crate::lifecycle::{
    AddPaymentInput, CreateQuotationInput, CreateWorkOrderInput, Invoice, InvoiceQuery, Payment,
    PaymentReceipt, Quotation, QuotationEvent, QuotationQuery, UpdateDocumentInput, WorkOrder,
    WorkOrderEvent, WorkOrderQuery,
};
use crate::purchasing::{CreatePurchaseOrderInput, PurchaseEvent, PurchaseOrder, PurchaseQuery};
use crate::registry::{
    CreateCustomerInput, CreateSupplierInput, CreateVehicleInput, Customer, CustomerQuery,
    Supplier, SupplierQuery, Vehicle, VehicleQuery,
};
use crate::treasury::{
    CreateExpenseInput, DailySummary, ExpenseReceipt, PostTransactionInput, TransactionQuery,
    TreasuryAccount, TreasuryTransaction,
};

/// Quotations and their conversion into work orders.
#[async_trait]
pub trait QuotationRepository: Send + Sync {
    /// Creates a draft quotation in the caller's branch for a registered
    /// customer and one of their vehicles.
    async fn create(&self, ctx: &RequestContext, input: CreateQuotationInput)
    -> AppResult<Quotation>;

    /// Loads a quotation with its items.
    async fn get(&self, ctx: &RequestContext, id: QuotationId) -> AppResult<Quotation>;

    /// Lists quotations.
    async fn list(
        &self,
        ctx: &RequestContext,
        query: &QuotationQuery,
    ) -> AppResult<PageResponse<Quotation>>;

    /// Replaces items and/or percentages and recomputes totals.
    async fn update(
        &self,
        ctx: &RequestContext,
        id: QuotationId,
        input: UpdateDocumentInput,
    ) -> AppResult<Quotation>;

    /// Fires a status event other than `convert`.
    async fn transition(
        &self,
        ctx: &RequestContext,
        id: QuotationId,
        event: QuotationEvent,
    ) -> AppResult<Quotation>;

    /// Deletes a non-terminal quotation that has no work order.
    async fn delete(&self, ctx: &RequestContext, id: QuotationId) -> AppResult<()>;

    /// Creates a work order from an approved quotation and marks it converted.
    async fn convert_to_work_order(
        &self,
        ctx: &RequestContext,
        id: QuotationId,
    ) -> AppResult<WorkOrder>;
}

/// Work orders, their invoice, and parts issued to them.
#[async_trait]
pub trait WorkOrderRepository: Send + Sync {
    /// Creates a pending work order in the caller's branch for a registered
    /// customer and one of their vehicles.
    async fn create(&self, ctx: &RequestContext, input: CreateWorkOrderInput)
    -> AppResult<WorkOrder>;

    /// Loads a work order with its items.
    async fn get(&self, ctx: &RequestContext, id: WorkOrderId) -> AppResult<WorkOrder>;

    /// Lists work orders.
    async fn list(
        &self,
        ctx: &RequestContext,
        query: &WorkOrderQuery,
    ) -> AppResult<PageResponse<WorkOrder>>;

    /// Replaces items and/or percentages and recomputes totals.
    async fn update(
        &self,
        ctx: &RequestContext,
        id: WorkOrderId,
        input: UpdateDocumentInput,
    ) -> AppResult<WorkOrder>;

    /// Fires a status event.
    async fn transition(
        &self,
        ctx: &RequestContext,
        id: WorkOrderId,
        event: WorkOrderEvent,
    ) -> AppResult<WorkOrder>;

    /// Issues the invoice for a completed or delivered work order.
    async fn create_invoice(&self, ctx: &RequestContext, id: WorkOrderId) -> AppResult<Invoice>;

    /// Takes parts out of the work order's branch stock.
    async fn issue_part(
        &self,
        ctx: &RequestContext,
        id: WorkOrderId,
        input: IssuePartInput,
    ) -> AppResult<StockMovement>;
}

/// Invoices and payments against them.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Loads an invoice.
    async fn get(&self, ctx: &RequestContext, id: InvoiceId) -> AppResult<Invoice>;

    /// Lists invoices.
    async fn list(
        &self,
        ctx: &RequestContext,
        query: &InvoiceQuery,
    ) -> AppResult<PageResponse<Invoice>>;

    /// Payments recorded against an invoice, oldest first.
    async fn payments(&self, ctx: &RequestContext, id: InvoiceId) -> AppResult<Vec<Payment>>;

    /// Records a payment and posts the matching treasury income.
    async fn add_payment(
        &self,
        ctx: &RequestContext,
        id: InvoiceId,
        input: AddPaymentInput,
    ) -> AppResult<PaymentReceipt>;
}

/// Part catalogue and per-branch stock.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Adds a part, booking any initial quantity into the caller's branch.
    async fn create_part(&self, ctx: &RequestContext, input: CreatePartInput) -> AppResult<Part>;

    /// Loads a part.
    async fn get_part(&self, ctx: &RequestContext, id: PartId) -> AppResult<Part>;

    /// Changes a part's catalogue fields. Stock and movements are untouched.
    async fn update_part(
        &self,
        ctx: &RequestContext,
        id: PartId,
        input: UpdatePartInput,
    ) -> AppResult<Part>;

    /// Lists parts. Search matches name, English name, and SKU.
    async fn list_parts(
        &self,
        ctx: &RequestContext,
        query: &PartQuery,
    ) -> AppResult<PageResponse<Part>>;

    /// Applies a signed stock change and appends its movement.
    async fn adjust_stock(
        &self,
        ctx: &RequestContext,
        input: AdjustStockInput,
    ) -> AppResult<StockMovement>;

    /// Current stock of a part in a branch. Zero when never stocked.
    async fn stock_level(
        &self,
        ctx: &RequestContext,
        part_id: PartId,
        branch_id: BranchId,
    ) -> AppResult<InventoryRecord>;

    /// Movement history, newest first by default.
    async fn movements(
        &self,
        ctx: &RequestContext,
        query: &MovementQuery,
    ) -> AppResult<PageResponse<StockMovement>>;

    /// Active parts at or below their threshold in a branch.
    ///
    /// `default_threshold` applies to parts without their own minimum.
    async fn low_stock(
        &self,
        ctx: &RequestContext,
        branch_id: BranchId,
        default_threshold: i32,
    ) -> AppResult<Vec<LowStockItem>>;
}

/// Branch cash ledger and expenses.
#[async_trait]
pub trait TreasuryRepository: Send + Sync {
    /// Appends a transaction and moves the branch balance.
    async fn post_transaction(
        &self,
        ctx: &RequestContext,
        input: PostTransactionInput,
    ) -> AppResult<TreasuryTransaction>;

    /// The branch account. A branch that never posted reads as zero.
    async fn balance(&self, ctx: &RequestContext, branch_id: BranchId)
    -> AppResult<TreasuryAccount>;

    /// Transaction history.
    async fn transactions(
        &self,
        ctx: &RequestContext,
        query: &TransactionQuery,
    ) -> AppResult<PageResponse<TreasuryTransaction>>;

    /// Records an expense in the caller's branch and posts it.
    async fn add_expense(
        &self,
        ctx: &RequestContext,
        input: CreateExpenseInput,
    ) -> AppResult<ExpenseReceipt>;

    /// Income, expense, and net for one branch-day.
    async fn daily_summary(
        &self,
        ctx: &RequestContext,
        branch_id: BranchId,
        date: NaiveDate,
    ) -> AppResult<DailySummary>;
}

/// Purchase orders.
#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Creates a pending purchase order in the caller's branch for a
    /// registered supplier.
    async fn create(
        &self,
        ctx: &RequestContext,
        input: CreatePurchaseOrderInput,
    ) -> AppResult<PurchaseOrder>;

    /// Loads a purchase order.
    async fn get(&self, ctx: &RequestContext, id: PurchaseOrderId) -> AppResult<PurchaseOrder>;

    /// Lists purchase orders.
    async fn list(
        &self,
        ctx: &RequestContext,
        query: &PurchaseQuery,
    ) -> AppResult<PageResponse<PurchaseOrder>>;

    /// Fires a status event. `receive` books every line into stock.
    async fn transition(
        &self,
        ctx: &RequestContext,
        id: PurchaseOrderId,
        event: PurchaseEvent,
    ) -> AppResult<PurchaseOrder>;
}

/// Customers, vehicles, and suppliers.
#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// Registers a customer in the caller's branch.
    async fn create_customer(
        &self,
        ctx: &RequestContext,
        input: CreateCustomerInput,
    ) -> AppResult<Customer>;

    /// Loads a customer.
    async fn get_customer(&self, ctx: &RequestContext, id: CustomerId) -> AppResult<Customer>;

    /// Lists customers.
    async fn list_customers(
        &self,
        ctx: &RequestContext,
        query: &CustomerQuery,
    ) -> AppResult<PageResponse<Customer>>;

    /// Registers a vehicle for an existing customer. Plates are unique.
    async fn create_vehicle(
        &self,
        ctx: &RequestContext,
        input: CreateVehicleInput,
    ) -> AppResult<Vehicle>;

    /// Loads a vehicle.
    async fn get_vehicle(&self, ctx: &RequestContext, id: VehicleId) -> AppResult<Vehicle>;

    /// Lists vehicles.
    async fn list_vehicles(
        &self,
        ctx: &RequestContext,
        query: &VehicleQuery,
    ) -> AppResult<PageResponse<Vehicle>>;

    /// Registers a supplier.
    async fn create_supplier(
        &self,
        ctx: &RequestContext,
        input: CreateSupplierInput,
    ) -> AppResult<Supplier>;

    /// Loads a supplier.
    async fn get_supplier(&self, ctx: &RequestContext, id: SupplierId) -> AppResult<Supplier>;

    /// Lists suppliers.
    async fn list_suppliers(
        &self,
        ctx: &RequestContext,
        query: &SupplierQuery,
    ) -> AppResult<PageResponse<Supplier>>;
}

/// Every repository behind one handle.
#[derive(Clone)]
pub struct Repositories {
    /// Quotations.
    pub quotations: Arc<dyn QuotationRepository>,
    /// Work orders.
    pub work_orders: Arc<dyn WorkOrderRepository>,
    /// Invoices.
    pub invoices: Arc<dyn InvoiceRepository>,
    /// Parts and stock.
    pub inventory: Arc<dyn InventoryRepository>,
    /// Treasury.
    pub treasury: Arc<dyn TreasuryRepository>,
    /// Purchase orders.
    pub purchases: Arc<dyn PurchaseRepository>,
    /// Customers, vehicles, and suppliers.
    pub registry: Arc<dyn RegistryRepository>,
}

impl Repositories {
    /// Bundles one store that implements every repository.
    #[must_use]
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: QuotationRepository
            + WorkOrderRepository
            + InvoiceRepository
            + InventoryRepository
            + TreasuryRepository
            + PurchaseRepository
            + RegistryRepository
            + 'static,
    {
        Self {
            quotations: store.clone(),
            work_orders: store.clone(),
            invoices: store.clone(),
            inventory: store.clone(),
            treasury: store.clone(),
            purchases: store.clone(),
            registry: store,
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
