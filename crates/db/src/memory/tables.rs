//! Table storage and staged writes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use hivedrive_core::inventory::{
    AdjustStockInput, InventoryError, InventoryRecord, Part, StockMovement, StockService,
};
use hivedrive_core::lifecycle::{Invoice, Payment, Quotation, WorkOrder};
use hivedrive_core::purchasing::PurchaseOrder;
use hivedrive_core::registry::{Customer, RegistryService, Supplier, Vehicle};
use hivedrive_core::treasury::{
    Expense, PostTransactionInput, TreasuryAccount, TreasuryService, TreasuryTransaction,
};
use hivedrive_shared::types::{
    BranchId, CustomerId, InvoiceId, PartId, PurchaseOrderId, QuotationId, SupplierId, VehicleId,
    WorkOrderId,
};
use hivedrive_shared::{AppResult, RequestContext};

/// Every table of the store.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub quotations: HashMap<QuotationId, Quotation>,
    pub work_orders: HashMap<WorkOrderId, WorkOrder>,
    pub invoices: HashMap<InvoiceId, Invoice>,
    pub payments: Vec<Payment>,
    pub parts: HashMap<PartId, Part>,
    pub stock: HashMap<(PartId, BranchId), InventoryRecord>,
    pub movements: Vec<StockMovement>,
    pub accounts: HashMap<BranchId, TreasuryAccount>,
    pub transactions: Vec<TreasuryTransaction>,
    pub expenses: Vec<Expense>,
    pub purchases: HashMap<PurchaseOrderId, PurchaseOrder>,
    pub customers: HashMap<CustomerId, Customer>,
    pub vehicles: HashMap<VehicleId, Vehicle>,
    pub suppliers: HashMap<SupplierId, Supplier>,
}

impl Tables {
    /// Checks a document's customer and vehicle exist and belong together.
    pub(crate) fn check_parties(&self, customer_id: Uuid, vehicle_id: Uuid) -> AppResult<()> {
        RegistryService::check_parties(
            customer_id,
            vehicle_id,
            self.customers.get(&CustomerId::from_uuid(customer_id)),
            self.vehicles.get(&VehicleId::from_uuid(vehicle_id)),
        )?;
        Ok(())
    }

    /// Checks a purchase order's supplier exists.
    pub(crate) fn check_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        RegistryService::check_supplier(
            supplier_id,
            self.suppliers.get(&SupplierId::from_uuid(supplier_id)),
        )?;
        Ok(())
    }
}

/// Writes of one operation, computed against a read view and applied in one
/// write section.
///
/// Stock and treasury changes read earlier staged values, so an operation
/// may adjust the same record twice.
#[derive(Debug, Default)]
pub(crate) struct Changes {
    pub quotations: Vec<Quotation>,
    pub work_orders: Vec<WorkOrder>,
    pub invoices: Vec<Invoice>,
    pub payments: Vec<Payment>,
    pub parts: Vec<Part>,
    pub expenses: Vec<Expense>,
    pub purchases: Vec<PurchaseOrder>,
    stock: HashMap<(PartId, BranchId), InventoryRecord>,
    movements: Vec<StockMovement>,
    accounts: HashMap<BranchId, TreasuryAccount>,
    transactions: Vec<TreasuryTransaction>,
}

impl Changes {
    /// Stages one stock adjustment.
    pub(crate) fn adjust(
        &mut self,
        tables: &Tables,
        ctx: &RequestContext,
        input: &AdjustStockInput,
        now: DateTime<Utc>,
    ) -> AppResult<StockMovement> {
        StockService::validate_adjustment(input)?;

        let unit_cost = self
            .parts
            .iter()
            .find(|p| p.id == input.part_id)
            .or_else(|| tables.parts.get(&input.part_id))
            .map(|p| p.cost_price)
            .ok_or(InventoryError::PartNotFound(input.part_id))?;

        let key = (input.part_id, input.branch_id);
        let current = self
            .stock
            .get(&key)
            .or_else(|| tables.stock.get(&key))
            .copied()
            .unwrap_or_else(|| InventoryRecord::empty(input.part_id, input.branch_id));

        let (record, movement) = StockService::plan(current, input, unit_cost, ctx.user_id, now)?;
        self.stock.insert(key, record);
        self.movements.push(movement.clone());
        Ok(movement)
    }

    /// Stages one treasury posting.
    pub(crate) fn post(
        &mut self,
        tables: &Tables,
        ctx: &RequestContext,
        input: &PostTransactionInput,
        now: DateTime<Utc>,
    ) -> AppResult<TreasuryTransaction> {
        let current = self
            .accounts
            .get(&input.branch_id)
            .or_else(|| tables.accounts.get(&input.branch_id))
            .copied()
            .unwrap_or_else(|| TreasuryAccount::open(input.branch_id, now));

        let (account, transaction) = TreasuryService::post(current, input, ctx.user_id, now)?;
        self.accounts.insert(input.branch_id, account);
        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// Writes everything staged, then logs the stock and treasury changes
    /// that were committed.
    pub(crate) fn apply(self, tables: &mut Tables) {
        for q in self.quotations {
            tables.quotations.insert(q.id, q);
        }
        for wo in self.work_orders {
            tables.work_orders.insert(wo.id, wo);
        }
        for inv in self.invoices {
            tables.invoices.insert(inv.id, inv);
        }
        for part in self.parts {
            tables.parts.insert(part.id, part);
        }
        for po in self.purchases {
            tables.purchases.insert(po.id, po);
        }
        tables.payments.extend(self.payments);
        tables.expenses.extend(self.expenses);
        tables.stock.extend(self.stock);
        tables.accounts.extend(self.accounts);

        for movement in &self.movements {
            tracing::info!(
                part_id = %movement.part_id,
                branch_id = %movement.branch_id,
                delta = movement.signed_quantity(),
                movement_type = %movement.movement_type,
                "stock adjusted"
            );
        }
        for transaction in &self.transactions {
            tracing::info!(
                branch_id = %transaction.branch_id,
                transaction_type = %transaction.transaction_type,
                category = %transaction.category,
                amount = %transaction.amount,
                balance_after = %transaction.balance_after,
                "treasury posting"
            );
        }
        tables.movements.extend(self.movements);
        tables.transactions.extend(self.transactions);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rust_decimal_macros::dec;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    use hivedrive_core::inventory::MovementType;
    use hivedrive_core::treasury::TransactionType;
    use hivedrive_shared::types::{Reference, UserId};
    use hivedrive_shared::{Locale, Role};

    use super::*;

    /// Collects the message of every event.
    #[derive(Clone, Default)]
    struct Messages(Arc<Mutex<Vec<String>>>);

    impl Messages {
        fn count(&self, message: &str) -> usize {
            self.0.lock().unwrap().iter().filter(|m| *m == message).count()
        }
    }

    struct MessageVisitor<'a>(&'a mut String);

    impl Visit for MessageVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                *self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for Messages {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut message = String::new();
            event.record(&mut MessageVisitor(&mut message));
            self.0.lock().unwrap().push(message);
        }
    }

    fn stage(tables: &Tables, part_id: PartId, branch_id: BranchId) -> Changes {
        let ctx = RequestContext::new(UserId::new(), branch_id, Role::Manager, Locale::En);
        let now = Utc::now();
        let mut changes = Changes::default();
        changes
            .adjust(
                tables,
                &ctx,
                &AdjustStockInput {
                    part_id,
                    branch_id,
                    delta: 3,
                    movement_type: MovementType::AdjustmentIn,
                    reference: Reference::manual(),
                    notes: None,
                },
                now,
            )
            .unwrap();
        changes
            .post(
                tables,
                &ctx,
                &PostTransactionInput {
                    branch_id,
                    transaction_type: TransactionType::Income,
                    category: "other".to_string(),
                    amount: dec!(25),
                    reference: Reference::manual(),
                    description: None,
                    transaction_date: None,
                },
                now,
            )
            .unwrap();
        changes
    }

    #[test]
    fn staged_changes_log_only_when_applied() {
        let messages = Messages::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(messages.clone()));

        let mut tables = Tables::default();
        let part = Part {
            id: PartId::new(),
            sku: "LOG-1".to_string(),
            name: "Spark plug".to_string(),
            name_en: None,
            cost_price: dec!(12),
            sell_price: dec!(20),
            min_quantity: 0,
            supplier_id: None,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.parts.insert(part.id, part.clone());
        let branch_id = BranchId::new();

        drop(stage(&tables, part.id, branch_id));
        assert_eq!(messages.count("stock adjusted"), 0);
        assert_eq!(messages.count("treasury posting"), 0);
        assert!(tables.movements.is_empty());

        stage(&tables, part.id, branch_id).apply(&mut tables);
        assert_eq!(messages.count("stock adjusted"), 1);
        assert_eq!(messages.count("treasury posting"), 1);
        assert_eq!(tables.stock[&(part.id, branch_id)].quantity, 3);
    }
}
