//! Purchase orders in memory.

use async_trait::async_trait;
use chrono::Utc;

use hivedrive_core::lifecycle::SideEffect;
use hivedrive_core::numbering::DocumentPrefix;
use hivedrive_core::purchasing::{
    CreatePurchaseOrderInput, PurchaseEvent, PurchaseOrder, PurchaseQuery, PurchaseSort,
    PurchasingService,
};
use hivedrive_core::repository::PurchaseRepository;
use hivedrive_shared::types::{PageResponse, PurchaseOrderId};
use hivedrive_shared::{AppError, AppResult, RequestContext};

use super::tables::{Changes, Tables};
use super::{MemoryStore, document_key, matches_search, paginate, stock_key};

fn find_purchase(tables: &Tables, id: PurchaseOrderId) -> AppResult<PurchaseOrder> {
    tables
        .purchases
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::not_found("PurchaseOrder", id))
}

#[async_trait]
impl PurchaseRepository for MemoryStore {
    async fn create(
        &self,
        ctx: &RequestContext,
        input: CreatePurchaseOrderInput,
    ) -> AppResult<PurchaseOrder> {
        let now = Utc::now();
        let number = self.next_number(DocumentPrefix::PurchaseOrder, now);
        let purchase =
            PurchasingService::new_order(&input, number, ctx.branch_id, ctx.user_id, now)?;
        {
            let mut tables = self.tables.write().await;
            tables.check_supplier(purchase.supplier_id)?;
            tables.purchases.insert(purchase.id, purchase.clone());
        }

        tracing::info!(
            purchase_order_id = %purchase.id,
            number = %purchase.order_number,
            total = %purchase.total,
            "purchase order created"
        );
        Ok(purchase)
    }

    async fn get(&self, _ctx: &RequestContext, id: PurchaseOrderId) -> AppResult<PurchaseOrder> {
        find_purchase(&*self.tables.read().await, id)
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        query: &PurchaseQuery,
    ) -> AppResult<PageResponse<PurchaseOrder>> {
        let filter = &query.filter;
        let term = query.search_term();
        let mut items: Vec<PurchaseOrder> = self
            .tables
            .read()
            .await
            .purchases
            .values()
            .filter(|po| filter.status.is_none_or(|s| po.status == s))
            .filter(|po| filter.supplier_id.is_none_or(|s| po.supplier_id == s))
            .filter(|po| filter.branch_id.is_none_or(|b| po.branch_id == b))
            .filter(|po| matches_search(term.as_deref(), &[Some(po.order_number.as_str())]))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let ordering = match query.sort {
                PurchaseSort::CreatedAt => a.created_at.cmp(&b.created_at),
                PurchaseSort::Total => a.total.cmp(&b.total),
            };
            query.direction.apply(ordering.then_with(|| a.id.cmp(&b.id)))
        });
        Ok(paginate(&items, query.page))
    }

    async fn transition(
        &self,
        ctx: &RequestContext,
        id: PurchaseOrderId,
        event: PurchaseEvent,
    ) -> AppResult<PurchaseOrder> {
        PurchasingService::authorize(ctx, event)?;

        // Lines never change after creation, so the stock keys can be read
        // before locking.
        let current = find_purchase(&*self.tables.read().await, id)?;
        let mut keys = vec![document_key("purchase_order", id)];
        if event == PurchaseEvent::Receive {
            keys.extend(
                current
                    .items
                    .iter()
                    .map(|line| stock_key(line.part_id, current.branch_id)),
            );
        }
        let _held = self.locks.acquire(keys).await;

        let now = Utc::now();
        let mut changes = Changes::default();
        let (purchase, transition) = {
            let tables = self.tables.read().await;
            let mut purchase = find_purchase(&tables, id)?;
            let transition = PurchasingService::transition(&mut purchase, event, ctx.user_id, now)?;
            if transition.has(SideEffect::ReceiveStock) {
                for adjustment in PurchasingService::receipt_adjustments(&purchase) {
                    changes.adjust(&tables, ctx, &adjustment, now)?;
                }
            }
            changes.purchases.push(purchase.clone());
            (purchase, transition)
        };
        changes.apply(&mut *self.tables.write().await);

        tracing::info!(
            purchase_order_id = %id,
            from = %transition.from,
            to = %transition.to,
            "purchase order transitioned"
        );
        Ok(purchase)
    }
}
