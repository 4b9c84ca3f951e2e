//! Part catalogue and stock in memory.

use async_trait::async_trait;
use chrono::Utc;

use hivedrive_core::inventory::{
    AdjustStockInput, CreatePartInput, InventoryError, InventoryRecord, LowStockItem,
    MovementQuery, MovementSort, Part, PartQuery, PartSort, StockMovement, StockService,
    UpdatePartInput,
};
use hivedrive_core::repository::InventoryRepository;
use hivedrive_shared::context::STOCK_KEEPERS;
use hivedrive_shared::types::{BranchId, PageResponse, PartId};
use hivedrive_shared::{AppError, AppResult, RequestContext};

use super::tables::Changes;
use super::{MemoryStore, matches_search, paginate, stock_key};

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn create_part(&self, ctx: &RequestContext, input: CreatePartInput) -> AppResult<Part> {
        ctx.require_any(STOCK_KEEPERS)?;
        let part = StockService::new_part(&input, Utc::now())?;

        let _held = self.locks.acquire([format!("sku:{}", part.sku)]).await;
        let mut changes = Changes::default();
        {
            let tables = self.tables.read().await;
            if tables.parts.values().any(|p| p.sku == part.sku) {
                return Err(AppError::Conflict(format!(
                    "part with sku {} already exists",
                    part.sku
                )));
            }
            changes.parts.push(part.clone());
            if let Some(initial) =
                StockService::initial_stock(&part, ctx.branch_id, input.initial_quantity)
            {
                changes.adjust(&tables, ctx, &initial, Utc::now())?;
            }
        }
        changes.apply(&mut *self.tables.write().await);

        tracing::info!(part_id = %part.id, sku = %part.sku, "part created");
        Ok(part)
    }

    async fn get_part(&self, _ctx: &RequestContext, id: PartId) -> AppResult<Part> {
        self.tables
            .read()
            .await
            .parts
            .get(&id)
            .cloned()
            .ok_or_else(|| InventoryError::PartNotFound(id).into())
    }

    async fn update_part(
        &self,
        ctx: &RequestContext,
        id: PartId,
        input: UpdatePartInput,
    ) -> AppResult<Part> {
        ctx.require_any(STOCK_KEEPERS)?;

        let mut tables = self.tables.write().await;
        let current = tables
            .parts
            .get(&id)
            .ok_or(InventoryError::PartNotFound(id))?;
        let part = StockService::update_part(current, &input)?;
        tables.parts.insert(part.id, part.clone());
        drop(tables);

        tracing::info!(part_id = %part.id, is_active = part.is_active, "part updated");
        Ok(part)
    }

    async fn list_parts(
        &self,
        _ctx: &RequestContext,
        query: &PartQuery,
    ) -> AppResult<PageResponse<Part>> {
        let filter = &query.filter;
        let term = query.search_term();
        let mut items: Vec<Part> = self
            .tables
            .read()
            .await
            .parts
            .values()
            .filter(|p| filter.is_active.is_none_or(|active| p.is_active == active))
            .filter(|p| filter.supplier_id.is_none_or(|s| p.supplier_id == Some(s)))
            .filter(|p| {
                matches_search(
                    term.as_deref(),
                    &[Some(p.name.as_str()), p.name_en.as_deref(), Some(p.sku.as_str())],
                )
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let ordering = match query.sort {
                PartSort::Name => a.name.cmp(&b.name),
                PartSort::Sku => a.sku.cmp(&b.sku),
                PartSort::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            query.direction.apply(ordering.then_with(|| a.id.cmp(&b.id)))
        });
        Ok(paginate(&items, query.page))
    }

    async fn adjust_stock(
        &self,
        ctx: &RequestContext,
        input: AdjustStockInput,
    ) -> AppResult<StockMovement> {
        ctx.require_any(STOCK_KEEPERS)?;

        let _held = self
            .locks
            .acquire([stock_key(input.part_id, input.branch_id)])
            .await;
        let mut changes = Changes::default();
        let movement = changes.adjust(&*self.tables.read().await, ctx, &input, Utc::now())?;
        changes.apply(&mut *self.tables.write().await);
        Ok(movement)
    }

    async fn stock_level(
        &self,
        _ctx: &RequestContext,
        part_id: PartId,
        branch_id: BranchId,
    ) -> AppResult<InventoryRecord> {
        let tables = self.tables.read().await;
        if !tables.parts.contains_key(&part_id) {
            return Err(InventoryError::PartNotFound(part_id).into());
        }
        Ok(tables
            .stock
            .get(&(part_id, branch_id))
            .copied()
            .unwrap_or_else(|| InventoryRecord::empty(part_id, branch_id)))
    }

    async fn movements(
        &self,
        _ctx: &RequestContext,
        query: &MovementQuery,
    ) -> AppResult<PageResponse<StockMovement>> {
        let filter = &query.filter;
        let mut items: Vec<StockMovement> = self
            .tables
            .read()
            .await
            .movements
            .iter()
            .filter(|m| filter.part_id.is_none_or(|id| m.part_id == id))
            .filter(|m| filter.branch_id.is_none_or(|id| m.branch_id == id))
            .filter(|m| filter.movement_type.is_none_or(|t| m.movement_type == t))
            .filter(|m| filter.reference_id.is_none_or(|id| m.reference.id == Some(id)))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let ordering = match query.sort {
                MovementSort::CreatedAt => a.created_at.cmp(&b.created_at),
                MovementSort::Quantity => a.quantity.cmp(&b.quantity),
            };
            query.direction.apply(ordering.then_with(|| a.id.cmp(&b.id)))
        });
        Ok(paginate(&items, query.page))
    }

    async fn low_stock(
        &self,
        _ctx: &RequestContext,
        branch_id: BranchId,
        default_threshold: i32,
    ) -> AppResult<Vec<LowStockItem>> {
        let tables = self.tables.read().await;
        let mut items: Vec<LowStockItem> = tables
            .parts
            .values()
            .filter(|part| part.is_active)
            .filter_map(|part| {
                let quantity = tables
                    .stock
                    .get(&(part.id, branch_id))
                    .map_or(0, |record| record.quantity);
                StockService::is_low(part, quantity, default_threshold).then(|| LowStockItem {
                    threshold: StockService::threshold(part, default_threshold),
                    quantity,
                    part: part.clone(),
                })
            })
            .collect();
        items.sort_by(|a, b| {
            a.part
                .name
                .cmp(&b.part.name)
                .then_with(|| a.part.id.cmp(&b.part.id))
        });
        Ok(items)
    }
}
