//! Part catalogue and per-branch stock on PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};

use hivedrive_core::inventory::{
    AdjustStockInput, CreatePartInput, InventoryError, InventoryRecord, LowStockItem,
    MovementQuery, MovementSort, Part, PartQuery, PartSort, StockMovement, StockService,
    UpdatePartInput,
};
use hivedrive_core::repository::InventoryRepository;
use hivedrive_shared::context::STOCK_KEEPERS;
use hivedrive_shared::types::{BranchId, PageResponse, PartId};
use hivedrive_shared::{AppError, AppResult, RequestContext};

use super::{PgStore, convert, like_pattern, order};
use crate::entities::{inventory, parts, stock_movements};
use crate::error::{map_db_err, retry_read};

/// Applies one stock adjustment on the caller's transaction.
///
/// Locks the `(part, branch)` row, creating it at zero first if needed.
pub(crate) async fn apply_adjustment<C: ConnectionTrait>(
    txn: &C,
    ctx: &RequestContext,
    input: &AdjustStockInput,
) -> AppResult<StockMovement> {
    StockService::validate_adjustment(input)?;

    let part = parts::Entity::find_by_id(input.part_id.into_inner())
        .one(txn)
        .await
        .map_err(map_db_err)?
        .ok_or(InventoryError::PartNotFound(input.part_id))?;

    inventory::Entity::insert(inventory::ActiveModel {
        part_id: Set(input.part_id.into_inner()),
        branch_id: Set(input.branch_id.into_inner()),
        quantity: Set(0),
        reserved_quantity: Set(0),
        updated_at: Set(None),
    })
    .on_conflict(
        OnConflict::columns([inventory::Column::PartId, inventory::Column::BranchId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(txn)
    .await
    .map_err(map_db_err)?;

    let key = (input.part_id.into_inner(), input.branch_id.into_inner());
    let row = inventory::Entity::find_by_id(key)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| AppError::Internal("inventory row vanished after upsert".to_string()))?;

    let now = Utc::now();
    let (record, movement) = StockService::plan(
        convert::inventory_record(row.clone()),
        input,
        part.cost_price,
        ctx.user_id,
        now,
    )?;

    let mut active: inventory::ActiveModel = row.into();
    active.quantity = Set(record.quantity);
    active.updated_at = Set(Some(convert::ts(now)));
    active.update(txn).await.map_err(map_db_err)?;

    convert::movement_model(&movement)
        .insert(txn)
        .await
        .map_err(map_db_err)?;

    tracing::info!(
        part_id = %input.part_id,
        branch_id = %input.branch_id,
        delta = input.delta,
        quantity = record.quantity,
        movement_type = %input.movement_type,
        "stock adjusted"
    );

    Ok(movement)
}

impl PgStore {
    async fn find_part(&self, id: PartId) -> AppResult<Part> {
        parts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(convert::part)
            .ok_or_else(|| InventoryError::PartNotFound(id).into())
    }

    async fn query_parts(&self, query: &PartQuery) -> AppResult<PageResponse<Part>> {
        let filter = &query.filter;
        let mut select = parts::Entity::find()
            .apply_if(filter.is_active, |q, active| {
                q.filter(parts::Column::IsActive.eq(active))
            })
            .apply_if(filter.supplier_id, |q, supplier| {
                q.filter(parts::Column::SupplierId.eq(supplier))
            });

        if let Some(term) = query.search_term() {
            let pattern = like_pattern(&term);
            select = select.filter(
                Condition::any()
                    .add(Expr::col(parts::Column::Name).ilike(&pattern))
                    .add(Expr::col(parts::Column::NameEn).ilike(&pattern))
                    .add(Expr::col(parts::Column::Sku).ilike(&pattern)),
            );
        }

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let column = match query.sort {
            PartSort::Name => parts::Column::Name,
            PartSort::Sku => parts::Column::Sku,
            PartSort::CreatedAt => parts::Column::CreatedAt,
        };
        let rows = select
            .order_by(column, order(query.direction))
            .order_by(parts::Column::Id, order(query.direction))
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(PageResponse::new(
            rows.into_iter().map(convert::part).collect(),
            query.page,
            total,
        ))
    }

    async fn find_stock(&self, part_id: PartId, branch_id: BranchId) -> AppResult<InventoryRecord> {
        self.find_part(part_id).await?;
        let row = inventory::Entity::find_by_id((part_id.into_inner(), branch_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(row.map_or_else(
            || InventoryRecord::empty(part_id, branch_id),
            convert::inventory_record,
        ))
    }

    async fn query_movements(
        &self,
        query: &MovementQuery,
    ) -> AppResult<PageResponse<StockMovement>> {
        let filter = &query.filter;
        let select = stock_movements::Entity::find()
            .apply_if(filter.part_id, |q, id| {
                q.filter(stock_movements::Column::PartId.eq(id.into_inner()))
            })
            .apply_if(filter.branch_id, |q, id| {
                q.filter(stock_movements::Column::BranchId.eq(id.into_inner()))
            })
            .apply_if(filter.movement_type, |q, t| {
                q.filter(stock_movements::Column::MovementType.eq(t.as_str()))
            })
            .apply_if(filter.reference_id, |q, id| {
                q.filter(stock_movements::Column::ReferenceId.eq(id))
            });

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let column = match query.sort {
            MovementSort::CreatedAt => stock_movements::Column::CreatedAt,
            MovementSort::Quantity => stock_movements::Column::Quantity,
        };
        let rows = select
            .order_by(column, order(query.direction))
            .order_by(stock_movements::Column::Id, order(query.direction))
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let items = rows
            .into_iter()
            .map(convert::movement)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(items, query.page, total))
    }

    async fn query_low_stock(
        &self,
        branch_id: BranchId,
        default_threshold: i32,
    ) -> AppResult<Vec<LowStockItem>> {
        let active = parts::Entity::find()
            .filter(parts::Column::IsActive.eq(true))
            .order_by_asc(parts::Column::Name)
            .order_by_asc(parts::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        let stock: HashMap<_, _> = inventory::Entity::find()
            .filter(inventory::Column::BranchId.eq(branch_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|row| (row.part_id, row.quantity))
            .collect();

        Ok(active
            .into_iter()
            .map(convert::part)
            .filter_map(|part| {
                let quantity = stock.get(&part.id.into_inner()).copied().unwrap_or(0);
                StockService::is_low(&part, quantity, default_threshold).then(|| LowStockItem {
                    threshold: StockService::threshold(&part, default_threshold),
                    quantity,
                    part,
                })
            })
            .collect())
    }
}

#[async_trait]
impl InventoryRepository for PgStore {
    async fn create_part(&self, ctx: &RequestContext, input: CreatePartInput) -> AppResult<Part> {
        ctx.require_any(STOCK_KEEPERS)?;
        let part = StockService::new_part(&input, Utc::now())?;

        let txn = self.db.begin().await.map_err(map_db_err)?;
        convert::part_model(&part)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        let opening = StockService::initial_stock(&part, ctx.branch_id, input.initial_quantity);
        if let Some(initial) = opening {
            apply_adjustment(&txn, ctx, &initial).await?;
        }
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(part_id = %part.id, sku = %part.sku, "part created");
        Ok(part)
    }

    async fn get_part(&self, _ctx: &RequestContext, id: PartId) -> AppResult<Part> {
        retry_read(|| self.find_part(id)).await
    }

    async fn update_part(
        &self,
        ctx: &RequestContext,
        id: PartId,
        input: UpdatePartInput,
    ) -> AppResult<Part> {
        ctx.require_any(STOCK_KEEPERS)?;

        let txn = self.db.begin().await.map_err(map_db_err)?;
        let row = parts::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(InventoryError::PartNotFound(id))?;
        let part = StockService::update_part(&convert::part(row), &input)?;
        convert::part_model(&part)
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(part_id = %part.id, is_active = part.is_active, "part updated");
        Ok(part)
    }

    async fn list_parts(
        &self,
        _ctx: &RequestContext,
        query: &PartQuery,
    ) -> AppResult<PageResponse<Part>> {
        retry_read(|| self.query_parts(query)).await
    }

    async fn adjust_stock(
        &self,
        ctx: &RequestContext,
        input: AdjustStockInput,
    ) -> AppResult<StockMovement> {
        ctx.require_any(STOCK_KEEPERS)?;

        let txn = self.db.begin().await.map_err(map_db_err)?;
        let movement = apply_adjustment(&txn, ctx, &input).await?;
        txn.commit().await.map_err(map_db_err)?;
        Ok(movement)
    }

    async fn stock_level(
        &self,
        _ctx: &RequestContext,
        part_id: PartId,
        branch_id: BranchId,
    ) -> AppResult<InventoryRecord> {
        retry_read(|| self.find_stock(part_id, branch_id)).await
    }

    async fn movements(
        &self,
        _ctx: &RequestContext,
        query: &MovementQuery,
    ) -> AppResult<PageResponse<StockMovement>> {
        retry_read(|| self.query_movements(query)).await
    }

    async fn low_stock(
        &self,
        _ctx: &RequestContext,
        branch_id: BranchId,
        default_threshold: i32,
    ) -> AppResult<Vec<LowStockItem>> {
        retry_read(|| self.query_low_stock(branch_id, default_threshold)).await
    }
}
