//! Purchase orders on PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, TransactionTrait,
};
use uuid::Uuid;

use hivedrive_core::lifecycle::SideEffect;
use hivedrive_core::numbering::DocumentPrefix;
use hivedrive_core::purchasing::{
    CreatePurchaseOrderInput, PurchaseEvent, PurchaseOrder, PurchaseQuery, PurchaseSort,
    PurchasingService,
};
use hivedrive_core::repository::PurchaseRepository;
use hivedrive_shared::types::{PageResponse, PurchaseOrderId};
use hivedrive_shared::{AppError, AppResult, RequestContext};

use super::{PgStore, convert, inventory, like_pattern, order, registry, sequence};
use crate::entities::{purchase_order_items, purchase_orders};
use crate::error::{map_db_err, retry_read};

async fn load<C: ConnectionTrait>(
    conn: &C,
    id: PurchaseOrderId,
    lock: bool,
) -> AppResult<PurchaseOrder> {
    let mut select = purchase_orders::Entity::find_by_id(id.into_inner());
    if lock {
        select = select.lock_exclusive();
    }
    let row = select
        .one(conn)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| AppError::not_found("PurchaseOrder", id))?;
    let items = row
        .find_related(purchase_order_items::Entity)
        .all(conn)
        .await
        .map_err(map_db_err)?;
    convert::purchase_order(row, items)
}

async fn items_by_parent<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<purchase_order_items::Model>>> {
    let mut grouped: HashMap<Uuid, Vec<purchase_order_items::Model>> = HashMap::new();
    if ids.is_empty() {
        return Ok(grouped);
    }
    let rows = purchase_order_items::Entity::find()
        .filter(purchase_order_items::Column::PurchaseOrderId.is_in(ids))
        .all(conn)
        .await
        .map_err(map_db_err)?;
    for row in rows {
        grouped.entry(row.purchase_order_id).or_default().push(row);
    }
    Ok(grouped)
}

impl PgStore {
    async fn query_purchases(
        &self,
        query: &PurchaseQuery,
    ) -> AppResult<PageResponse<PurchaseOrder>> {
        let filter = &query.filter;
        let mut select = purchase_orders::Entity::find()
            .apply_if(filter.status, |q, status| {
                q.filter(purchase_orders::Column::Status.eq(status.as_str()))
            })
            .apply_if(filter.supplier_id, |q, id| {
                q.filter(purchase_orders::Column::SupplierId.eq(id))
            })
            .apply_if(filter.branch_id, |q, id| {
                q.filter(purchase_orders::Column::BranchId.eq(id.into_inner()))
            });
        if let Some(term) = query.search_term() {
            select = select
                .filter(Expr::col(purchase_orders::Column::OrderNumber).ilike(like_pattern(&term)));
        }

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let column = match query.sort {
            PurchaseSort::CreatedAt => purchase_orders::Column::CreatedAt,
            PurchaseSort::Total => purchase_orders::Column::Total,
        };
        let rows = select
            .order_by(column, order(query.direction))
            .order_by(purchase_orders::Column::Id, order(query.direction))
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut items = items_by_parent(&self.db, rows.iter().map(|r| r.id).collect()).await?;
        let orders = rows
            .into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                convert::purchase_order(row, lines)
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(orders, query.page, total))
    }
}

#[async_trait]
impl PurchaseRepository for PgStore {
    async fn create(
        &self,
        ctx: &RequestContext,
        input: CreatePurchaseOrderInput,
    ) -> AppResult<PurchaseOrder> {
        let now = Utc::now();
        let txn = self.db.begin().await.map_err(map_db_err)?;
        registry::check_supplier(&txn, input.supplier_id).await?;
        let number =
            sequence::next_number(&txn, DocumentPrefix::PurchaseOrder, now.date_naive()).await?;
        let purchase =
            PurchasingService::new_order(&input, number, ctx.branch_id, ctx.user_id, now)?;

        convert::purchase_order_model(&purchase)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        purchase_order_items::Entity::insert_many(convert::purchase_item_models(&purchase))
            .exec_without_returning(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            purchase_order_id = %purchase.id,
            number = %purchase.order_number,
            total = %purchase.total,
            "purchase order created"
        );
        Ok(purchase)
    }

    async fn get(&self, _ctx: &RequestContext, id: PurchaseOrderId) -> AppResult<PurchaseOrder> {
        retry_read(|| load(&self.db, id, false)).await
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        query: &PurchaseQuery,
    ) -> AppResult<PageResponse<PurchaseOrder>> {
        retry_read(|| self.query_purchases(query)).await
    }

    async fn transition(
        &self,
        ctx: &RequestContext,
        id: PurchaseOrderId,
        event: PurchaseEvent,
    ) -> AppResult<PurchaseOrder> {
        PurchasingService::authorize(ctx, event)?;

        let txn = self.db.begin().await.map_err(map_db_err)?;
        let mut purchase = load(&txn, id, true).await?;
        let transition =
            PurchasingService::transition(&mut purchase, event, ctx.user_id, Utc::now())?;
        convert::purchase_order_model(&purchase)
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        if transition.has(SideEffect::ReceiveStock) {
            for adjustment in PurchasingService::receipt_adjustments(&purchase) {
                inventory::apply_adjustment(&txn, ctx, &adjustment).await?;
            }
        }
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            purchase_order_id = %id,
            from = %transition.from,
            to = %transition.to,
            "purchase order transitioned"
        );
        Ok(purchase)
    }
}
