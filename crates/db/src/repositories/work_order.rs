//! Work orders on PostgreSQL.

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

use hivedrive_core::inventory::{IssuePartInput, StockMovement, StockService};
use hivedrive_core::lifecycle::{
    CreateWorkOrderInput, DocumentService, DocumentSort, Invoice, LifecycleError,
    UpdateDocumentInput, WorkOrder, WorkOrderEvent, WorkOrderQuery,
};
use hivedrive_core::numbering::DocumentPrefix;
use hivedrive_core::repository::WorkOrderRepository;
use hivedrive_shared::types::{PageResponse, WorkOrderId};
use hivedrive_shared::{AppError, AppResult, RequestContext};

use super::{PgStore, convert, inventory, like_pattern, order, registry, sequence};
use crate::entities::{invoices, work_order_items, work_orders};
use crate::error::{map_db_err, retry_read};

/// Inserts a work order and its items on the caller's transaction.
pub(crate) async fn insert<C: ConnectionTrait>(conn: &C, work_order: &WorkOrder) -> AppResult<()> {
    convert::work_order_model(work_order)
        .insert(conn)
        .await
        .map_err(map_db_err)?;
    insert_items(conn, work_order).await
}

async fn insert_items<C: ConnectionTrait>(conn: &C, work_order: &WorkOrder) -> AppResult<()> {
    if work_order.items.is_empty() {
        return Ok(());
    }
    let parent = work_order.id.into_inner();
    work_order_items::Entity::insert_many(
        work_order
            .items
            .iter()
            .map(|item| convert::work_order_item_model(parent, item)),
    )
    .exec_without_returning(conn)
    .await
    .map_err(map_db_err)?;
    Ok(())
}

async fn load<C: ConnectionTrait>(conn: &C, id: WorkOrderId, lock: bool) -> AppResult<WorkOrder> {
    let mut select = work_orders::Entity::find_by_id(id.into_inner());
    if lock {
        select = select.lock_exclusive();
    }
    let row = select
        .one(conn)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| AppError::not_found("WorkOrder", id))?;
    let items = row
        .find_related(work_order_items::Entity)
        .all(conn)
        .await
        .map_err(map_db_err)?;
    convert::work_order(row, items)
}

async fn items_by_parent<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<work_order_items::Model>>> {
    let mut grouped: HashMap<Uuid, Vec<work_order_items::Model>> = HashMap::new();
    if ids.is_empty() {
        return Ok(grouped);
    }
    let rows = work_order_items::Entity::find()
        .filter(work_order_items::Column::WorkOrderId.is_in(ids))
        .all(conn)
        .await
        .map_err(map_db_err)?;
    for row in rows {
        grouped.entry(row.work_order_id).or_default().push(row);
    }
    Ok(grouped)
}

impl PgStore {
    async fn query_work_orders(
        &self,
        query: &WorkOrderQuery,
    ) -> AppResult<PageResponse<WorkOrder>> {
        let filter = &query.filter;
        let mut select = work_orders::Entity::find()
            .apply_if(filter.status, |q, status| {
                q.filter(work_orders::Column::Status.eq(status.as_str()))
            })
            .apply_if(filter.priority, |q, priority| {
                q.filter(work_orders::Column::Priority.eq(priority.as_str()))
            })
            .apply_if(filter.customer_id, |q, id| {
                q.filter(work_orders::Column::CustomerId.eq(id))
            })
            .apply_if(filter.vehicle_id, |q, id| {
                q.filter(work_orders::Column::VehicleId.eq(id))
            })
            .apply_if(filter.branch_id, |q, id| {
                q.filter(work_orders::Column::BranchId.eq(id.into_inner()))
            });
        if let Some(term) = query.search_term() {
            select = select
                .filter(Expr::col(work_orders::Column::OrderNumber).ilike(like_pattern(&term)));
        }

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let column = match query.sort {
            DocumentSort::CreatedAt => work_orders::Column::CreatedAt,
            DocumentSort::Number => work_orders::Column::OrderNumber,
            DocumentSort::Total => work_orders::Column::Total,
        };
        let rows = select
            .order_by(column, order(query.direction))
            .order_by(work_orders::Column::Id, order(query.direction))
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
                convert::work_order(row, lines)
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(orders, query.page, total))
    }
}

#[async_trait]
impl WorkOrderRepository for PgStore {
    async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateWorkOrderInput,
    ) -> AppResult<WorkOrder> {
        let now = Utc::now();
        let txn = self.db.begin().await.map_err(map_db_err)?;
        registry::check_parties(&txn, input.customer_id, input.vehicle_id).await?;
        let number =
            sequence::next_number(&txn, DocumentPrefix::WorkOrder, now.date_naive()).await?;
        let work_order = DocumentService::new_work_order(
            &input,
            number,
            ctx.branch_id,
            ctx.user_id,
            self.default_tax_percent,
            now,
        )?;
        insert(&txn, &work_order).await?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            work_order_id = %work_order.id,
            number = %work_order.order_number,
            total = %work_order.totals.total,
            "work order created"
        );
        Ok(work_order)
    }

    async fn get(&self, _ctx: &RequestContext, id: WorkOrderId) -> AppResult<WorkOrder> {
        retry_read(|| load(&self.db, id, false)).await
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        query: &WorkOrderQuery,
    ) -> AppResult<PageResponse<WorkOrder>> {
        retry_read(|| self.query_work_orders(query)).await
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        id: WorkOrderId,
        input: UpdateDocumentInput,
    ) -> AppResult<WorkOrder> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let mut work_order = load(&txn, id, true).await?;
        DocumentService::update_work_order(&mut work_order, &input, Utc::now())?;

        convert::work_order_model(&work_order)
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        if input.items.is_some() {
            work_order_items::Entity::delete_many()
                .filter(work_order_items::Column::WorkOrderId.eq(id.into_inner()))
                .exec(&txn)
                .await
                .map_err(map_db_err)?;
            insert_items(&txn, &work_order).await?;
        }
        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(
            work_order_id = %id,
            total = %work_order.totals.total,
            "work order updated"
        );
        Ok(work_order)
    }

    async fn transition(
        &self,
        ctx: &RequestContext,
        id: WorkOrderId,
        event: WorkOrderEvent,
    ) -> AppResult<WorkOrder> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let mut work_order = load(&txn, id, true).await?;
        let transition =
            DocumentService::transition_work_order(
                &mut work_order,
                event,
                ctx.user_id,
                Utc::now(),
            )?;
        convert::work_order_model(&work_order)
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            work_order_id = %id,
            from = %transition.from,
            to = %transition.to,
            "work order transitioned"
        );
        Ok(work_order)
    }

    async fn create_invoice(&self, ctx: &RequestContext, id: WorkOrderId) -> AppResult<Invoice> {
        let now = Utc::now();
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let work_order = load(&txn, id, true).await?;
        let existing = invoices::Entity::find()
            .filter(invoices::Column::WorkOrderId.eq(id.into_inner()))
            .count(&txn)
            .await
            .map_err(map_db_err)?;
        if existing > 0 {
            return Err(LifecycleError::AlreadyInvoiced(id).into());
        }

        let number =
            sequence::next_number(&txn, DocumentPrefix::Invoice, now.date_naive()).await?;
        let invoice = DocumentService::build_invoice(&work_order, number, ctx.user_id, now)?;
        convert::invoice_model(&invoice)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            work_order_id = %id,
            invoice_id = %invoice.id,
            number = %invoice.invoice_number,
            total = %invoice.totals.total,
            "invoice issued"
        );
        Ok(invoice)
    }

    async fn issue_part(
        &self,
        ctx: &RequestContext,
        id: WorkOrderId,
        input: IssuePartInput,
    ) -> AppResult<StockMovement> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let work_order = load(&txn, id, true).await?;
        DocumentService::check_accepts_parts(&work_order)?;
        let adjustment = StockService::issue_for_work_order(id, work_order.branch_id, input)?;
        let movement = inventory::apply_adjustment(&txn, ctx, &adjustment).await?;
        txn.commit().await.map_err(map_db_err)?;
        Ok(movement)
    }
}
