//! Quotations on PostgreSQL.

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

use hivedrive_core::lifecycle::{
    CreateQuotationInput, DocumentService, DocumentSort, Quotation, QuotationEvent,
    QuotationQuery, UpdateDocumentInput, WorkOrder,
};
use hivedrive_core::numbering::DocumentPrefix;
use hivedrive_core::repository::QuotationRepository;
use hivedrive_shared::types::{PageResponse, QuotationId};
use hivedrive_shared::{AppError, AppResult, RequestContext};

use super::{PgStore, convert, like_pattern, order, registry, sequence, work_order};
use crate::entities::{quotation_items, quotations, work_orders};
use crate::error::{map_db_err, retry_read};

async fn find_row<C: ConnectionTrait>(
    conn: &C,
    id: QuotationId,
    lock: bool,
) -> AppResult<quotations::Model> {
    let mut select = quotations::Entity::find_by_id(id.into_inner());
    if lock {
        select = select.lock_exclusive();
    }
    select
        .one(conn)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| AppError::not_found("Quotation", id))
}

async fn load<C: ConnectionTrait>(conn: &C, id: QuotationId, lock: bool) -> AppResult<Quotation> {
    let row = find_row(conn, id, lock).await?;
    let items = row
        .find_related(quotation_items::Entity)
        .all(conn)
        .await
        .map_err(map_db_err)?;
    convert::quotation(row, items)
}

async fn items_by_parent<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<quotation_items::Model>>> {
    let mut grouped: HashMap<Uuid, Vec<quotation_items::Model>> = HashMap::new();
    if ids.is_empty() {
        return Ok(grouped);
    }
    let rows = quotation_items::Entity::find()
        .filter(quotation_items::Column::QuotationId.is_in(ids))
        .all(conn)
        .await
        .map_err(map_db_err)?;
    for row in rows {
        grouped.entry(row.quotation_id).or_default().push(row);
    }
    Ok(grouped)
}

async fn insert_items<C: ConnectionTrait>(conn: &C, quotation: &Quotation) -> AppResult<()> {
    if quotation.items.is_empty() {
        return Ok(());
    }
    let parent = quotation.id.into_inner();
    quotation_items::Entity::insert_many(
        quotation
            .items
            .iter()
            .map(|item| convert::quotation_item_model(parent, item)),
    )
    .exec_without_returning(conn)
    .await
    .map_err(map_db_err)?;
    Ok(())
}

impl PgStore {
    async fn query_quotations(&self, query: &QuotationQuery) -> AppResult<PageResponse<Quotation>> {
        let filter = &query.filter;
        let mut select = quotations::Entity::find()
            .apply_if(filter.status, |q, status| {
                q.filter(quotations::Column::Status.eq(status.as_str()))
            })
            .apply_if(filter.customer_id, |q, id| {
                q.filter(quotations::Column::CustomerId.eq(id))
            })
            .apply_if(filter.vehicle_id, |q, id| {
                q.filter(quotations::Column::VehicleId.eq(id))
            })
            .apply_if(filter.branch_id, |q, id| {
                q.filter(quotations::Column::BranchId.eq(id.into_inner()))
            });
        if let Some(term) = query.search_term() {
            select = select.filter(
                Expr::col(quotations::Column::QuotationNumber).ilike(like_pattern(&term)),
            );
        }

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let column = match query.sort {
            DocumentSort::CreatedAt => quotations::Column::CreatedAt,
            DocumentSort::Number => quotations::Column::QuotationNumber,
            DocumentSort::Total => quotations::Column::Total,
        };
        let rows = select
            .order_by(column, order(query.direction))
            .order_by(quotations::Column::Id, order(query.direction))
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut items = items_by_parent(&self.db, rows.iter().map(|r| r.id).collect()).await?;
        let quotations = rows
            .into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                convert::quotation(row, lines)
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(quotations, query.page, total))
    }
}

#[async_trait]
impl QuotationRepository for PgStore {
    async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateQuotationInput,
    ) -> AppResult<Quotation> {
        let now = Utc::now();
        let txn = self.db.begin().await.map_err(map_db_err)?;
        registry::check_parties(&txn, input.customer_id, input.vehicle_id).await?;
        let number =
            sequence::next_number(&txn, DocumentPrefix::Quotation, now.date_naive()).await?;
        let quotation = DocumentService::new_quotation(
            &input,
            number,
            ctx.branch_id,
            ctx.user_id,
            self.default_tax_percent,
            now,
        )?;
        convert::quotation_model(&quotation)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        insert_items(&txn, &quotation).await?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            quotation_id = %quotation.id,
            number = %quotation.quotation_number,
            total = %quotation.totals.total,
            "quotation created"
        );
        Ok(quotation)
    }

    async fn get(&self, _ctx: &RequestContext, id: QuotationId) -> AppResult<Quotation> {
        retry_read(|| load(&self.db, id, false)).await
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        query: &QuotationQuery,
    ) -> AppResult<PageResponse<Quotation>> {
        retry_read(|| self.query_quotations(query)).await
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        id: QuotationId,
        input: UpdateDocumentInput,
    ) -> AppResult<Quotation> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let mut quotation = load(&txn, id, true).await?;
        DocumentService::update_quotation(&mut quotation, &input, Utc::now())?;

        convert::quotation_model(&quotation)
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        if input.items.is_some() {
            quotation_items::Entity::delete_many()
                .filter(quotation_items::Column::QuotationId.eq(id.into_inner()))
                .exec(&txn)
                .await
                .map_err(map_db_err)?;
            insert_items(&txn, &quotation).await?;
        }
        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(quotation_id = %id, total = %quotation.totals.total, "quotation updated");
        Ok(quotation)
    }

    async fn transition(
        &self,
        ctx: &RequestContext,
        id: QuotationId,
        event: QuotationEvent,
    ) -> AppResult<Quotation> {
        DocumentService::authorize_quotation_event(ctx, event)?;

        let txn = self.db.begin().await.map_err(map_db_err)?;
        let mut quotation = load(&txn, id, true).await?;
        let transition =
            DocumentService::transition_quotation(&mut quotation, event, ctx.user_id, Utc::now())?;
        convert::quotation_model(&quotation)
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            quotation_id = %id,
            from = %transition.from,
            to = %transition.to,
            "quotation transitioned"
        );
        Ok(quotation)
    }

    async fn delete(&self, _ctx: &RequestContext, id: QuotationId) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let quotation = load(&txn, id, true).await?;
        let dependents = work_orders::Entity::find()
            .filter(work_orders::Column::QuotationId.eq(id.into_inner()))
            .count(&txn)
            .await
            .map_err(map_db_err)?;
        DocumentService::check_delete(&quotation, dependents > 0)?;

        quotations::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(quotation_id = %id, "quotation deleted");
        Ok(())
    }

    async fn convert_to_work_order(
        &self,
        ctx: &RequestContext,
        id: QuotationId,
    ) -> AppResult<WorkOrder> {
        let now = Utc::now();
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let mut quotation = load(&txn, id, true).await?;
        let number =
            sequence::next_number(&txn, DocumentPrefix::WorkOrder, now.date_naive()).await?;
        let order = DocumentService::convert(&mut quotation, number, ctx.user_id, now)?;

        work_order::insert(&txn, &order).await?;
        convert::quotation_model(&quotation)
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            quotation_id = %id,
            work_order_id = %order.id,
            number = %order.order_number,
            "quotation converted"
        );
        Ok(order)
    }
}
