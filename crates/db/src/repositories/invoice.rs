//! Invoices and payments on PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, TransactionTrait,
};

use hivedrive_core::lifecycle::{
    AddPaymentInput, DocumentService, DocumentSort, Invoice, InvoiceQuery, Payment,
    PaymentReceipt,
};
use hivedrive_core::repository::InvoiceRepository;
use hivedrive_shared::types::{InvoiceId, PageResponse};
use hivedrive_shared::{AppError, AppResult, RequestContext};

use super::{PgStore, convert, like_pattern, order, treasury};
use crate::entities::{invoices, payments};
use crate::error::{map_db_err, retry_read};

async fn load<C: ConnectionTrait>(conn: &C, id: InvoiceId, lock: bool) -> AppResult<Invoice> {
    let mut select = invoices::Entity::find_by_id(id.into_inner());
    if lock {
        select = select.lock_exclusive();
    }
    let row = select
        .one(conn)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| AppError::not_found("Invoice", id))?;
    convert::invoice(row)
}

impl PgStore {
    async fn query_invoices(&self, query: &InvoiceQuery) -> AppResult<PageResponse<Invoice>> {
        let filter = &query.filter;
        let mut select = invoices::Entity::find()
            .apply_if(filter.status, |q, status| {
                q.filter(invoices::Column::Status.eq(status.as_str()))
            })
            .apply_if(filter.customer_id, |q, id| {
                q.filter(invoices::Column::CustomerId.eq(id))
            })
            .apply_if(filter.work_order_id, |q, id| {
                q.filter(invoices::Column::WorkOrderId.eq(id.into_inner()))
            })
            .apply_if(filter.branch_id, |q, id| {
                q.filter(invoices::Column::BranchId.eq(id.into_inner()))
            });
        if let Some(term) = query.search_term() {
            let pattern = like_pattern(&term);
            select = select.filter(Expr::col(invoices::Column::InvoiceNumber).ilike(pattern));
        }

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let column = match query.sort {
            DocumentSort::CreatedAt => invoices::Column::CreatedAt,
            DocumentSort::Number => invoices::Column::InvoiceNumber,
            DocumentSort::Total => invoices::Column::Total,
        };
        let rows = select
            .order_by(column, order(query.direction))
            .order_by(invoices::Column::Id, order(query.direction))
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let items = rows
            .into_iter()
            .map(convert::invoice)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(items, query.page, total))
    }

    async fn find_payments(&self, id: InvoiceId) -> AppResult<Vec<Payment>> {
        load(&self.db, id, false).await?;
        payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(id.into_inner()))
            .order_by_asc(payments::Column::PaidAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(convert::payment)
            .collect()
    }
}

#[async_trait]
impl InvoiceRepository for PgStore {
    async fn get(&self, _ctx: &RequestContext, id: InvoiceId) -> AppResult<Invoice> {
        retry_read(|| load(&self.db, id, false)).await
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        query: &InvoiceQuery,
    ) -> AppResult<PageResponse<Invoice>> {
        retry_read(|| self.query_invoices(query)).await
    }

    async fn payments(&self, _ctx: &RequestContext, id: InvoiceId) -> AppResult<Vec<Payment>> {
        retry_read(|| self.find_payments(id)).await
    }

    async fn add_payment(
        &self,
        ctx: &RequestContext,
        id: InvoiceId,
        input: AddPaymentInput,
    ) -> AppResult<PaymentReceipt> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let mut invoice = load(&txn, id, true).await?;
        let payment =
            DocumentService::apply_payment(&mut invoice, &input, ctx.user_id, Utc::now())?;

        convert::payment_model(&payment)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        convert::invoice_model(&invoice)
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        let income = DocumentService::payment_income(&invoice, &payment);
        let transaction = treasury::apply_posting(&txn, ctx, &income).await?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            invoice_id = %id,
            payment_id = %payment.id,
            amount = %payment.amount,
            status = %invoice.status,
            remaining = %invoice.remaining_amount,
            "payment recorded"
        );
        Ok(PaymentReceipt {
            invoice,
            payment,
            transaction,
        })
    }
}
