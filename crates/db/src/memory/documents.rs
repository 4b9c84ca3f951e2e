//! Quotations, work orders, and invoices in memory.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use hivedrive_core::inventory::{IssuePartInput, StockMovement, StockService};
use hivedrive_core::lifecycle::{
    AddPaymentInput, CreateQuotationInput, CreateWorkOrderInput, DocumentService, DocumentSort,
    Invoice, InvoiceQuery, LifecycleError, Payment, PaymentReceipt, Quotation, QuotationEvent,
    QuotationQuery, UpdateDocumentInput, WorkOrder, WorkOrderEvent, WorkOrderQuery,
};
use hivedrive_core::numbering::DocumentPrefix;
use hivedrive_core::repository::{InvoiceRepository, QuotationRepository, WorkOrderRepository};
use hivedrive_shared::types::{InvoiceId, PageResponse, QuotationId, SortDirection, WorkOrderId};
use hivedrive_shared::{AppError, AppResult, RequestContext};

use super::tables::{Changes, Tables};
use super::{MemoryStore, document_key, matches_search, paginate, stock_key, treasury_key};

/// Sorts by the requested key, then by ID so equal keys page stably.
fn sort_documents<T>(
    items: &mut [T],
    sort: DocumentSort,
    key: impl Fn(&T) -> (&DateTime<Utc>, &str, Decimal, Uuid),
    direction: SortDirection,
) {
    items.sort_by(|a, b| {
        let (a_created, a_number, a_total, a_id) = key(a);
        let (b_created, b_number, b_total, b_id) = key(b);
        let ordering: Ordering = match sort {
            DocumentSort::CreatedAt => a_created.cmp(b_created),
            DocumentSort::Number => a_number.cmp(b_number),
            DocumentSort::Total => a_total.cmp(&b_total),
        };
        direction.apply(ordering.then_with(|| a_id.cmp(&b_id)))
    });
}

fn find_quotation(tables: &Tables, id: QuotationId) -> AppResult<Quotation> {
    tables
        .quotations
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Quotation", id))
}

fn find_work_order(tables: &Tables, id: WorkOrderId) -> AppResult<WorkOrder> {
    tables
        .work_orders
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::not_found("WorkOrder", id))
}

fn find_invoice(tables: &Tables, id: InvoiceId) -> AppResult<Invoice> {
    tables
        .invoices
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Invoice", id))
}

#[async_trait]
impl QuotationRepository for MemoryStore {
    async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateQuotationInput,
    ) -> AppResult<Quotation> {
        let now = Utc::now();
        let number = self.next_number(DocumentPrefix::Quotation, now);
        let quotation = DocumentService::new_quotation(
            &input,
            number,
            ctx.branch_id,
            ctx.user_id,
            self.default_tax_percent,
            now,
        )?;
        {
            let mut tables = self.tables.write().await;
            tables.check_parties(quotation.customer_id, quotation.vehicle_id)?;
            tables.quotations.insert(quotation.id, quotation.clone());
        }

        tracing::info!(
            quotation_id = %quotation.id,
            number = %quotation.quotation_number,
            total = %quotation.totals.total,
            "quotation created"
        );
        Ok(quotation)
    }

    async fn get(&self, _ctx: &RequestContext, id: QuotationId) -> AppResult<Quotation> {
        find_quotation(&*self.tables.read().await, id)
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        query: &QuotationQuery,
    ) -> AppResult<PageResponse<Quotation>> {
        let filter = &query.filter;
        let term = query.search_term();
        let mut items: Vec<Quotation> = self
            .tables
            .read()
            .await
            .quotations
            .values()
            .filter(|q| filter.status.is_none_or(|s| q.status == s))
            .filter(|q| filter.customer_id.is_none_or(|c| q.customer_id == c))
            .filter(|q| filter.vehicle_id.is_none_or(|v| q.vehicle_id == v))
            .filter(|q| filter.branch_id.is_none_or(|b| q.branch_id == b))
            .filter(|q| matches_search(term.as_deref(), &[Some(q.quotation_number.as_str())]))
            .cloned()
            .collect();
        sort_documents(
            &mut items,
            query.sort,
            |q| {
                (
                    &q.created_at,
                    q.quotation_number.as_str(),
                    q.totals.total,
                    q.id.into_inner(),
                )
            },
            query.direction,
        );
        Ok(paginate(&items, query.page))
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        id: QuotationId,
        input: UpdateDocumentInput,
    ) -> AppResult<Quotation> {
        let _held = self.locks.acquire([document_key("quotation", id)]).await;
        let mut quotation = find_quotation(&*self.tables.read().await, id)?;
        DocumentService::update_quotation(&mut quotation, &input, Utc::now())?;
        self.tables
            .write()
            .await
            .quotations
            .insert(id, quotation.clone());

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

        let _held = self.locks.acquire([document_key("quotation", id)]).await;
        let mut quotation = find_quotation(&*self.tables.read().await, id)?;
        let transition =
            DocumentService::transition_quotation(&mut quotation, event, ctx.user_id, Utc::now())?;
        self.tables
            .write()
            .await
            .quotations
            .insert(id, quotation.clone());

        tracing::info!(
            quotation_id = %id,
            from = %transition.from,
            to = %transition.to,
            "quotation transitioned"
        );
        Ok(quotation)
    }

    async fn delete(&self, _ctx: &RequestContext, id: QuotationId) -> AppResult<()> {
        let _held = self.locks.acquire([document_key("quotation", id)]).await;
        let mut tables = self.tables.write().await;
        let quotation = find_quotation(&tables, id)?;
        let has_work_order = tables
            .work_orders
            .values()
            .any(|wo| wo.quotation_id == Some(id));
        DocumentService::check_delete(&quotation, has_work_order)?;
        tables.quotations.remove(&id);

        tracing::info!(quotation_id = %id, "quotation deleted");
        Ok(())
    }

    async fn convert_to_work_order(
        &self,
        ctx: &RequestContext,
        id: QuotationId,
    ) -> AppResult<WorkOrder> {
        let now = Utc::now();
        let _held = self.locks.acquire([document_key("quotation", id)]).await;
        let mut quotation = find_quotation(&*self.tables.read().await, id)?;
        let number = self.next_number(DocumentPrefix::WorkOrder, now);
        let order = DocumentService::convert(&mut quotation, number, ctx.user_id, now)?;

        let mut changes = Changes::default();
        changes.quotations.push(quotation);
        changes.work_orders.push(order.clone());
        changes.apply(&mut *self.tables.write().await);

        tracing::info!(
            quotation_id = %id,
            work_order_id = %order.id,
            number = %order.order_number,
            "quotation converted"
        );
        Ok(order)
    }
}

#[async_trait]
impl WorkOrderRepository for MemoryStore {
    async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateWorkOrderInput,
    ) -> AppResult<WorkOrder> {
        let now = Utc::now();
        let number = self.next_number(DocumentPrefix::WorkOrder, now);
        let work_order = DocumentService::new_work_order(
            &input,
            number,
            ctx.branch_id,
            ctx.user_id,
            self.default_tax_percent,
            now,
        )?;
        {
            let mut tables = self.tables.write().await;
            tables.check_parties(work_order.customer_id, work_order.vehicle_id)?;
            tables.work_orders.insert(work_order.id, work_order.clone());
        }

        tracing::info!(
            work_order_id = %work_order.id,
            number = %work_order.order_number,
            total = %work_order.totals.total,
            "work order created"
        );
        Ok(work_order)
    }

    async fn get(&self, _ctx: &RequestContext, id: WorkOrderId) -> AppResult<WorkOrder> {
        find_work_order(&*self.tables.read().await, id)
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        query: &WorkOrderQuery,
    ) -> AppResult<PageResponse<WorkOrder>> {
        let filter = &query.filter;
        let term = query.search_term();
        let mut items: Vec<WorkOrder> = self
            .tables
            .read()
            .await
            .work_orders
            .values()
            .filter(|wo| filter.status.is_none_or(|s| wo.status == s))
            .filter(|wo| filter.priority.is_none_or(|p| wo.priority == p))
            .filter(|wo| filter.customer_id.is_none_or(|c| wo.customer_id == c))
            .filter(|wo| filter.vehicle_id.is_none_or(|v| wo.vehicle_id == v))
            .filter(|wo| filter.branch_id.is_none_or(|b| wo.branch_id == b))
            .filter(|wo| matches_search(term.as_deref(), &[Some(wo.order_number.as_str())]))
            .cloned()
            .collect();
        sort_documents(
            &mut items,
            query.sort,
            |wo| {
                (
                    &wo.created_at,
                    wo.order_number.as_str(),
                    wo.totals.total,
                    wo.id.into_inner(),
                )
            },
            query.direction,
        );
        Ok(paginate(&items, query.page))
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        id: WorkOrderId,
        input: UpdateDocumentInput,
    ) -> AppResult<WorkOrder> {
        let _held = self.locks.acquire([document_key("work_order", id)]).await;
        let mut work_order = find_work_order(&*self.tables.read().await, id)?;
        DocumentService::update_work_order(&mut work_order, &input, Utc::now())?;
        self.tables
            .write()
            .await
            .work_orders
            .insert(id, work_order.clone());

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
        let _held = self.locks.acquire([document_key("work_order", id)]).await;
        let mut work_order = find_work_order(&*self.tables.read().await, id)?;
        let transition =
            DocumentService::transition_work_order(
                &mut work_order,
                event,
                ctx.user_id,
                Utc::now(),
            )?;
        self.tables
            .write()
            .await
            .work_orders
            .insert(id, work_order.clone());

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
        let _held = self.locks.acquire([document_key("work_order", id)]).await;
        let work_order = {
            let tables = self.tables.read().await;
            if tables.invoices.values().any(|inv| inv.work_order_id == id) {
                return Err(LifecycleError::AlreadyInvoiced(id).into());
            }
            find_work_order(&tables, id)?
        };

        let number = self.next_number(DocumentPrefix::Invoice, now);
        let invoice = DocumentService::build_invoice(&work_order, number, ctx.user_id, now)?;
        self.tables
            .write()
            .await
            .invoices
            .insert(invoice.id, invoice.clone());

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
        let branch_id = find_work_order(&*self.tables.read().await, id)?.branch_id;
        let _held = self
            .locks
            .acquire([
                document_key("work_order", id),
                stock_key(input.part_id, branch_id),
            ])
            .await;

        let mut changes = Changes::default();
        let movement = {
            let tables = self.tables.read().await;
            let work_order = find_work_order(&tables, id)?;
            DocumentService::check_accepts_parts(&work_order)?;
            let adjustment = StockService::issue_for_work_order(id, branch_id, input)?;
            changes.adjust(&tables, ctx, &adjustment, Utc::now())?
        };
        changes.apply(&mut *self.tables.write().await);
        Ok(movement)
    }
}

#[async_trait]
impl InvoiceRepository for MemoryStore {
    async fn get(&self, _ctx: &RequestContext, id: InvoiceId) -> AppResult<Invoice> {
        find_invoice(&*self.tables.read().await, id)
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        query: &InvoiceQuery,
    ) -> AppResult<PageResponse<Invoice>> {
        let filter = &query.filter;
        let term = query.search_term();
        let mut items: Vec<Invoice> = self
            .tables
            .read()
            .await
            .invoices
            .values()
            .filter(|inv| filter.status.is_none_or(|s| inv.status == s))
            .filter(|inv| filter.customer_id.is_none_or(|c| inv.customer_id == c))
            .filter(|inv| filter.work_order_id.is_none_or(|w| inv.work_order_id == w))
            .filter(|inv| filter.branch_id.is_none_or(|b| inv.branch_id == b))
            .filter(|inv| matches_search(term.as_deref(), &[Some(inv.invoice_number.as_str())]))
            .cloned()
            .collect();
        sort_documents(
            &mut items,
            query.sort,
            |inv| {
                (
                    &inv.created_at,
                    inv.invoice_number.as_str(),
                    inv.totals.total,
                    inv.id.into_inner(),
                )
            },
            query.direction,
        );
        Ok(paginate(&items, query.page))
    }

    async fn payments(&self, _ctx: &RequestContext, id: InvoiceId) -> AppResult<Vec<Payment>> {
        let tables = self.tables.read().await;
        find_invoice(&tables, id)?;
        let mut payments: Vec<Payment> = tables
            .payments
            .iter()
            .filter(|p| p.invoice_id == id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.paid_at);
        Ok(payments)
    }

    async fn add_payment(
        &self,
        ctx: &RequestContext,
        id: InvoiceId,
        input: AddPaymentInput,
    ) -> AppResult<PaymentReceipt> {
        let branch_id = find_invoice(&*self.tables.read().await, id)?.branch_id;
        let _held = self
            .locks
            .acquire([document_key("invoice", id), treasury_key(branch_id)])
            .await;

        let now = Utc::now();
        let mut changes = Changes::default();
        let receipt = {
            let tables = self.tables.read().await;
            let mut invoice = find_invoice(&tables, id)?;
            let payment = DocumentService::apply_payment(&mut invoice, &input, ctx.user_id, now)?;
            let income = DocumentService::payment_income(&invoice, &payment);
            let transaction = changes.post(&tables, ctx, &income, now)?;
            changes.invoices.push(invoice.clone());
            changes.payments.push(payment.clone());
            PaymentReceipt {
                invoice,
                payment,
                transaction,
            }
        };
        changes.apply(&mut *self.tables.write().await);

        tracing::info!(
            invoice_id = %id,
            payment_id = %receipt.payment.id,
            amount = %receipt.payment.amount,
            status = %receipt.invoice.status,
            remaining = %receipt.invoice.remaining_amount,
            "payment recorded"
        );
        Ok(receipt)
    }
}
