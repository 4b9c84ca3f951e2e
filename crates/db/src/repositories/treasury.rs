//! Branch treasury on PostgreSQL.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};

use hivedrive_core::numbering::DocumentPrefix;
use hivedrive_core::repository::TreasuryRepository;
use hivedrive_core::treasury::{
    CreateExpenseInput, DailySummary, ExpenseReceipt, PostTransactionInput, TransactionQuery,
    TransactionSort, TreasuryAccount, TreasuryService, TreasuryTransaction,
};
use hivedrive_shared::context::TREASURY_STAFF;
use hivedrive_shared::types::{BranchId, PageResponse};
use hivedrive_shared::{AppError, AppResult, RequestContext};

use super::{PgStore, convert, order, sequence};
use crate::entities::{treasury, treasury_transactions};
use crate::error::{map_db_err, retry_read};

/// Posts one transaction on the caller's transaction.
///
/// Locks the branch account, opening it at zero first if needed.
pub(crate) async fn apply_posting<C: ConnectionTrait>(
    txn: &C,
    ctx: &RequestContext,
    input: &PostTransactionInput,
) -> AppResult<TreasuryTransaction> {
    TreasuryService::validate(input)?;

    let now = Utc::now();
    let opened = TreasuryAccount::open(input.branch_id, now);
    treasury::Entity::insert(treasury::ActiveModel {
        id: Set(opened.id.into_inner()),
        branch_id: Set(opened.branch_id.into_inner()),
        current_balance: Set(Decimal::ZERO),
        updated_at: Set(convert::ts(now)),
    })
    .on_conflict(
        OnConflict::column(treasury::Column::BranchId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(txn)
    .await
    .map_err(map_db_err)?;

    let row = treasury::Entity::find()
        .filter(treasury::Column::BranchId.eq(input.branch_id.into_inner()))
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| AppError::Internal("treasury row vanished after upsert".to_string()))?;

    let (account, transaction) =
        TreasuryService::post(convert::account(row.clone()), input, ctx.user_id, now)?;

    let mut active: treasury::ActiveModel = row.into();
    active.current_balance = Set(account.current_balance);
    active.updated_at = Set(convert::ts(now));
    active.update(txn).await.map_err(map_db_err)?;

    convert::transaction_model(&transaction)
        .insert(txn)
        .await
        .map_err(map_db_err)?;

    tracing::info!(
        branch_id = %input.branch_id,
        transaction_type = %input.transaction_type,
        category = %transaction.category,
        amount = %transaction.amount,
        balance_after = %transaction.balance_after,
        "treasury posting"
    );

    Ok(transaction)
}

impl PgStore {
    async fn find_account(&self, branch_id: BranchId) -> AppResult<TreasuryAccount> {
        let row = treasury::Entity::find()
            .filter(treasury::Column::BranchId.eq(branch_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(row.map_or_else(
            || TreasuryAccount::open(branch_id, Utc::now()),
            convert::account,
        ))
    }

    async fn query_transactions(
        &self,
        query: &TransactionQuery,
    ) -> AppResult<PageResponse<TreasuryTransaction>> {
        let filter = &query.filter;
        let select = treasury_transactions::Entity::find()
            .apply_if(filter.branch_id, |q, id| {
                q.filter(treasury_transactions::Column::BranchId.eq(id.into_inner()))
            })
            .apply_if(filter.transaction_type, |q, t| {
                q.filter(treasury_transactions::Column::TransactionType.eq(t.as_str()))
            })
            .apply_if(filter.category.clone(), |q, category| {
                q.filter(treasury_transactions::Column::Category.eq(category))
            })
            .apply_if(filter.date_from, |q, date| {
                q.filter(treasury_transactions::Column::TransactionDate.gte(date))
            })
            .apply_if(filter.date_to, |q, date| {
                q.filter(treasury_transactions::Column::TransactionDate.lte(date))
            });

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let column = match query.sort {
            TransactionSort::CreatedAt => treasury_transactions::Column::CreatedAt,
            TransactionSort::Amount => treasury_transactions::Column::Amount,
        };
        let rows = select
            .order_by(column, order(query.direction))
            .order_by(treasury_transactions::Column::Id, order(query.direction))
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let items = rows
            .into_iter()
            .map(convert::transaction)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(items, query.page, total))
    }

    async fn summarize_day(&self, branch_id: BranchId, date: NaiveDate) -> AppResult<DailySummary> {
        let rows = treasury_transactions::Entity::find()
            .filter(treasury_transactions::Column::BranchId.eq(branch_id.into_inner()))
            .filter(treasury_transactions::Column::TransactionDate.eq(date))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        let transactions = rows
            .into_iter()
            .map(convert::transaction)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(TreasuryService::summarize(branch_id, date, &transactions))
    }
}

#[async_trait]
impl TreasuryRepository for PgStore {
    async fn post_transaction(
        &self,
        ctx: &RequestContext,
        input: PostTransactionInput,
    ) -> AppResult<TreasuryTransaction> {
        ctx.require_any(TREASURY_STAFF)?;

        let txn = self.db.begin().await.map_err(map_db_err)?;
        let transaction = apply_posting(&txn, ctx, &input).await?;
        txn.commit().await.map_err(map_db_err)?;
        Ok(transaction)
    }

    async fn balance(
        &self,
        _ctx: &RequestContext,
        branch_id: BranchId,
    ) -> AppResult<TreasuryAccount> {
        retry_read(|| self.find_account(branch_id)).await
    }

    async fn transactions(
        &self,
        _ctx: &RequestContext,
        query: &TransactionQuery,
    ) -> AppResult<PageResponse<TreasuryTransaction>> {
        retry_read(|| self.query_transactions(query)).await
    }

    async fn add_expense(
        &self,
        ctx: &RequestContext,
        input: CreateExpenseInput,
    ) -> AppResult<ExpenseReceipt> {
        ctx.require_any(TREASURY_STAFF)?;
        let now = Utc::now();

        let txn = self.db.begin().await.map_err(map_db_err)?;
        let number = sequence::next_number(&txn, DocumentPrefix::Expense, now.date_naive()).await?;
        let (expense, posting) =
            TreasuryService::new_expense(&input, number, ctx.branch_id, ctx.user_id, now)?;
        convert::expense_model(&expense)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        let transaction = apply_posting(&txn, ctx, &posting).await?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(expense_id = %expense.id, amount = %expense.amount, "expense recorded");
        Ok(ExpenseReceipt {
            expense,
            transaction,
        })
    }

    async fn daily_summary(
        &self,
        _ctx: &RequestContext,
        branch_id: BranchId,
        date: NaiveDate,
    ) -> AppResult<DailySummary> {
        retry_read(|| self.summarize_day(branch_id, date)).await
    }
}
