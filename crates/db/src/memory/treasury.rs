//! Branch treasury in memory.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use hivedrive_core::numbering::DocumentPrefix;
use hivedrive_core::repository::TreasuryRepository;
use hivedrive_core::treasury::{
    CreateExpenseInput, DailySummary, ExpenseReceipt, PostTransactionInput, TransactionQuery,
    TransactionSort, TreasuryAccount, TreasuryService, TreasuryTransaction,
};
use hivedrive_shared::context::TREASURY_STAFF;
use hivedrive_shared::types::{BranchId, PageResponse};
use hivedrive_shared::{AppResult, RequestContext};

use super::tables::Changes;
use super::{MemoryStore, paginate, treasury_key};

#[async_trait]
impl TreasuryRepository for MemoryStore {
    async fn post_transaction(
        &self,
        ctx: &RequestContext,
        input: PostTransactionInput,
    ) -> AppResult<TreasuryTransaction> {
        ctx.require_any(TREASURY_STAFF)?;

        let _held = self.locks.acquire([treasury_key(input.branch_id)]).await;
        let mut changes = Changes::default();
        let transaction = changes.post(&*self.tables.read().await, ctx, &input, Utc::now())?;
        changes.apply(&mut *self.tables.write().await);
        Ok(transaction)
    }

    async fn balance(
        &self,
        _ctx: &RequestContext,
        branch_id: BranchId,
    ) -> AppResult<TreasuryAccount> {
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .get(&branch_id)
            .copied()
            .unwrap_or_else(|| TreasuryAccount::open(branch_id, Utc::now())))
    }

    async fn transactions(
        &self,
        _ctx: &RequestContext,
        query: &TransactionQuery,
    ) -> AppResult<PageResponse<TreasuryTransaction>> {
        let filter = &query.filter;
        let mut items: Vec<TreasuryTransaction> = self
            .tables
            .read()
            .await
            .transactions
            .iter()
            .filter(|t| filter.branch_id.is_none_or(|b| t.branch_id == b))
            .filter(|t| filter.transaction_type.is_none_or(|k| t.transaction_type == k))
            .filter(|t| filter.category.as_ref().is_none_or(|c| &t.category == c))
            .filter(|t| filter.date_from.is_none_or(|d| t.transaction_date >= d))
            .filter(|t| filter.date_to.is_none_or(|d| t.transaction_date <= d))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let ordering = match query.sort {
                TransactionSort::CreatedAt => a.created_at.cmp(&b.created_at),
                TransactionSort::Amount => a.amount.cmp(&b.amount),
            };
            query.direction.apply(ordering.then_with(|| a.id.cmp(&b.id)))
        });
        Ok(paginate(&items, query.page))
    }

    async fn add_expense(
        &self,
        ctx: &RequestContext,
        input: CreateExpenseInput,
    ) -> AppResult<ExpenseReceipt> {
        ctx.require_any(TREASURY_STAFF)?;
        let now = Utc::now();

        let _held = self.locks.acquire([treasury_key(ctx.branch_id)]).await;
        let number = self.next_number(DocumentPrefix::Expense, now);
        let (expense, posting) =
            TreasuryService::new_expense(&input, number, ctx.branch_id, ctx.user_id, now)?;
        let mut changes = Changes::default();
        let transaction = changes.post(&*self.tables.read().await, ctx, &posting, now)?;
        changes.expenses.push(expense.clone());
        changes.apply(&mut *self.tables.write().await);

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
        Ok(TreasuryService::summarize(
            branch_id,
            date,
            &self.tables.read().await.transactions,
        ))
    }
}
