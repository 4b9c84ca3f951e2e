//! Treasury routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use hivedrive_core::treasury::{
    CreateExpenseInput, DailySummary, ExpenseReceipt, PostTransactionInput, TransactionFilter,
    TransactionQuery, TransactionSort, TransactionType, TreasuryAccount, TreasuryTransaction,
};
use hivedrive_shared::types::money::format_amount;
use hivedrive_shared::types::{BranchId, PageResponse, Reference, SortDirection};

use super::common::page;
use crate::error::{ApiError, Localize};
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;
use crate::{AppState, amount};

/// Creates the treasury routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/treasury/transactions",
            get(list_transactions).post(post_transaction),
        )
        .route("/treasury/balance", get(balance))
        .route("/treasury/expenses", post(add_expense))
        .route("/treasury/daily-summary", get(daily_summary))
}

/// Query parameters for transaction history.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by branch.
    pub branch_id: Option<BranchId>,
    /// Filter by direction.
    pub transaction_type: Option<TransactionType>,
    /// Filter by category.
    pub category: Option<String>,
    /// First business date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Last business date, inclusive.
    pub date_to: Option<NaiveDate>,
    /// Sort field.
    pub sort: Option<TransactionSort>,
    /// Sort direction.
    pub direction: Option<SortDirection>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl From<ListTransactionsQuery> for TransactionQuery {
    fn from(query: ListTransactionsQuery) -> Self {
        Self {
            filter: TransactionFilter {
                branch_id: query.branch_id,
                transaction_type: query.transaction_type,
                category: query.category,
                date_from: query.date_from,
                date_to: query.date_to,
            },
            search: None,
            sort: query.sort.unwrap_or_default(),
            direction: query.direction.unwrap_or_default(),
            page: page(query.page, query.per_page),
        }
    }
}

/// Selects a branch and day.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// Branch to read; the caller's own when omitted.
    pub branch_id: Option<BranchId>,
    /// Business date; today (UTC) when omitted.
    pub date: Option<NaiveDate>,
}

/// Request body for a direct treasury posting.
#[derive(Debug, Deserialize, Validate)]
pub struct PostTransactionRequest {
    /// Branch whose drawer moves; the caller's own when omitted.
    pub branch_id: Option<BranchId>,
    /// Income or expense.
    pub transaction_type: TransactionType,
    /// Free-form category, e.g. `manual_deposit`.
    #[validate(length(min = 1, max = 64))]
    pub category: String,
    /// Positive amount.
    #[serde(deserialize_with = "amount::deserialize")]
    pub amount: Decimal,
    /// Source record; manual when omitted.
    pub reference: Option<Reference>,
    /// Free-text description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Business date; today when omitted.
    pub transaction_date: Option<NaiveDate>,
}

/// Request body for recording an expense.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    /// What the money went on, e.g. `utilities`.
    #[validate(length(min = 1, max = 64))]
    pub category: String,
    /// Positive amount.
    #[serde(deserialize_with = "amount::deserialize")]
    pub amount: Decimal,
    /// Free-text description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Day the expense was incurred; today when omitted.
    pub expense_date: Option<NaiveDate>,
}

/// A branch account with its balance formatted for display.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// The account.
    #[serde(flatten)]
    pub account: TreasuryAccount,
    /// Balance with separators and currency symbol.
    pub formatted_balance: String,
}

/// POST `/treasury/transactions` - Post income or expense to a branch drawer.
async fn post_transaction(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<PostTransactionRequest>,
) -> Result<(StatusCode, Json<TreasuryTransaction>), ApiError> {
    let input = PostTransactionInput {
        branch_id: payload.branch_id.unwrap_or(ctx.branch_id),
        transaction_type: payload.transaction_type,
        category: payload.category,
        amount: payload.amount,
        reference: payload.reference.unwrap_or_else(Reference::manual),
        description: payload.description,
        transaction_date: payload.transaction_date,
    };
    let transaction = state
        .repos
        .treasury
        .post_transaction(&ctx, input)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET `/treasury/transactions` - Transaction history.
async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<PageResponse<TreasuryTransaction>>, ApiError> {
    let page = state
        .repos
        .treasury
        .transactions(&ctx, &query.into())
        .await
        .localize(ctx.locale)?;
    Ok(Json(page))
}

/// GET `/treasury/balance` - Current balance of a branch.
async fn balance(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let branch_id = query.branch_id.unwrap_or(ctx.branch_id);
    let account = state
        .repos
        .treasury
        .balance(&ctx, branch_id)
        .await
        .localize(ctx.locale)?;
    Ok(Json(BalanceResponse {
        formatted_balance: format_amount(account.current_balance, &state.currency_symbol),
        account,
    }))
}

/// POST `/treasury/expenses` - Record an expense in the caller's branch.
async fn add_expense(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseReceipt>), ApiError> {
    let input = CreateExpenseInput {
        category: payload.category,
        amount: payload.amount,
        description: payload.description,
        expense_date: payload.expense_date,
    };
    let receipt = state
        .repos
        .treasury
        .add_expense(&ctx, input)
        .await
        .localize(ctx.locale)?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET `/treasury/daily-summary` - Income, expense, and net for one day.
async fn daily_summary(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<DailySummary>, ApiError> {
    let branch_id = query.branch_id.unwrap_or(ctx.branch_id);
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = state
        .repos
        .treasury
        .daily_summary(&ctx, branch_id, date)
        .await
        .localize(ctx.locale)?;
    Ok(Json(summary))
}
