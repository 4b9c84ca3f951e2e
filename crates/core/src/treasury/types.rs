//! Treasury domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hivedrive_shared::types::{
    BranchId, ExpenseId, QuerySpec, Reference, TreasuryId, TreasuryTransactionId, UserId,
};

/// Well-known transaction categories.
pub mod categories {
    /// Income from a payment against an invoice.
    pub const INVOICE_PAYMENT: &str = "invoice_payment";
    /// Cash put into the drawer by hand.
    pub const MANUAL_DEPOSIT: &str = "manual_deposit";
}

/// Direction of a treasury transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Cash in.
    Income,
    /// Cash out.
    Expense,
}

impl TransactionType {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parses a stored name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Applies a positive amount to a balance in this direction, or `None`
    /// on overflow.
    #[must_use]
    pub fn apply(self, balance: Decimal, amount: Decimal) -> Option<Decimal> {
        match self {
            Self::Income => balance.checked_add(amount),
            Self::Expense => balance.checked_sub(amount),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One branch's cash account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryAccount {
    /// Account ID.
    pub id: TreasuryId,
    /// Owning branch.
    pub branch_id: BranchId,
    /// Balance after the latest transaction.
    pub current_balance: Decimal,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl TreasuryAccount {
    /// A fresh account with zero balance.
    #[must_use]
    pub fn open(branch_id: BranchId, now: DateTime<Utc>) -> Self {
        Self {
            id: TreasuryId::new(),
            branch_id,
            current_balance: Decimal::ZERO,
            updated_at: now,
        }
    }
}

/// An immutable treasury ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryTransaction {
    /// Transaction ID.
    pub id: TreasuryTransactionId,
    /// Account.
    pub treasury_id: TreasuryId,
    /// Branch of the account.
    pub branch_id: BranchId,
    /// Direction.
    pub transaction_type: TransactionType,
    /// Category, e.g. `invoice_payment` or an expense category.
    pub category: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Account balance right after this transaction.
    pub balance_after: Decimal,
    /// Source record.
    pub reference: Reference,
    /// Free-text description.
    pub description: Option<String>,
    /// Business date.
    pub transaction_date: NaiveDate,
    /// Acting user.
    pub created_by: UserId,
    /// Time recorded.
    pub created_at: DateTime<Utc>,
}

/// A posting request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTransactionInput {
    /// Branch whose account changes.
    pub branch_id: BranchId,
    /// Direction.
    pub transaction_type: TransactionType,
    /// Category.
    pub category: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Source record.
    pub reference: Reference,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Business date; today when unset.
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,
}

/// A recorded business expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Human-readable number, `EXP-YYYYMMDD-NNNN`.
    pub expense_number: String,
    /// Paying branch.
    pub branch_id: BranchId,
    /// Category, e.g. rent or utilities.
    pub category: String,
    /// Positive amount.
    pub amount: Decimal,
    /// What was paid for.
    pub description: Option<String>,
    /// Business date.
    pub expense_date: NaiveDate,
    /// Who paid.
    pub paid_by: UserId,
    /// Time recorded.
    pub created_at: DateTime<Utc>,
}

/// Input for recording an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateExpenseInput {
    /// Category.
    pub category: String,
    /// Positive amount.
    pub amount: Decimal,
    /// What was paid for.
    #[serde(default)]
    pub description: Option<String>,
    /// Business date; today when unset.
    #[serde(default)]
    pub expense_date: Option<NaiveDate>,
}

/// An expense and the treasury posting made for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseReceipt {
    /// The expense.
    pub expense: Expense,
    /// The treasury expense transaction.
    pub transaction: TreasuryTransaction,
}

/// Income and expense totals for one branch and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Branch.
    pub branch_id: BranchId,
    /// Business date.
    pub date: NaiveDate,
    /// Sum of income.
    pub income: Decimal,
    /// Sum of expenses.
    pub expense: Decimal,
    /// `income - expense`.
    pub net: Decimal,
}

/// Equality and range filters for transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Branch.
    pub branch_id: Option<BranchId>,
    /// Direction.
    pub transaction_type: Option<TransactionType>,
    /// Category.
    pub category: Option<String>,
    /// First business date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Last business date, inclusive.
    pub date_to: Option<NaiveDate>,
}

/// Sort fields for transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSort {
    /// By time recorded.
    #[default]
    CreatedAt,
    /// By amount.
    Amount,
}

/// Transaction history query.
pub type TransactionQuery = QuerySpec<TransactionFilter, TransactionSort>;
