//! Branch treasury ledger.
//!
//! Each branch has one cash account. Its balance only changes by appending a
//! transaction, and each transaction snapshots the balance it produced.
//!
//! # Modules
//!
//! - `types` - Accounts, transactions, expenses, and summaries
//! - `error` - Treasury errors
//! - `service` - Posting and summarising

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::TreasuryError;
pub use service::TreasuryService;
pub use types::{
    CreateExpenseInput, DailySummary, Expense, ExpenseReceipt, PostTransactionInput,
    TransactionFilter, TransactionQuery, TransactionSort, TransactionType, TreasuryAccount,
    TreasuryTransaction, categories,
};
