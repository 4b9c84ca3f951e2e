//! Treasury posting and summaries.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use hivedrive_shared::types::money::{MAX_AMOUNT, round_currency};
use hivedrive_shared::types::{
    BranchId, ExpenseId, Reference, ReferenceKind, TreasuryTransactionId, UserId,
};

use crate::treasury::error::TreasuryError;
use crate::treasury::types::{
    CreateExpenseInput, DailySummary, Expense, PostTransactionInput, TransactionType,
    TreasuryAccount, TreasuryTransaction,
};

/// Stateless treasury rules.
pub struct TreasuryService;

impl TreasuryService {
    /// Checks a posting before any account is touched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for amounts at or below zero after rounding
    /// to currency precision or above the money column maximum, and
    /// `MissingCategory` for a blank category.
    pub fn validate(input: &PostTransactionInput) -> Result<(), TreasuryError> {
        let amount = round_currency(input.amount);
        if amount <= Decimal::ZERO || amount > MAX_AMOUNT {
            return Err(TreasuryError::InvalidAmount(input.amount));
        }
        if input.category.trim().is_empty() {
            return Err(TreasuryError::MissingCategory);
        }
        Ok(())
    }

    /// Appends a posting to an account.
    ///
    /// Returns the updated account and the transaction to store. The caller
    /// must hold the account's lock and persist both or neither. Expenses may
    /// take the balance below zero.
    ///
    /// # Errors
    ///
    /// Returns any error from [`TreasuryService::validate`], or
    /// `BalanceOutOfRange` when the new balance would not fit its column.
    pub fn post(
        account: TreasuryAccount,
        input: &PostTransactionInput,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(TreasuryAccount, TreasuryTransaction), TreasuryError> {
        Self::validate(input)?;

        let amount = round_currency(input.amount);
        let balance_after = input
            .transaction_type
            .apply(account.current_balance, amount)
            .filter(|balance| balance.abs() <= MAX_AMOUNT)
            .ok_or(TreasuryError::BalanceOutOfRange)?;

        let updated = TreasuryAccount {
            current_balance: balance_after,
            updated_at: now,
            ..account
        };
        let transaction = TreasuryTransaction {
            id: TreasuryTransactionId::new(),
            treasury_id: account.id,
            branch_id: account.branch_id,
            transaction_type: input.transaction_type,
            category: input.category.trim().to_string(),
            amount,
            balance_after,
            reference: input.reference,
            description: input.description.clone(),
            transaction_date: input.transaction_date.unwrap_or_else(|| now.date_naive()),
            created_by,
            created_at: now,
        };

        Ok((updated, transaction))
    }

    /// Builds an expense and the treasury posting that pays it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` or `MissingCategory`.
    pub fn new_expense(
        input: &CreateExpenseInput,
        expense_number: String,
        branch_id: BranchId,
        paid_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(Expense, PostTransactionInput), TreasuryError> {
        let expense = Expense {
            id: ExpenseId::new(),
            expense_number,
            branch_id,
            category: input.category.trim().to_string(),
            amount: round_currency(input.amount),
            description: input.description.clone(),
            expense_date: input.expense_date.unwrap_or_else(|| now.date_naive()),
            paid_by,
            created_at: now,
        };
        let posting = PostTransactionInput {
            branch_id,
            transaction_type: TransactionType::Expense,
            category: expense.category.clone(),
            amount: input.amount,
            reference: Reference::new(ReferenceKind::Expense, expense.id.into_inner()),
            description: input.description.clone(),
            transaction_date: Some(expense.expense_date),
        };
        Self::validate(&posting)?;

        Ok((expense, posting))
    }

    /// Sums one day's transactions for a branch.
    #[must_use]
    pub fn summarize<'a>(
        branch_id: BranchId,
        date: NaiveDate,
        transactions: impl IntoIterator<Item = &'a TreasuryTransaction>,
    ) -> DailySummary {
        let (income, expense) = transactions
            .into_iter()
            .filter(|t| t.branch_id == branch_id && t.transaction_date == date)
            .fold((Decimal::ZERO, Decimal::ZERO), |(income, expense), t| {
                match t.transaction_type {
                    TransactionType::Income => (income + t.amount, expense),
                    TransactionType::Expense => (income, expense + t.amount),
                }
            });

        DailySummary {
            branch_id,
            date,
            income,
            expense,
            net: income - expense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treasury::types::categories;
    use rust_decimal_macros::dec;

    fn posting(transaction_type: TransactionType, amount: Decimal) -> PostTransactionInput {
        PostTransactionInput {
            branch_id: BranchId::new(),
            transaction_type,
            category: categories::MANUAL_DEPOSIT.to_string(),
            amount,
            reference: Reference::manual(),
            description: None,
            transaction_date: None,
        }
    }

    #[test]
    fn test_post_income_then_expense() {
        let account = TreasuryAccount::open(BranchId::new(), Utc::now());
        let (account, first) = TreasuryService::post(
            account,
            &posting(TransactionType::Income, dec!(500)),
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(first.balance_after, dec!(500));

        let (account, second) = TreasuryService::post(
            account,
            &posting(TransactionType::Expense, dec!(120.50)),
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(second.balance_after, dec!(379.50));
        assert_eq!(account.current_balance, dec!(379.50));
        assert_eq!(second.treasury_id, account.id);
    }

    #[test]
    fn test_expense_may_overdraw() {
        let account = TreasuryAccount::open(BranchId::new(), Utc::now());
        let (account, _) = TreasuryService::post(
            account,
            &posting(TransactionType::Expense, dec!(40)),
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(account.current_balance, dec!(-40));
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        for amount in [dec!(0), dec!(-10), dec!(0.001)] {
            assert_eq!(
                TreasuryService::validate(&posting(TransactionType::Income, amount)),
                Err(TreasuryError::InvalidAmount(amount))
            );
        }
    }

    #[test]
    fn test_amount_above_column_maximum_rejected() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        for amount in [huge, dec!(1000000000000)] {
            assert_eq!(
                TreasuryService::validate(&posting(TransactionType::Income, amount)),
                Err(TreasuryError::InvalidAmount(amount))
            );
        }
    }

    #[test]
    fn test_balance_overflow_rejected() {
        let mut account = TreasuryAccount::open(BranchId::new(), Utc::now());
        account.current_balance = dec!(999999999999.00);
        let result = TreasuryService::post(
            account,
            &posting(TransactionType::Income, dec!(5)),
            UserId::new(),
            Utc::now(),
        );
        assert_eq!(result, Err(TreasuryError::BalanceOutOfRange));
        assert_eq!(TransactionType::Income.apply(Decimal::MAX, dec!(1)), None);
    }

    #[test]
    fn test_blank_category_rejected() {
        let mut input = posting(TransactionType::Income, dec!(10));
        input.category = " ".to_string();
        assert_eq!(
            TreasuryService::validate(&input),
            Err(TreasuryError::MissingCategory)
        );
    }

    #[test]
    fn test_new_expense_references_expense() {
        let input = CreateExpenseInput {
            category: "utilities".to_string(),
            amount: dec!(350),
            description: Some("Electricity".to_string()),
            expense_date: None,
        };
        let (expense, posting) = TreasuryService::new_expense(
            &input,
            "EXP-20260101-0001".to_string(),
            BranchId::new(),
            UserId::new(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(posting.transaction_type, TransactionType::Expense);
        assert_eq!(posting.category, "utilities");
        assert_eq!(posting.amount, dec!(350));
        assert_eq!(posting.reference.kind, ReferenceKind::Expense);
        assert_eq!(posting.reference.id, Some(expense.id.into_inner()));
        assert_eq!(posting.transaction_date, Some(expense.expense_date));
    }

    #[test]
    fn test_summarize_filters_branch_and_date() {
        let branch = BranchId::new();
        let mut account = TreasuryAccount::open(branch, Utc::now());
        let mut rows = Vec::new();
        for (kind, amount) in [
            (TransactionType::Income, dec!(500)),
            (TransactionType::Income, dec!(250)),
            (TransactionType::Expense, dec!(100)),
        ] {
            let mut input = posting(kind, amount);
            input.branch_id = branch;
            let (next, row) =
                TreasuryService::post(account, &input, UserId::new(), Utc::now()).unwrap();
            account = next;
            rows.push(row);
        }
        let today = Utc::now().date_naive();

        let summary = TreasuryService::summarize(branch, today, &rows);
        assert_eq!(summary.income, dec!(750));
        assert_eq!(summary.expense, dec!(100));
        assert_eq!(summary.net, dec!(650));

        let other = TreasuryService::summarize(BranchId::new(), today, &rows);
        assert_eq!(other.income, dec!(0));
    }
}
