//! Property-based tests for treasury postings.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use hivedrive_shared::types::{BranchId, Reference, UserId};

use crate::treasury::service::TreasuryService;
use crate::treasury::types::{PostTransactionInput, TransactionType, TreasuryAccount};

/// Strategy for generating postings with positive cent amounts.
fn arb_posting() -> impl Strategy<Value = (TransactionType, Decimal)> {
    (
        prop_oneof![Just(TransactionType::Income), Just(TransactionType::Expense)],
        (1i64..1_000_000i64).prop_map(|c| Decimal::new(c, 2)),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The final balance is income minus expenses and every snapshot equals
    /// the running balance at that point.
    #[test]
    fn prop_balance_is_running_sum(postings in prop::collection::vec(arb_posting(), 0..50)) {
        let branch_id = BranchId::new();
        let mut account = TreasuryAccount::open(branch_id, Utc::now());
        let mut running = Decimal::ZERO;
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;

        for (transaction_type, amount) in postings {
            let input = PostTransactionInput {
                branch_id,
                transaction_type,
                category: "sales".to_string(),
                amount,
                reference: Reference::manual(),
                description: None,
                transaction_date: None,
            };
            let (next, row) =
                TreasuryService::post(account, &input, UserId::new(), Utc::now()).unwrap();
            match transaction_type {
                TransactionType::Income => { running += amount; income += amount; }
                TransactionType::Expense => { running -= amount; expense += amount; }
            }
            prop_assert_eq!(row.balance_after, running);
            prop_assert!(row.amount > Decimal::ZERO);
            account = next;
        }

        prop_assert_eq!(account.current_balance, income - expense);
    }
}
