//! Concurrent writers against the in-memory store.
//!
//! Stock and treasury balances must equal the sum of accepted changes no
//! matter how the writers interleave.

mod common;

use std::collections::BTreeSet;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use hivedrive_core::inventory::{MovementFilter, MovementQuery};
use hivedrive_core::lifecycle::{AddPaymentInput, InvoiceStatus, PaymentMethod, WorkOrderEvent};
use hivedrive_core::treasury::{
    PostTransactionInput, TransactionFilter, TransactionQuery, TransactionType, categories,
};
use hivedrive_shared::types::{BranchId, PageRequest, Reference};
use hivedrive_shared::{AppError, Role};

use common::{
    adjustment, ctx, line, memory_repos, registered_owner, stocked_part, work_order_input,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_withdrawals_never_overdraw() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let keeper = ctx(Role::Warehouse, branch);
    let part = stocked_part(&repos, &keeper, "CC-1", 10).await;

    let attempts = (0..40).map(|_| {
        let repos = repos.clone();
        tokio::spawn(async move {
            repos
                .inventory
                .adjust_stock(&keeper, adjustment(part.id, branch, -1))
                .await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 10);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, AppError::InsufficientStock { .. }))
    );

    let level = repos
        .inventory
        .stock_level(&keeper, part.id, branch)
        .await
        .unwrap();
    assert_eq!(level.quantity, 0);

    let movements = repos
        .inventory
        .movements(
            &keeper,
            &MovementQuery::filtered(MovementFilter {
                part_id: Some(part.id),
                ..MovementFilter::default()
            }),
        )
        .await
        .unwrap();
    assert_eq!(movements.total_count, 11);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_adjustments_sum_exactly() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let keeper = ctx(Role::Warehouse, branch);
    let part = stocked_part(&repos, &keeper, "CC-2", 100).await;

    let deltas: Vec<i32> = (1..=60).map(|i| if i % 3 == 0 { -2 } else { 3 }).collect();
    let expected = 100 + deltas.iter().sum::<i32>();

    let tasks = deltas.into_iter().map(|delta| {
        let repos = repos.clone();
        tokio::spawn(async move {
            repos
                .inventory
                .adjust_stock(&keeper, adjustment(part.id, branch, delta))
                .await
        })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let level = repos
        .inventory
        .stock_level(&keeper, part.id, branch)
        .await
        .unwrap();
    assert_eq!(level.quantity, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_postings_keep_a_running_balance() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let treasurer = ctx(Role::Treasurer, branch);

    let tasks = (0..100).map(|_| {
        let repos = repos.clone();
        tokio::spawn(async move {
            repos
                .treasury
                .post_transaction(
                    &treasurer,
                    PostTransactionInput {
                        branch_id: branch,
                        transaction_type: TransactionType::Income,
                        category: categories::MANUAL_DEPOSIT.to_string(),
                        amount: dec!(1.25),
                        reference: Reference::manual(),
                        description: None,
                        transaction_date: None,
                    },
                )
                .await
        })
    });
    let posted: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();

    let account = repos.treasury.balance(&treasurer, branch).await.unwrap();
    assert_eq!(account.current_balance, dec!(125));

    let running: BTreeSet<Decimal> = posted.iter().map(|t| t.balance_after).collect();
    assert_eq!(running.len(), 100);
    assert_eq!(running.last().copied(), Some(dec!(125)));

    let history = repos
        .treasury
        .transactions(
            &treasurer,
            &TransactionQuery::filtered(TransactionFilter {
                branch_id: Some(branch),
                ..TransactionFilter::default()
            })
            .with_page(PageRequest::new(1, 100)),
        )
        .await
        .unwrap();
    assert_eq!(history.total_count, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_payments_settle_once() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let staff = ctx(Role::Manager, branch);
    let owner = registered_owner(&repos, &staff).await;

    let order = repos
        .work_orders
        .create(&staff, work_order_input(&owner, vec![line(dec!(1), dec!(500))]))
        .await
        .unwrap();
    for event in [WorkOrderEvent::Start, WorkOrderEvent::Complete] {
        repos
            .work_orders
            .transition(&staff, order.id, event)
            .await
            .unwrap();
    }
    let invoice = repos
        .work_orders
        .create_invoice(&staff, order.id)
        .await
        .unwrap();

    let tasks = (0..10).map(|_| {
        let repos = repos.clone();
        tokio::spawn(async move {
            repos
                .invoices
                .add_payment(
                    &staff,
                    invoice.id,
                    AddPaymentInput {
                        amount: dec!(50),
                        method: PaymentMethod::Card,
                        reference_number: None,
                        notes: None,
                    },
                )
                .await
        })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let settled = repos.invoices.get(&staff, invoice.id).await.unwrap();
    assert_eq!(settled.status, InvoiceStatus::Paid);
    assert_eq!(settled.paid_amount, dec!(500));
    assert_eq!(settled.remaining_amount, Decimal::ZERO);

    let account = repos.treasury.balance(&staff, branch).await.unwrap();
    assert_eq!(account.current_balance, dec!(500));
}
