//! End-to-end flows against the in-memory store.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use hivedrive_core::inventory::{
    IssuePartInput, MovementFilter, MovementQuery, MovementType, PartFilter, PartQuery,
    UpdatePartInput,
};
use hivedrive_core::lifecycle::{
    AddPaymentInput, DocumentSort, InvoiceStatus, PaymentMethod, QuotationEvent,
    QuotationFilter, QuotationQuery, QuotationStatus, UpdateDocumentInput, WorkOrderEvent,
    WorkOrderStatus,
};
use hivedrive_core::purchasing::{
    CreatePurchaseOrderInput, PurchaseEvent, PurchaseItemInput, PurchaseStatus,
};
use hivedrive_core::registry::{CreateVehicleInput, VehicleFilter, VehicleQuery};
use hivedrive_core::treasury::{CreateExpenseInput, TransactionType, categories};
use hivedrive_shared::types::{BranchId, CustomerId, PageRequest, ReferenceKind, SortDirection};
use hivedrive_shared::{AppError, Role};

use common::{
    adjustment, ctx, line, memory_repos, quotation_input, registered_owner, registered_supplier,
    stocked_part, work_order_input,
};

fn payment(amount: Decimal) -> AddPaymentInput {
    AddPaymentInput {
        amount,
        method: PaymentMethod::Cash,
        reference_number: None,
        notes: None,
    }
}

#[tokio::test]
async fn quotation_totals_apply_discount_then_tax() {
    let repos = memory_repos();
    let reception = ctx(Role::Reception, BranchId::new());
    let owner = registered_owner(&repos, &reception).await;

    let quotation = repos
        .quotations
        .create(
            &reception,
            quotation_input(&owner, vec![line(dec!(2), dec!(100))], dec!(10), dec!(14)),
        )
        .await
        .unwrap();

    assert_eq!(quotation.status, QuotationStatus::Draft);
    assert!(quotation.quotation_number.starts_with("QT-"));
    assert_eq!(quotation.totals.subtotal, dec!(200));
    assert_eq!(quotation.totals.discount_amount, dec!(20));
    assert_eq!(quotation.totals.tax_amount, dec!(25.20));
    assert_eq!(quotation.totals.total, dec!(205.20));
}

#[tokio::test]
async fn omitted_tax_uses_configured_default() {
    let repos = memory_repos();
    let reception = ctx(Role::Reception, BranchId::new());
    let owner = registered_owner(&repos, &reception).await;
    let mut input = quotation_input(
        &owner,
        vec![line(dec!(1), dec!(100))],
        Decimal::ZERO,
        Decimal::ZERO,
    );
    input.tax_percent = None;

    let quotation = repos.quotations.create(&reception, input).await.unwrap();

    assert_eq!(quotation.percentages.tax_percent, common::DEFAULT_TAX);
    assert_eq!(quotation.totals.total, dec!(114));
}

#[tokio::test]
async fn update_replaces_items_and_recomputes() {
    let repos = memory_repos();
    let reception = ctx(Role::Reception, BranchId::new());
    let owner = registered_owner(&repos, &reception).await;
    let quotation = repos
        .quotations
        .create(
            &reception,
            quotation_input(&owner, vec![line(dec!(1), dec!(50))], Decimal::ZERO, Decimal::ZERO),
        )
        .await
        .unwrap();

    let updated = repos
        .quotations
        .update(
            &reception,
            quotation.id,
            UpdateDocumentInput {
                items: Some(vec![line(dec!(3), dec!(50)), line(dec!(1), dec!(25))]),
                ..UpdateDocumentInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.items.len(), 2);
    assert_eq!(updated.totals.total, dec!(175));
    let stored = repos.quotations.get(&reception, quotation.id).await.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn approved_quotation_converts_into_pending_work_order() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let reception = ctx(Role::Reception, branch);
    let owner = registered_owner(&repos, &reception).await;
    let manager = ctx(Role::Manager, branch);

    let quotation = repos
        .quotations
        .create(
            &reception,
            quotation_input(
                &owner,
                vec![line(dec!(2), dec!(100)), line(dec!(1), dec!(40))],
                dec!(10),
                dec!(14),
            ),
        )
        .await
        .unwrap();
    repos
        .quotations
        .transition(&reception, quotation.id, QuotationEvent::Submit)
        .await
        .unwrap();
    let approved = repos
        .quotations
        .transition(&manager, quotation.id, QuotationEvent::Approve)
        .await
        .unwrap();
    assert_eq!(approved.approved_by, Some(manager.user_id));

    let order = repos
        .quotations
        .convert_to_work_order(&reception, quotation.id)
        .await
        .unwrap();

    assert_eq!(order.status, WorkOrderStatus::Pending);
    assert_eq!(order.quotation_id, Some(quotation.id));
    assert_eq!(order.totals, quotation.totals);
    assert_eq!(order.items.len(), quotation.items.len());
    assert!(order.order_number.starts_with("WO-"));

    let converted = repos.quotations.get(&reception, quotation.id).await.unwrap();
    assert_eq!(converted.status, QuotationStatus::Converted);

    let again = repos
        .quotations
        .convert_to_work_order(&reception, quotation.id)
        .await
        .unwrap_err();
    assert!(matches!(again, AppError::NotApproved(_)));
}

#[tokio::test]
async fn draft_quotation_cannot_convert() {
    let repos = memory_repos();
    let reception = ctx(Role::Reception, BranchId::new());
    let owner = registered_owner(&repos, &reception).await;
    let quotation = repos
        .quotations
        .create(
            &reception,
            quotation_input(&owner, vec![line(dec!(1), dec!(10))], Decimal::ZERO, Decimal::ZERO),
        )
        .await
        .unwrap();

    let err = repos
        .quotations
        .convert_to_work_order(&reception, quotation.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotApproved(_)));
    let orders = repos
        .work_orders
        .list(&reception, &Default::default())
        .await
        .unwrap();
    assert_eq!(orders.total_count, 0);
    let unchanged = repos.quotations.get(&reception, quotation.id).await.unwrap();
    assert_eq!(unchanged.status, QuotationStatus::Draft);
}

#[tokio::test]
async fn approval_requires_approver_role() {
    let repos = memory_repos();
    let reception = ctx(Role::Reception, BranchId::new());
    let owner = registered_owner(&repos, &reception).await;
    let quotation = repos
        .quotations
        .create(
            &reception,
            quotation_input(&owner, vec![line(dec!(1), dec!(10))], Decimal::ZERO, Decimal::ZERO),
        )
        .await
        .unwrap();
    repos
        .quotations
        .transition(&reception, quotation.id, QuotationEvent::Submit)
        .await
        .unwrap();

    let err = repos
        .quotations
        .transition(&reception, quotation.id, QuotationEvent::Approve)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn converted_quotation_cannot_be_deleted() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let manager = ctx(Role::Manager, branch);
    let owner = registered_owner(&repos, &manager).await;
    let quotation = repos
        .quotations
        .create(
            &manager,
            quotation_input(&owner, vec![line(dec!(1), dec!(10))], Decimal::ZERO, Decimal::ZERO),
        )
        .await
        .unwrap();
    for event in [QuotationEvent::Submit, QuotationEvent::Approve] {
        repos
            .quotations
            .transition(&manager, quotation.id, event)
            .await
            .unwrap();
    }
    repos
        .quotations
        .convert_to_work_order(&manager, quotation.id)
        .await
        .unwrap();

    let err = repos
        .quotations
        .delete(&manager, quotation.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState { .. }));
}

#[tokio::test]
async fn draft_quotation_can_be_deleted() {
    let repos = memory_repos();
    let reception = ctx(Role::Reception, BranchId::new());
    let owner = registered_owner(&repos, &reception).await;
    let quotation = repos
        .quotations
        .create(
            &reception,
            quotation_input(&owner, vec![line(dec!(1), dec!(10))], Decimal::ZERO, Decimal::ZERO),
        )
        .await
        .unwrap();

    repos.quotations.delete(&reception, quotation.id).await.unwrap();

    let err = repos
        .quotations
        .get(&reception, quotation.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn stock_goes_to_zero_but_never_below() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let keeper = ctx(Role::Warehouse, branch);
    let part = stocked_part(&repos, &keeper, "BP-001", 5).await;

    repos
        .inventory
        .adjust_stock(&keeper, adjustment(part.id, branch, -5))
        .await
        .unwrap();
    let err = repos
        .inventory
        .adjust_stock(&keeper, adjustment(part.id, branch, -1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::InsufficientStock {
            available: 0,
            requested: 1,
            ..
        }
    ));
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
    assert_eq!(movements.total_count, 2);
}

#[tokio::test]
async fn stock_adjustment_requires_stock_keeper() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let keeper = ctx(Role::Warehouse, branch);
    let part = stocked_part(&repos, &keeper, "OF-200", 3).await;

    let err = repos
        .inventory
        .adjust_stock(
            &ctx(Role::Technician, branch),
            adjustment(part.id, branch, 1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn duplicate_sku_is_a_conflict() {
    let repos = memory_repos();
    let keeper = ctx(Role::Warehouse, BranchId::new());
    stocked_part(&repos, &keeper, "SP-01", 0).await;

    let err = repos
        .inventory
        .create_part(&keeper, common::part_input("SP-01", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn low_stock_counts_unstocked_parts_as_zero() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let keeper = ctx(Role::Warehouse, branch);
    let plenty = stocked_part(&repos, &keeper, "A-1", 20).await;
    let few = stocked_part(&repos, &keeper, "A-2", 2).await;
    let none = stocked_part(&repos, &keeper, "A-3", 0).await;

    let low = repos.inventory.low_stock(&keeper, branch, 5).await.unwrap();
    let ids: Vec<_> = low.iter().map(|item| item.part.id).collect();

    assert!(!ids.contains(&plenty.id));
    assert!(ids.contains(&few.id));
    assert!(ids.contains(&none.id));
}

#[tokio::test]
async fn invoice_payments_settle_and_feed_treasury() {
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
    assert_eq!(invoice.totals.total, dec!(500));
    assert_eq!(invoice.status, InvoiceStatus::Issued);

    let first = repos
        .invoices
        .add_payment(&staff, invoice.id, payment(dec!(200)))
        .await
        .unwrap();
    assert_eq!(first.invoice.status, InvoiceStatus::Partial);
    assert_eq!(first.invoice.remaining_amount, dec!(300));
    assert_eq!(first.transaction.transaction_type, TransactionType::Income);
    assert_eq!(first.transaction.category, categories::INVOICE_PAYMENT);
    assert_eq!(first.transaction.reference.kind, ReferenceKind::Payment);

    let second = repos
        .invoices
        .add_payment(&staff, invoice.id, payment(dec!(300)))
        .await
        .unwrap();
    assert_eq!(second.invoice.status, InvoiceStatus::Paid);
    assert_eq!(second.invoice.remaining_amount, Decimal::ZERO);

    let balance = repos.treasury.balance(&staff, branch).await.unwrap();
    assert_eq!(balance.current_balance, dec!(500));

    let payments = repos.invoices.payments(&staff, invoice.id).await.unwrap();
    assert_eq!(payments.len(), 2);

    let settled = repos
        .invoices
        .add_payment(&staff, invoice.id, payment(dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(settled, AppError::InvalidState { .. }));
    let unchanged = repos.treasury.balance(&staff, branch).await.unwrap();
    assert_eq!(unchanged.current_balance, dec!(500));
}

#[tokio::test]
async fn work_order_is_invoiced_once() {
    let repos = memory_repos();
    let staff = ctx(Role::Manager, BranchId::new());
    let owner = registered_owner(&repos, &staff).await;
    let order = repos
        .work_orders
        .create(&staff, work_order_input(&owner, vec![line(dec!(1), dec!(80))]))
        .await
        .unwrap();

    let early = repos
        .work_orders
        .create_invoice(&staff, order.id)
        .await
        .unwrap_err();
    assert!(matches!(early, AppError::InvalidState { .. }));

    for event in [WorkOrderEvent::Start, WorkOrderEvent::Complete] {
        repos
            .work_orders
            .transition(&staff, order.id, event)
            .await
            .unwrap();
    }
    repos
        .work_orders
        .create_invoice(&staff, order.id)
        .await
        .unwrap();
    let twice = repos
        .work_orders
        .create_invoice(&staff, order.id)
        .await
        .unwrap_err();
    assert!(matches!(twice, AppError::Conflict(_)));
}

#[tokio::test]
async fn issuing_parts_takes_stock_from_the_order_branch() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let staff = ctx(Role::Manager, branch);
    let owner = registered_owner(&repos, &staff).await;
    let part = stocked_part(&repos, &staff, "PAD-9", 4).await;
    let order = repos
        .work_orders
        .create(&staff, work_order_input(&owner, vec![line(dec!(1), dec!(80))]))
        .await
        .unwrap();

    let movement = repos
        .work_orders
        .issue_part(
            &staff,
            order.id,
            IssuePartInput {
                part_id: part.id,
                quantity: 3,
            },
        )
        .await
        .unwrap();

    assert_eq!(movement.movement_type, MovementType::WorkOrderOut);
    assert_eq!(movement.quantity, 3);
    assert_eq!(movement.reference.kind, ReferenceKind::WorkOrder);
    assert_eq!(movement.reference.id, Some(order.id.into_inner()));
    let level = repos
        .inventory
        .stock_level(&staff, part.id, branch)
        .await
        .unwrap();
    assert_eq!(level.quantity, 1);

    repos
        .work_orders
        .transition(&staff, order.id, WorkOrderEvent::Cancel)
        .await
        .unwrap();
    let closed = repos
        .work_orders
        .issue_part(
            &staff,
            order.id,
            IssuePartInput {
                part_id: part.id,
                quantity: 1,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(closed, AppError::InvalidState { .. }));
}

#[tokio::test]
async fn receiving_a_purchase_order_books_stock() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let manager = ctx(Role::Manager, branch);
    let part = stocked_part(&repos, &manager, "FLT-3", 1).await;
    let supplier_id = registered_supplier(&repos, &manager).await;

    let order = repos
        .purchases
        .create(
            &manager,
            CreatePurchaseOrderInput {
                supplier_id,
                items: vec![
                    PurchaseItemInput {
                        part_id: part.id,
                        quantity: 10,
                        unit_price: dec!(12.50),
                    },
                    PurchaseItemInput {
                        part_id: part.id,
                        quantity: 2,
                        unit_price: dec!(12.50),
                    },
                ],
                notes: None,
                expected_date: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(order.total, dec!(150));
    assert!(order.order_number.starts_with("PO-"));

    for event in [PurchaseEvent::Approve, PurchaseEvent::Order, PurchaseEvent::Receive] {
        repos
            .purchases
            .transition(&manager, order.id, event)
            .await
            .unwrap();
    }

    let received = repos.purchases.get(&manager, order.id).await.unwrap();
    assert_eq!(received.status, PurchaseStatus::Received);
    assert!(received.received_at.is_some());
    let level = repos
        .inventory
        .stock_level(&manager, part.id, branch)
        .await
        .unwrap();
    assert_eq!(level.quantity, 13);
}

#[tokio::test]
async fn receiving_an_unknown_part_changes_nothing() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let manager = ctx(Role::Manager, branch);
    let known = stocked_part(&repos, &manager, "K-1", 0).await;
    let supplier_id = registered_supplier(&repos, &manager).await;

    let order = repos
        .purchases
        .create(
            &manager,
            CreatePurchaseOrderInput {
                supplier_id,
                items: vec![
                    PurchaseItemInput {
                        part_id: known.id,
                        quantity: 5,
                        unit_price: dec!(1),
                    },
                    PurchaseItemInput {
                        part_id: hivedrive_shared::types::PartId::new(),
                        quantity: 5,
                        unit_price: dec!(1),
                    },
                ],
                notes: None,
                expected_date: None,
            },
        )
        .await
        .unwrap();
    for event in [PurchaseEvent::Approve, PurchaseEvent::Order] {
        repos
            .purchases
            .transition(&manager, order.id, event)
            .await
            .unwrap();
    }

    let err = repos
        .purchases
        .transition(&manager, order.id, PurchaseEvent::Receive)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound { .. }));
    let still_ordered = repos.purchases.get(&manager, order.id).await.unwrap();
    assert_eq!(still_ordered.status, PurchaseStatus::Ordered);
    let level = repos
        .inventory
        .stock_level(&manager, known.id, branch)
        .await
        .unwrap();
    assert_eq!(level.quantity, 0);
}

#[tokio::test]
async fn expenses_may_take_the_balance_negative() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let treasurer = ctx(Role::Treasurer, branch);

    let receipt = repos
        .treasury
        .add_expense(
            &treasurer,
            CreateExpenseInput {
                category: "utilities".to_string(),
                amount: dec!(75.50),
                description: Some("Electricity".to_string()),
                expense_date: None,
            },
        )
        .await
        .unwrap();

    assert!(receipt.expense.expense_number.starts_with("EXP-"));
    assert_eq!(receipt.transaction.transaction_type, TransactionType::Expense);
    assert_eq!(receipt.transaction.balance_after, dec!(-75.50));

    let summary = repos
        .treasury
        .daily_summary(&treasurer, branch, receipt.expense.expense_date)
        .await
        .unwrap();
    assert_eq!(summary.expense, dec!(75.50));
    assert_eq!(summary.net, dec!(-75.50));
}

#[tokio::test]
async fn unposted_branch_reads_zero_balance() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let account = repos
        .treasury
        .balance(&ctx(Role::Treasurer, branch), branch)
        .await
        .unwrap();
    assert_eq!(account.current_balance, Decimal::ZERO);
}

#[tokio::test]
async fn quotation_list_filters_searches_and_pages() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let reception = ctx(Role::Reception, branch);
    let owner = registered_owner(&repos, &reception).await;
    let mut numbers = Vec::new();
    for _ in 0..5 {
        let q = repos
            .quotations
            .create(
                &reception,
                quotation_input(
                    &owner,
                    vec![line(dec!(1), dec!(10))],
                    Decimal::ZERO,
                    Decimal::ZERO,
                ),
            )
            .await
            .unwrap();
        numbers.push(q.quotation_number);
    }
    repos
        .quotations
        .create(
            &ctx(Role::Reception, BranchId::new()),
            quotation_input(&owner, vec![line(dec!(1), dec!(10))], Decimal::ZERO, Decimal::ZERO),
        )
        .await
        .unwrap();

    let query = QuotationQuery::filtered(QuotationFilter {
        branch_id: Some(branch),
        ..QuotationFilter::default()
    })
    .with_page(PageRequest::new(1, 2));
    let page = repos.quotations.list(&reception, &query).await.unwrap();
    assert_eq!(page.total_count, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages, 3);

    let mut search = QuotationQuery::default();
    search.search = Some(numbers[2].to_lowercase());
    let found = repos.quotations.list(&reception, &search).await.unwrap();
    assert_eq!(found.total_count, 1);
    assert_eq!(found.items[0].quotation_number, numbers[2]);
}

#[tokio::test]
async fn tied_sort_keys_page_without_gaps_or_repeats() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let reception = ctx(Role::Reception, branch);
    let owner = registered_owner(&repos, &reception).await;
    let mut created = Vec::new();
    for _ in 0..7 {
        let input = quotation_input(&owner, vec![line(dec!(1), dec!(10))], dec!(0), dec!(0));
        created.push(repos.quotations.create(&reception, input).await.unwrap().id);
    }

    for direction in [SortDirection::Asc, SortDirection::Desc] {
        let mut seen = Vec::new();
        for page in 1..=4 {
            let mut query = QuotationQuery::default().with_page(PageRequest::new(page, 2));
            query.sort = DocumentSort::Total;
            query.direction = direction;
            let listed = repos.quotations.list(&reception, &query).await.unwrap();
            seen.extend(listed.items.into_iter().map(|q| q.id));
        }
        assert_eq!(seen.len(), created.len());
        let mut sorted = seen.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), created.len());
        if direction == SortDirection::Asc {
            assert_eq!(seen, sorted);
        }
    }
}

#[tokio::test]
async fn documents_require_registered_parties() {
    let repos = memory_repos();
    let reception = ctx(Role::Reception, BranchId::new());
    let owner = registered_owner(&repos, &reception).await;
    let neighbour = registered_owner(&repos, &reception).await;

    let mut unknown_vehicle =
        quotation_input(&owner, vec![line(dec!(1), dec!(10))], dec!(0), dec!(0));
    unknown_vehicle.vehicle_id = Uuid::now_v7();
    let err = repos
        .quotations
        .create(&reception, unknown_vehicle)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { entity: "Vehicle", .. }));

    let mut unknown_customer = work_order_input(&owner, vec![line(dec!(1), dec!(10))]);
    unknown_customer.customer_id = Uuid::now_v7();
    let err = repos
        .work_orders
        .create(&reception, unknown_customer)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { entity: "Customer", .. }));

    let mut borrowed = work_order_input(&owner, vec![line(dec!(1), dec!(10))]);
    borrowed.vehicle_id = neighbour.vehicle_id;
    let err = repos
        .work_orders
        .create(&reception, borrowed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let listed = repos
        .quotations
        .list(&reception, &QuotationQuery::default())
        .await
        .unwrap();
    assert_eq!(listed.total_count, 0);
}

#[tokio::test]
async fn purchase_order_requires_registered_supplier() {
    let repos = memory_repos();
    let manager = ctx(Role::Manager, BranchId::new());
    let part = stocked_part(&repos, &manager, "SUP-1", 0).await;

    let err = repos
        .purchases
        .create(
            &manager,
            CreatePurchaseOrderInput {
                supplier_id: Uuid::now_v7(),
                items: vec![PurchaseItemInput {
                    part_id: part.id,
                    quantity: 1,
                    unit_price: dec!(5),
                }],
                notes: None,
                expected_date: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { entity: "Supplier", .. }));
}

#[tokio::test]
async fn vehicles_belong_to_a_registered_customer() {
    let repos = memory_repos();
    let reception = ctx(Role::Reception, BranchId::new());
    let owner = registered_owner(&repos, &reception).await;
    let customer_id = CustomerId::from_uuid(owner.customer_id);
    let vehicle = |customer_id, plate: &str| CreateVehicleInput {
        customer_id,
        plate_number: plate.to_string(),
        chassis_number: None,
        brand: None,
        model: None,
        year: None,
        color: None,
    };

    let second = repos
        .registry
        .create_vehicle(&reception, vehicle(customer_id, " abc 123 "))
        .await
        .unwrap();
    assert_eq!(second.plate_number, "ABC 123");

    let duplicate = repos
        .registry
        .create_vehicle(&reception, vehicle(customer_id, "ABC 123"))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, AppError::Conflict(_)));

    let orphan = repos
        .registry
        .create_vehicle(&reception, vehicle(CustomerId::new(), "XYZ 9"))
        .await
        .unwrap_err();
    assert!(matches!(orphan, AppError::NotFound { .. }));

    let owned = repos
        .registry
        .list_vehicles(
            &reception,
            &VehicleQuery::filtered(VehicleFilter {
                customer_id: Some(customer_id),
            }),
        )
        .await
        .unwrap();
    assert_eq!(owned.total_count, 2);
    assert!(owned.items.iter().all(|v| v.customer_id == customer_id));
}

#[tokio::test]
async fn deactivated_part_leaves_low_stock_and_active_listing() {
    let repos = memory_repos();
    let branch = BranchId::new();
    let keeper = ctx(Role::Warehouse, branch);
    let retired = stocked_part(&repos, &keeper, "OLD-1", 0).await;
    let current = stocked_part(&repos, &keeper, "NEW-1", 0).await;

    let updated = repos
        .inventory
        .update_part(
            &keeper,
            retired.id,
            UpdatePartInput {
                is_active: Some(false),
                sell_price: Some(dec!(70)),
                ..UpdatePartInput::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.is_active);
    assert_eq!(updated.sell_price, dec!(70));
    assert_eq!(updated.sku, retired.sku);
    assert_eq!(repos.inventory.get_part(&keeper, retired.id).await.unwrap(), updated);

    let low = repos.inventory.low_stock(&keeper, branch, 5).await.unwrap();
    let ids: Vec<_> = low.iter().map(|item| item.part.id).collect();
    assert_eq!(ids, vec![current.id]);

    let active = repos
        .inventory
        .list_parts(
            &keeper,
            &PartQuery::filtered(PartFilter {
                is_active: Some(true),
                ..PartFilter::default()
            }),
        )
        .await
        .unwrap();
    assert_eq!(active.total_count, 1);
    assert_eq!(active.items[0].id, current.id);

    let forbidden = repos
        .inventory
        .update_part(
            &ctx(Role::Technician, branch),
            current.id,
            UpdatePartInput::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(forbidden, AppError::Forbidden(_)));
}
