//! End-to-end lifecycle tests over in-memory adapters
//!
//! The accrual source is the document store itself, so budget refreshes see
//! exactly the documents the lifecycle service wrote.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AnalyticalAccountId, Currency, DateRange, Money, PartyId, ProductId, TagId};
use domain_analytics::ports::mock::{MockCatalog, MockPartnerDirectory, MockRules};
use domain_analytics::{AssignmentRuleBuilder, AutoAssigner, RulePort};
use domain_budget::ports::mock::MockBudgets;
use domain_budget::{AccrualEngine, Budget, BudgetPort, BudgetType};
use domain_documents::ports::mock::MockDocuments;
use domain_documents::{
    DocumentStatus, InvoicePayment, LifecycleService, NewDocumentLine, NewPurchaseOrder,
    NewSalesOrder, PaymentMode, PaymentStatus,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn inr(amount: i64) -> Money {
    Money::new(Decimal::from(amount), Currency::INR)
}

fn line(product: ProductId, qty: i64, unit_price: i64) -> NewDocumentLine {
    NewDocumentLine {
        product_id: product,
        quantity: Decimal::from(qty),
        unit_price: inr(unit_price),
        analytical_account_id: None,
        budget_id: None,
    }
}

fn tagged_line(
    product: ProductId,
    qty: i64,
    unit_price: i64,
    account: AnalyticalAccountId,
) -> NewDocumentLine {
    NewDocumentLine {
        analytical_account_id: Some(account),
        ..line(product, qty, unit_price)
    }
}

struct Harness {
    docs: Arc<MockDocuments>,
    budgets: Arc<MockBudgets>,
    rules: Arc<MockRules>,
    catalog: Arc<MockCatalog>,
    partners: Arc<MockPartnerDirectory>,
    service: LifecycleService,
}

fn harness() -> Harness {
    let docs = MockDocuments::new();
    let budgets = Arc::new(MockBudgets::new());
    let rules = Arc::new(MockRules::new());
    let catalog = Arc::new(MockCatalog::new());
    let partners = Arc::new(MockPartnerDirectory::new());

    let assigner = Arc::new(AutoAssigner::new(
        rules.clone(),
        catalog.clone(),
        partners.clone(),
    ));
    let accrual = Arc::new(AccrualEngine::new(budgets.clone(), docs.clone()));

    let service = LifecycleService::new(
        docs.clone(),
        docs.clone(),
        docs.clone(),
        docs.clone(),
        docs.clone(),
        docs.clone(),
        assigner,
        accrual,
    );

    Harness {
        docs,
        budgets,
        rules,
        catalog,
        partners,
        service,
    }
}

/// A confirmed expense/income budget over the whole of 2026
async fn confirmed_budget(
    budgets: &MockBudgets,
    account: AnalyticalAccountId,
    budget_type: BudgetType,
    amount: i64,
) -> core_kernel::BudgetId {
    let period = DateRange::new(date(2026, 1, 1), date(2026, 12, 31)).unwrap();
    let mut budget = Budget::new("test budget", period, account, budget_type, inr(amount)).unwrap();
    budget.confirm().unwrap();
    let id = budget.id;
    budgets.insert(budget).await.unwrap();
    id
}

#[tokio::test]
async fn confirming_order_settles_bill_payment_and_budget() {
    let h = harness();
    let account = AnalyticalAccountId::new();
    let budget_id = confirmed_budget(&h.budgets, account, BudgetType::Expense, 200_000).await;

    let order = h
        .service
        .create_purchase_order(NewPurchaseOrder {
            vendor_id: PartyId::new(),
            order_date: date(2026, 3, 10),
            expected_delivery_date: None,
            currency: Currency::INR,
            notes: None,
            lines: vec![
                tagged_line(ProductId::new(), 2, 28_000, account),
                tagged_line(ProductId::new(), 1, 17_000, account),
            ],
        })
        .await
        .unwrap();
    assert_eq!(order.total_amount, inr(73_000));
    assert_eq!(order.status, DocumentStatus::Draft);

    let confirmed = h.service.confirm_purchase_order(order.id).await.unwrap();

    // Exactly one bill, fully paid, mirroring the order.
    assert_eq!(confirmed.order.status, DocumentStatus::Confirmed);
    assert_eq!(confirmed.bill.status, DocumentStatus::Paid);
    assert_eq!(confirmed.bill.total_amount, inr(73_000));
    assert_eq!(confirmed.bill.paid_amount, inr(73_000));
    assert_eq!(confirmed.bill.lines.len(), 2);
    assert_eq!(confirmed.bill.purchase_order_id, Some(order.id));

    // Exactly one payment of the full amount.
    assert_eq!(confirmed.payment.amount, inr(73_000));
    assert_eq!(confirmed.payment.status, PaymentStatus::Completed);
    let payments = h.docs.bill_payments().await;
    assert_eq!(payments.len(), 1);
    assert!(payments[0]
        .reference
        .as_deref()
        .unwrap()
        .contains(&order.order_number));

    // The paid bill already accrues: the budget was deducted.
    let budget = h.budgets.get(budget_id).await.unwrap();
    assert_eq!(budget.achieved_amount, inr(73_000));
    assert_eq!(budget.remaining_balance, inr(127_000));
}

#[tokio::test]
async fn sales_order_pairs_with_draft_invoice() {
    let h = harness();
    let customer = PartyId::new();

    let pair = h
        .service
        .create_sales_order(NewSalesOrder {
            customer_id: customer,
            order_date: date(2026, 2, 20),
            currency: Currency::INR,
            lines: vec![line(ProductId::new(), 2, 45_000), line(ProductId::new(), 1, 28_000)],
        })
        .await
        .unwrap();

    assert_eq!(pair.order.total_amount, inr(118_000));
    assert_eq!(pair.invoice.status, DocumentStatus::Draft);
    assert_eq!(pair.invoice.customer_id, customer);
    assert_eq!(pair.invoice.total_amount, inr(118_000));
    assert_eq!(pair.invoice.sales_order_id, Some(pair.order.id));
    assert_eq!(pair.invoice.lines.len(), 2);

    // Exactly one invoice exists.
    let invoices = domain_documents::InvoicePort::list(h.docs.as_ref()).await.unwrap();
    assert_eq!(invoices.len(), 1);
}

#[tokio::test]
async fn bill_posting_and_cancellation_move_expense_budget() {
    let h = harness();
    let account = AnalyticalAccountId::new();
    let budget_id = confirmed_budget(&h.budgets, account, BudgetType::Expense, 100_000).await;

    let bill = h
        .service
        .create_vendor_bill(domain_documents::NewVendorBill {
            vendor_id: PartyId::new(),
            bill_date: date(2026, 4, 1),
            due_date: None,
            currency: Currency::INR,
            lines: vec![tagged_line(ProductId::new(), 1, 40_000, account)],
        })
        .await
        .unwrap();

    // Draft bills never accrue.
    assert_eq!(h.budgets.get(budget_id).await.unwrap().achieved_amount, inr(0));

    h.service.post_vendor_bill(bill.id).await.unwrap();
    assert_eq!(
        h.budgets.get(budget_id).await.unwrap().achieved_amount,
        inr(40_000)
    );

    // Cancellation self-corrects the accrual on the next full recompute.
    h.service.cancel_vendor_bill(bill.id).await.unwrap();
    assert_eq!(h.budgets.get(budget_id).await.unwrap().achieved_amount, inr(0));
}

#[tokio::test]
async fn income_recognized_on_payment_not_posting() {
    let h = harness();
    let account = AnalyticalAccountId::new();
    let budget_id = confirmed_budget(&h.budgets, account, BudgetType::Income, 200_000).await;

    let pair = h
        .service
        .create_sales_order(NewSalesOrder {
            customer_id: PartyId::new(),
            order_date: date(2026, 5, 1),
            currency: Currency::INR,
            lines: vec![tagged_line(ProductId::new(), 1, 118_000, account)],
        })
        .await
        .unwrap();

    h.service.post_customer_invoice(pair.invoice.id).await.unwrap();

    // Posting alone must not move the income budget.
    assert_eq!(h.budgets.get(budget_id).await.unwrap().achieved_amount, inr(0));

    let payment = InvoicePayment::completed(pair.invoice.id, inr(50_000), PaymentMode::Online);
    h.service.record_invoice_payment(payment).await.unwrap();

    // Cash receipt triggers the refresh; the full recompute then counts the
    // posted invoice's lines.
    assert_eq!(
        h.budgets.get(budget_id).await.unwrap().achieved_amount,
        inr(118_000)
    );
}

#[tokio::test]
async fn cumulative_payment_progression() {
    let h = harness();

    let pair = h
        .service
        .create_sales_order(NewSalesOrder {
            customer_id: PartyId::new(),
            order_date: date(2026, 6, 1),
            currency: Currency::INR,
            lines: vec![line(ProductId::new(), 1, 118_000)],
        })
        .await
        .unwrap();
    h.service.post_customer_invoice(pair.invoice.id).await.unwrap();

    let first = h
        .service
        .record_invoice_payment(InvoicePayment::completed(
            pair.invoice.id,
            inr(50_000),
            PaymentMode::Online,
        ))
        .await
        .unwrap();
    assert_eq!(first.paid_amount, inr(50_000));
    assert_eq!(first.balance_due, inr(68_000));
    assert_eq!(first.status, DocumentStatus::PartiallyPaid);

    let second = h
        .service
        .record_invoice_payment(InvoicePayment::completed(
            pair.invoice.id,
            inr(68_000),
            PaymentMode::Online,
        ))
        .await
        .unwrap();
    assert_eq!(second.paid_amount, inr(118_000));
    assert_eq!(second.balance_due, inr(0));
    assert_eq!(second.status, DocumentStatus::Paid);
}

#[tokio::test]
async fn replayed_gateway_reference_does_not_double_credit() {
    let h = harness();

    let pair = h
        .service
        .create_sales_order(NewSalesOrder {
            customer_id: PartyId::new(),
            order_date: date(2026, 6, 1),
            currency: Currency::INR,
            lines: vec![line(ProductId::new(), 1, 100_000)],
        })
        .await
        .unwrap();
    h.service.post_customer_invoice(pair.invoice.id).await.unwrap();

    let original = InvoicePayment::from_gateway(
        pair.invoice.id,
        inr(60_000),
        "pay_replay1",
        "order_abc",
    );
    let first = h.service.record_invoice_payment(original).await.unwrap();
    assert!(!first.replayed);
    assert_eq!(first.paid_amount, inr(60_000));

    let replay = InvoicePayment::from_gateway(
        pair.invoice.id,
        inr(60_000),
        "pay_replay1",
        "order_abc",
    );
    let second = h.service.record_invoice_payment(replay).await.unwrap();
    assert!(second.replayed);
    assert_eq!(second.paid_amount, inr(60_000));
    assert_eq!(second.payment_number, first.payment_number);

    assert_eq!(h.docs.invoice_payments().await.len(), 1);
}

#[tokio::test]
async fn untagged_lines_are_auto_assigned_on_creation() {
    let h = harness();

    let tag = TagId::new();
    let vendor = PartyId::new();
    let product = ProductId::new();
    let account = AnalyticalAccountId::new();

    h.partners.insert(vendor, HashSet::from([tag])).await;
    h.rules
        .insert(
            AssignmentRuleBuilder::new("vendor tag rule")
                .partner_tag(tag)
                .analytical_account(account)
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let order = h
        .service
        .create_purchase_order(NewPurchaseOrder {
            vendor_id: vendor,
            order_date: date(2026, 7, 1),
            expected_delivery_date: None,
            currency: Currency::INR,
            notes: None,
            lines: vec![line(product, 1, 5_000)],
        })
        .await
        .unwrap();

    assert_eq!(order.lines[0].analytical_account_id, Some(account));
}

#[tokio::test]
async fn vendor_change_rescans_every_line() {
    let h = harness();

    let tag = TagId::new();
    let tagged_vendor = PartyId::new();
    let plain_vendor = PartyId::new();
    let account = AnalyticalAccountId::new();

    h.partners.insert(tagged_vendor, HashSet::from([tag])).await;
    h.rules
        .insert(
            AssignmentRuleBuilder::new("tagged vendors")
                .partner_tag(tag)
                .analytical_account(account)
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    // Created against the plain vendor: no assignment.
    let order = h
        .service
        .create_purchase_order(NewPurchaseOrder {
            vendor_id: plain_vendor,
            order_date: date(2026, 7, 1),
            expected_delivery_date: None,
            currency: Currency::INR,
            notes: None,
            lines: vec![line(ProductId::new(), 1, 5_000), line(ProductId::new(), 2, 3_000)],
        })
        .await
        .unwrap();
    assert!(order.lines.iter().all(|l| l.analytical_account_id.is_none()));

    // Switching to the tagged vendor re-scans the whole document.
    let updated = h
        .service
        .change_purchase_order_vendor(order.id, tagged_vendor)
        .await
        .unwrap();
    assert!(updated
        .lines
        .iter()
        .all(|l| l.analytical_account_id == Some(account)));

    // And back again drops the tags on every line.
    let reverted = h
        .service
        .change_purchase_order_vendor(order.id, plain_vendor)
        .await
        .unwrap();
    assert!(reverted.lines.iter().all(|l| l.analytical_account_id.is_none()));
}

#[tokio::test]
async fn category_rules_resolve_through_catalog() {
    let h = harness();
    let category = core_kernel::CategoryId::new();
    let product = ProductId::new();
    let account = AnalyticalAccountId::new();
    let customer = PartyId::new();

    h.catalog.insert(product, category).await;
    h.rules
        .insert(
            AssignmentRuleBuilder::new("category rule")
                .product_category(category)
                .analytical_account(account)
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let pair = h
        .service
        .create_sales_order(NewSalesOrder {
            customer_id: customer,
            order_date: date(2026, 8, 1),
            currency: Currency::INR,
            lines: vec![line(product, 1, 45_000)],
        })
        .await
        .unwrap();

    assert_eq!(pair.order.lines[0].analytical_account_id, Some(account));
    // The paired invoice carries the same tags.
    assert_eq!(pair.invoice.lines[0].analytical_account_id, Some(account));
}
