//! HTTP-level tests for the portal payment and provisioning surface
//!
//! The full router runs against in-memory port adapters and a mock gateway;
//! signatures are real HMAC-SHA256 values computed with the test secret.

use std::sync::Arc;

use axum_test::TestServer;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use domain_analytics::ports::mock::{MockCatalog, MockPartnerDirectory, MockRules};
use domain_analytics::AutoAssigner;
use domain_budget::ports::mock::MockBudgets;
use domain_budget::{AccrualEngine, BudgetService};
use domain_documents::ports::mock::MockDocuments;
use domain_documents::ports::InvoicePort;
use domain_documents::LifecycleService;
use domain_party::ports::mock::{MockContacts, MockPortalUsers};
use domain_party::ports::ContactPort;
use domain_party::PortalProvisioner;
use interface_api::config::ApiConfig;
use interface_api::gateway::{mock::MockGateway, sign};
use interface_api::{create_router, AppState};
use test_utils::{BudgetBuilder, ContactBuilder, IdFixtures, InvoiceBuilder, PurchaseOrderBuilder};

const TEST_SECRET: &str = "test_gateway_secret";

struct Harness {
    server: TestServer,
    docs: Arc<MockDocuments>,
    budgets: Arc<MockBudgets>,
    contacts: Arc<MockContacts>,
}

fn harness() -> Harness {
    let docs = MockDocuments::new();
    let budgets = Arc::new(MockBudgets::new());
    let contacts = Arc::new(MockContacts::new());
    let portal_users = Arc::new(MockPortalUsers::new());
    let rules = Arc::new(MockRules::new());

    let assigner = Arc::new(AutoAssigner::new(
        rules.clone(),
        Arc::new(MockCatalog::new()),
        Arc::new(MockPartnerDirectory::new()),
    ));
    let accrual = Arc::new(AccrualEngine::new(budgets.clone(), docs.clone()));
    let budget_service = Arc::new(BudgetService::new(budgets.clone()));
    let lifecycle = Arc::new(LifecycleService::new(
        docs.clone(),
        docs.clone(),
        docs.clone(),
        docs.clone(),
        docs.clone(),
        docs.clone(),
        assigner,
        accrual.clone(),
    ));
    let provisioner = Arc::new(PortalProvisioner::new(
        contacts.clone(),
        portal_users.clone(),
    ));

    let config = ApiConfig {
        razorpay_key_id: "rzp_test_mock".to_string(),
        razorpay_key_secret: TEST_SECRET.to_string(),
        ..ApiConfig::default()
    };

    let state = AppState {
        config,
        pool: None,
        gateway: Arc::new(MockGateway::new()),
        lifecycle,
        budget_service,
        accrual,
        provisioner,
        accounts: Arc::new(domain_analytics::ports::mock::MockAccounts::new()),
        rules,
        budgets: budgets.clone(),
        orders: docs.clone(),
        sales_orders: docs.clone(),
        bills: docs.clone(),
        invoices: docs.clone(),
        bill_payments: docs.clone(),
        invoice_payments: docs.clone(),
        contacts: contacts.clone(),
    };

    let server = TestServer::new(create_router(state)).expect("router builds");

    Harness {
        server,
        docs,
        budgets,
        contacts,
    }
}

fn admin_token() -> String {
    interface_api::auth::create_token(
        "user-1",
        vec!["admin".to_string()],
        &ApiConfig::default().jwt_secret,
        3600,
    )
    .expect("token signs")
}

/// Seeds a posted, payable invoice with the given total and returns its uuid
async fn seed_invoice(docs: &MockDocuments, total: i64) -> uuid::Uuid {
    let invoice = InvoiceBuilder::new(IdFixtures::party_id())
        .with_line(total, 1)
        .posted()
        .build();
    let id = *invoice.id.as_uuid();
    docs.insert(invoice).await.expect("insert invoice");
    id
}

#[tokio::test]
async fn create_order_returns_gateway_handle() {
    let h = harness();
    let invoice_id = seed_invoice(&h.docs, 118_000).await;

    let response = h
        .server
        .post("/portal/payments")
        .json(&json!({
            "action": "create_order",
            "invoiceId": invoice_id,
            "amount": 118000,
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    assert!(body["orderId"].as_str().unwrap().starts_with("order_mock"));
    // ₹118000 converted to paise for the gateway.
    assert_eq!(body["amount"], json!(11_800_000));
    assert_eq!(body["currency"], json!("INR"));
    assert_eq!(body["keyId"], json!("rzp_test_mock"));
}

#[tokio::test]
async fn create_order_rejects_unknown_invoice() {
    let h = harness();

    let response = h
        .server
        .post("/portal/payments")
        .json(&json!({
            "action": "create_order",
            "invoiceId": uuid::Uuid::new_v4(),
            "amount": 100,
        }))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Invoice not found"));
}

#[tokio::test]
async fn create_order_rejects_unpayable_invoice() {
    let h = harness();

    // Draft invoice: never payable from the portal.
    let invoice = InvoiceBuilder::new(IdFixtures::party_id())
        .with_line(10_000, 1)
        .build();
    let invoice_id = *invoice.id.as_uuid();
    h.docs.insert(invoice).await.unwrap();

    let response = h
        .server
        .post("/portal/payments")
        .json(&json!({
            "action": "create_order",
            "invoiceId": invoice_id,
            "amount": 10000,
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], json!("Invoice is not payable"));
}

#[tokio::test]
async fn create_order_rejects_amount_over_balance() {
    let h = harness();
    let invoice_id = seed_invoice(&h.docs, 50_000).await;

    let response = h
        .server
        .post("/portal/payments")
        .json(&json!({
            "action": "create_order",
            "invoiceId": invoice_id,
            "amount": 60000,
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Amount exceeds balance due"));
}

#[tokio::test]
async fn verified_payments_accumulate_to_paid() {
    use domain_budget::ports::BudgetPort;

    let h = harness();

    // Income budget behind the invoice's line account: it must move only
    // when cash lands, through the portal flow itself.
    let account = IdFixtures::account_id();
    let budget = BudgetBuilder::income(account, 200_000).confirmed().build();
    let budget_id = budget.id;
    h.budgets.insert(budget).await.unwrap();

    let invoice = InvoiceBuilder::new(IdFixtures::party_id())
        .with_tagged_line(118_000, 1, account)
        .posted()
        .build();
    let invoice_id = *invoice.id.as_uuid();
    h.docs.insert(invoice).await.unwrap();

    assert_eq!(
        h.budgets.get(budget_id).await.unwrap().achieved_amount.amount(),
        rust_decimal::Decimal::ZERO
    );

    // First payment: 50000 of 118000.
    let response = h
        .server
        .post("/portal/payments")
        .json(&json!({
            "action": "verify_payment",
            "invoiceId": invoice_id,
            "razorpayOrderId": "order_A",
            "razorpayPaymentId": "pay_A",
            "razorpaySignature": sign("order_A", "pay_A", TEST_SECRET),
            "amount": 50000,
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    // Decimal amounts serialize as strings on the wire.
    assert_eq!(body["newPaidAmount"], json!("50000"));
    assert_eq!(body["newBalanceDue"], json!("68000"));
    assert_eq!(body["newStatus"], json!("partially_paid"));
    assert_eq!(body["razorpayPaymentId"], json!("pay_A"));
    assert!(body["paymentNumber"].as_str().unwrap().starts_with("RZP-"));

    // Second payment settles the invoice.
    let response = h
        .server
        .post("/portal/payments")
        .json(&json!({
            "action": "verify_payment",
            "invoiceId": invoice_id,
            "razorpayOrderId": "order_B",
            "razorpayPaymentId": "pay_B",
            "razorpaySignature": sign("order_B", "pay_B", TEST_SECRET),
            "amount": 68000,
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["newPaidAmount"], json!("118000"));
    assert_eq!(body["newBalanceDue"], json!("0"));
    assert_eq!(body["newStatus"], json!("paid"));

    // The paid amount came from the ledger, not the claimed delta.
    assert_eq!(h.docs.invoice_payments().await.len(), 2);

    // Cash receipt triggered the income accrual; the full recompute counts
    // the posted invoice's line subtotals.
    assert_eq!(
        h.budgets.get(budget_id).await.unwrap().achieved_amount.amount(),
        rust_decimal::Decimal::from(118_000)
    );
}

#[tokio::test]
async fn invalid_signature_creates_no_record() {
    let h = harness();
    let invoice_id = seed_invoice(&h.docs, 118_000).await;

    let response = h
        .server
        .post("/portal/payments")
        .json(&json!({
            "action": "verify_payment",
            "invoiceId": invoice_id,
            "razorpayOrderId": "order_A",
            "razorpayPaymentId": "pay_A",
            "razorpaySignature": sign("order_A", "pay_TAMPERED", TEST_SECRET),
            "amount": 50000,
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Payment verification failed"));

    // No payment record, invoice untouched.
    assert!(h.docs.invoice_payments().await.is_empty());
    let invoice = h
        .docs
        .get(core_kernel::InvoiceId::from(invoice_id))
        .await
        .unwrap();
    assert_eq!(invoice.paid_amount.amount(), dec!(0));
}

#[tokio::test]
async fn replayed_callback_does_not_double_count() {
    let h = harness();
    let invoice_id = seed_invoice(&h.docs, 100_000).await;

    let body = json!({
        "action": "verify_payment",
        "invoiceId": invoice_id,
        "razorpayOrderId": "order_A",
        "razorpayPaymentId": "pay_once",
        "razorpaySignature": sign("order_A", "pay_once", TEST_SECRET),
        "amount": 60000,
    });

    let first = h.server.post("/portal/payments").json(&body).await;
    first.assert_status_ok();

    let second = h.server.post("/portal/payments").json(&body).await;
    second.assert_status_ok();
    let replayed: Value = second.json();
    assert_eq!(replayed["newPaidAmount"], json!("60000"));
    assert_eq!(replayed["newStatus"], json!("partially_paid"));

    assert_eq!(h.docs.invoice_payments().await.len(), 1);
}

#[tokio::test]
async fn provisioning_creates_portal_accounts() {
    let h = harness();

    h.contacts
        .insert(
            ContactBuilder::customer("Sharma Residence")
                .with_email("sharma@example.com")
                .build(),
        )
        .await
        .unwrap();
    h.contacts
        .insert(ContactBuilder::vendor("Wood Works").with_email("wood@example.com").build())
        .await
        .unwrap();

    let response = h.server.post("/portal/users").json(&json!({})).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["email"], json!("sharma@example.com"));
    assert_eq!(results[0]["password"], json!("Sharma@123"));
    assert_eq!(results[0]["status"], json!("created"));

    // A second sweep reports the same account as existing.
    let response = h.server.post("/portal/users").json(&json!({})).await;
    let body: Value = response.json();
    assert_eq!(body["results"][0]["status"], json!("already_exists"));
}

#[tokio::test]
async fn demo_user_provisioning() {
    let h = harness();

    let response = h
        .server
        .post("/portal/users")
        .json(&json!({ "createDemoUser": true }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["results"][0]["email"], json!("portal@shivfurniture.com"));
    assert_eq!(body["results"][0]["password"], json!("Portal@123"));
    assert_eq!(body["results"][0]["status"], json!("created"));
}

#[tokio::test]
async fn admin_routes_require_auth() {
    let h = harness();

    let response = h.server.get("/api/v1/budgets").await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn admin_routes_accept_valid_token() {
    let h = harness();

    let response = h
        .server
        .get("/api/v1/budgets")
        .authorization_bearer(admin_token())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn confirming_order_over_api_settles_bill_and_deducts_budget() {
    use domain_budget::ports::BudgetPort;

    let h = harness();

    let account = IdFixtures::account_id();
    let budget = BudgetBuilder::expense(account, 200_000).confirmed().build();
    let budget_id = budget.id;
    h.budgets.insert(budget).await.unwrap();

    let order = PurchaseOrderBuilder::new(IdFixtures::party_id())
        .with_tagged_line(28_000, 2, account)
        .build();
    let order_id = *order.id.as_uuid();
    domain_documents::ports::PurchaseOrderPort::insert(h.docs.as_ref(), order)
        .await
        .unwrap();

    let response = h
        .server
        .post(&format!("/api/v1/purchase-orders/{}/confirm", order_id))
        .authorization_bearer(admin_token())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["order"]["status"], json!("confirmed"));
    assert_eq!(body["bill"]["status"], json!("paid"));
    assert_eq!(body["bill"]["paidAmount"], json!("56000"));
    assert_eq!(body["payment"]["amount"], json!("56000"));
    assert!(body["payment"]["paymentNumber"]
        .as_str()
        .unwrap()
        .starts_with("BPAY-"));

    // The settled bill already fed the expense budget.
    let budget = h.budgets.get(budget_id).await.unwrap();
    assert_eq!(budget.achieved_amount.amount(), rust_decimal::Decimal::from(56_000));
}
