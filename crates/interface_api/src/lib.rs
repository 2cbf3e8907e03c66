//! HTTP API Layer
//!
//! This crate provides the REST API for the ERP ledger core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: thin request handlers delegating to the domain services
//! - **Middleware**: JWT authentication and audit logging on admin routes
//! - **Portal surface**: payment verification and user provisioning, called
//!   by the customer portal
//! - **Gateway**: Razorpay REST client and HMAC signature verification
//!
//! Handlers depend on the domain port traits, not on concrete adapters, so
//! the whole HTTP surface can run against in-memory stores in tests.

pub mod config;
pub mod error;
pub mod auth;
pub mod middleware;
pub mod gateway;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_analytics::ports::{AccountPort, RulePort};
use domain_budget::ports::BudgetPort;
use domain_budget::{AccrualEngine, BudgetService};
use domain_documents::ports::{
    BillPaymentPort, InvoicePaymentPort, InvoicePort, PurchaseOrderPort, SalesOrderPort,
    VendorBillPort,
};
use domain_documents::LifecycleService;
use domain_party::ports::ContactPort;
use domain_party::PortalProvisioner;

use crate::config::ApiConfig;
use crate::gateway::PaymentGateway;
use crate::handlers::{analytics, budgets, documents, health, party, portal};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    /// Present when running against a real database; readiness pings it
    pub pool: Option<PgPool>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub lifecycle: Arc<LifecycleService>,
    pub budget_service: Arc<BudgetService>,
    pub accrual: Arc<AccrualEngine>,
    pub provisioner: Arc<PortalProvisioner>,
    pub accounts: Arc<dyn AccountPort>,
    pub rules: Arc<dyn RulePort>,
    pub budgets: Arc<dyn BudgetPort>,
    pub orders: Arc<dyn PurchaseOrderPort>,
    pub sales_orders: Arc<dyn SalesOrderPort>,
    pub bills: Arc<dyn VendorBillPort>,
    pub invoices: Arc<dyn InvoicePort>,
    pub bill_payments: Arc<dyn BillPaymentPort>,
    pub invoice_payments: Arc<dyn InvoicePaymentPort>,
    pub contacts: Arc<dyn ContactPort>,
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Portal surface, called by the customer-facing frontend
    let portal_routes = Router::new()
        .route("/payments", post(portal::payments))
        .route("/users", post(portal::provision_users));

    // Analytical accounting routes
    let analytics_routes = Router::new()
        .route("/", post(analytics::create_account))
        .route("/", get(analytics::list_accounts))
        .route("/:id/archive", post(analytics::archive_account));

    let rule_routes = Router::new()
        .route("/", post(analytics::create_rule))
        .route("/", get(analytics::list_rules))
        .route("/:id/archive", post(analytics::archive_rule));

    // Budget routes
    let budget_routes = Router::new()
        .route("/", post(budgets::create_budget))
        .route("/", get(budgets::list_budgets))
        .route("/:id", get(budgets::get_budget))
        .route("/:id/confirm", post(budgets::confirm_budget))
        .route("/:id/revise", post(budgets::revise_budget))
        .route("/:id/refresh", post(budgets::refresh_budget))
        .route("/:id/archive", post(budgets::archive_budget));

    // Document routes
    let purchase_order_routes = Router::new()
        .route("/", post(documents::create_purchase_order))
        .route("/", get(documents::list_purchase_orders))
        .route("/:id", get(documents::get_purchase_order))
        .route("/:id/confirm", post(documents::confirm_purchase_order))
        .route("/:id/cancel", post(documents::cancel_purchase_order));

    let sales_order_routes = Router::new()
        .route("/", post(documents::create_sales_order))
        .route("/", get(documents::list_sales_orders))
        .route("/:id", get(documents::get_sales_order))
        .route("/:id/confirm", post(documents::confirm_sales_order));

    let vendor_bill_routes = Router::new()
        .route("/", post(documents::create_vendor_bill))
        .route("/", get(documents::list_vendor_bills))
        .route("/:id", get(documents::get_vendor_bill))
        .route("/:id/post", post(documents::post_vendor_bill))
        .route("/:id/cancel", post(documents::cancel_vendor_bill))
        .route("/:id/payments", post(documents::record_bill_payment))
        .route("/:id/payments", get(documents::list_bill_payments));

    let invoice_routes = Router::new()
        .route("/", post(documents::create_invoice))
        .route("/", get(documents::list_invoices))
        .route("/:id", get(documents::get_invoice))
        .route("/:id/post", post(documents::post_invoice))
        .route("/:id/cancel", post(documents::cancel_invoice))
        .route("/:id/payments", get(documents::list_invoice_payments));

    let contact_routes = Router::new()
        .route("/", post(party::create_contact))
        .route("/", get(party::list_contacts))
        .route("/:id", get(party::get_contact))
        .route("/:id/archive", post(party::archive_contact));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/analytical-accounts", analytics_routes)
        .nest("/assignment-rules", rule_routes)
        .nest("/budgets", budget_routes)
        .nest("/purchase-orders", purchase_order_routes)
        .nest("/sales-orders", sales_order_routes)
        .nest("/vendor-bills", vendor_bill_routes)
        .nest("/customer-invoices", invoice_routes)
        .nest("/contacts", contact_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/portal", portal_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
