//! ERP Ledger Core - API Server Binary
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_DATABASE_URL` / `DATABASE_URL` - PostgreSQL connection string
//! * `API_RAZORPAY_KEY_ID` - Razorpay public key id
//! * `API_RAZORPAY_KEY_SECRET` - Razorpay secret key
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_analytics::AutoAssigner;
use domain_budget::{AccrualEngine, BudgetService};
use domain_documents::LifecycleService;
use domain_party::PortalProvisioner;
use infra_db::{PgAnalyticsRepository, PgBudgetRepository, PgDocumentRepository, PgPartyRepository};
use interface_api::config::ApiConfig;
use interface_api::gateway::RazorpayClient;
use interface_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config();
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting ERP Ledger Core API Server"
    );

    let pool = create_database_pool(&config.database_url).await?;
    verify_database(&pool).await?;

    let state = build_state(pool, config.clone());
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wires the repositories, services, and gateway client into the app state
fn build_state(pool: sqlx::PgPool, config: ApiConfig) -> AppState {
    let analytics = Arc::new(PgAnalyticsRepository::new(pool.clone()));
    let budgets = Arc::new(PgBudgetRepository::new(pool.clone()));
    let documents = Arc::new(PgDocumentRepository::new(pool.clone()));
    let party = Arc::new(PgPartyRepository::new(pool.clone()));

    let assigner = Arc::new(AutoAssigner::new(
        analytics.clone(),
        analytics.clone(),
        analytics.clone(),
    ));
    let accrual = Arc::new(AccrualEngine::new(budgets.clone(), budgets.clone()));
    let budget_service = Arc::new(BudgetService::new(budgets.clone()));
    let lifecycle = Arc::new(LifecycleService::new(
        documents.clone(),
        documents.clone(),
        documents.clone(),
        documents.clone(),
        documents.clone(),
        documents.clone(),
        assigner,
        accrual.clone(),
    ));
    let provisioner = Arc::new(PortalProvisioner::new(party.clone(), party.clone()));

    let gateway = Arc::new(RazorpayClient::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
        config.razorpay_api_url.clone(),
    ));

    AppState {
        config,
        pool: Some(pool),
        gateway,
        lifecycle,
        budget_service,
        accrual,
        provisioner,
        accounts: analytics.clone(),
        rules: analytics,
        budgets,
        orders: documents.clone(),
        sales_orders: documents.clone(),
        bills: documents.clone(),
        invoices: documents.clone(),
        bill_payments: documents.clone(),
        invoice_payments: documents,
        contacts: party,
    }
}

/// Loads API configuration from environment variables
///
/// Falls back to individual env vars and development defaults when the
/// prefixed form is incomplete.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|_| ApiConfig {
        host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        port: std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080),
        jwt_secret: std::env::var("API_JWT_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-in-production".to_string()),
        jwt_expiration_secs: std::env::var("API_JWT_EXPIRATION_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600),
        database_url: std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("API_DATABASE_URL"))
            .unwrap_or_else(|_| "postgres://localhost/erp".to_string()),
        log_level: std::env::var("API_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string()),
        razorpay_key_id: std::env::var("API_RAZORPAY_KEY_ID").unwrap_or_default(),
        razorpay_key_secret: std::env::var("API_RAZORPAY_KEY_SECRET").unwrap_or_default(),
        razorpay_api_url: std::env::var("API_RAZORPAY_API_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string()),
    })
}

/// Initializes the tracing subscriber for structured logging
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Creates a PostgreSQL connection pool
async fn create_database_pool(database_url: &str) -> Result<sqlx::PgPool, sqlx::Error> {
    tracing::info!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection established");
    Ok(pool)
}

/// Verifies database connectivity
///
/// Schema migrations are applied externally (see crates/infra_db/migrations).
async fn verify_database(pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    tracing::info!("Database ready");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
