//! Infrastructure Database Layer
//!
//! SQLx/PostgreSQL adapters for the domain port traits. Each repository
//! hydrates full domain aggregates (header plus lines) and writes them back,
//! keeping multi-row writes for a single aggregate inside one transaction.
//!
//! Statuses and enums are stored as text columns and parsed through the
//! domain `FromStr` implementations, so an unknown value in the database
//! surfaces as a storage error rather than a silent default.

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use repositories::analytics::PgAnalyticsRepository;
pub use repositories::budgets::PgBudgetRepository;
pub use repositories::documents::PgDocumentRepository;
pub use repositories::party::PgPartyRepository;
