//! Shared test fixtures and builders
//!
//! Test-only construction helpers with sensible defaults, so tests specify
//! just the fields they care about. The in-memory port adapters themselves
//! live in each domain crate behind its `mock` feature; this crate pulls
//! those features in and adds the data side.

pub mod fixtures;
pub mod builders;

pub use fixtures::{IdFixtures, MoneyFixtures, TemporalFixtures};
pub use builders::{BudgetBuilder, ContactBuilder, InvoiceBuilder, PurchaseOrderBuilder};
