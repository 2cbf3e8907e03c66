//! Core Kernel - Foundational types and utilities for the ERP ledger
//!
//! This crate provides the fundamental building blocks used across all domain
//! modules:
//! - Money types with precise decimal arithmetic
//! - Inclusive date ranges for budget windows
//! - Strongly-typed identifiers
//! - Shared error types for domain and port boundaries

pub mod money;
pub mod period;
pub mod identifiers;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use period::{DateRange, PeriodError};
pub use identifiers::{
    AnalyticalAccountId, AssignmentRuleId, BudgetId, PartyId, ProductId,
    CategoryId, TagId, PurchaseOrderId, SalesOrderId, VendorBillId,
    InvoiceId, PaymentId, PortalUserId,
};
pub use error::PortError;
