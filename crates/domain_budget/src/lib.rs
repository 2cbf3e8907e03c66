//! Budget Domain
//!
//! Budgets track planned spend or income against an analytical account over
//! a date window. The achieved amount is never maintained incrementally:
//! every refresh recomputes it in full from the transaction ledger, so
//! cancellations, edits, and out-of-order postings self-correct without
//! reversal logic.
//!
//! # Lifecycle
//!
//! `Draft -> Confirmed -> Revised -> Archived`. Only confirmed budgets
//! participate in the accrual refresh triggered by document transitions.
//! Revising keeps an append-only audit trail of [`BudgetRevision`] records.

pub mod budget;
pub mod revision;
pub mod accrual;
pub mod service;
pub mod events;
pub mod ports;
pub mod error;

pub use budget::{Budget, BudgetState, BudgetType};
pub use revision::BudgetRevision;
pub use accrual::AccrualEngine;
pub use service::BudgetService;
pub use events::BudgetEvent;
pub use ports::{AccrualSourcePort, BudgetPort};
pub use error::BudgetError;
