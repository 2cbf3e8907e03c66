//! Document domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError, PurchaseOrderId, SalesOrderId};

/// Errors from document aggregate operations
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Document is not editable in status {0}")]
    NotEditable(&'static str),

    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    #[error("Unknown document status: {0}")]
    UnknownStatus(String),

    #[error("Unknown payment mode: {0}")]
    UnknownMode(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

/// Errors from cross-document lifecycle operations
///
/// The partial-completion variants are deliberate: a confirm that fails
/// mid-way leaves individually valid records behind (a confirmed order with
/// no bill), and the caller reports that as a partial success rather than
/// rolling back.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("Order {order_id} confirmed but auto-bill creation failed: {source}")]
    AutoBillFailed {
        order_id: PurchaseOrderId,
        #[source]
        source: PortError,
    },

    #[error("Sales order {order_id} saved but auto-invoice creation failed: {source}")]
    AutoInvoiceFailed {
        order_id: SalesOrderId,
        #[source]
        source: PortError,
    },
}
