//! Budget domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};

/// Errors from budget operations
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown budget state: {0}")]
    UnknownState(String),

    #[error("Unknown budget type: {0}")]
    UnknownType(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Port(#[from] PortError),
}
