//! Analytics domain errors

use thiserror::Error;

/// Errors from analytical account and rule operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("A rule needs at least one matching criterion")]
    NoCriteria,
}
