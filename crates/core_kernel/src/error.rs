//! Shared error types used across the system

use thiserror::Error;

/// Error type returned by port (repository/adapter) implementations
///
/// Domain services depend on port traits; every adapter, whether Postgres
/// or in-memory, maps its failures into this type so that callers handle a
/// single error surface.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Adapter unavailable: {0}")]
    Unavailable(String),
}

impl PortError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        PortError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        PortError::Storage(message.into())
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let err = PortError::not_found("Budget", "BUD-123");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Budget"));
        assert!(err.to_string().contains("BUD-123"));
    }

    #[test]
    fn test_validation_helper() {
        let err = PortError::validation("missing name");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("missing name"));
    }
}
