//! Analytical account entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::AnalyticalAccountId;

/// A cost/revenue tracking dimension, independent of the chart of accounts
///
/// Accounts referenced by posted transactions are never deleted, only
/// archived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticalAccount {
    /// Unique identifier
    pub id: AnalyticalAccountId,
    /// Short code (e.g., "CC-001")
    pub code: String,
    /// Display name (e.g., "Deepavali Campaign")
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Whether the account is archived
    pub is_archived: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl AnalyticalAccount {
    /// Creates a new active account
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: AnalyticalAccountId::new_v7(),
            code: code.into(),
            name: name.into(),
            description: None,
            is_archived: false,
            created_at: Utc::now(),
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Archives the account
    pub fn archive(&mut self) {
        self.is_archived = true;
    }

    /// Returns true if the account can still be assigned to lines
    pub fn is_active(&self) -> bool {
        !self.is_archived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_creation() {
        let account = AnalyticalAccount::new("CC-001", "Deepavali Campaign")
            .with_description("Festive season push");

        assert_eq!(account.code, "CC-001");
        assert!(account.is_active());
        assert!(account.description.is_some());
    }

    #[test]
    fn test_archive() {
        let mut account = AnalyticalAccount::new("CC-002", "Expo");
        account.archive();
        assert!(!account.is_active());
    }
}
