//! Budget revision records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BudgetId, Money};

/// An append-only audit record of a budget amount change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRevision {
    /// The revised budget
    pub budget_id: BudgetId,
    /// Amount before the revision
    pub previous_amount: Money,
    /// Amount after the revision
    pub new_amount: Money,
    /// Optional justification
    pub reason: Option<String>,
    /// When the revision happened
    pub revision_date: DateTime<Utc>,
}
