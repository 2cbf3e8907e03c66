//! Domain events for the budget aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::BudgetId;

/// Domain events emitted by the Budget aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BudgetEvent {
    /// Budget moved from draft to confirmed
    BudgetConfirmed {
        budget_id: BudgetId,
        timestamp: DateTime<Utc>,
    },

    /// Budgeted amount was revised
    BudgetRevised {
        budget_id: BudgetId,
        previous_amount: Decimal,
        new_amount: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Budget was archived
    BudgetArchived {
        budget_id: BudgetId,
        timestamp: DateTime<Utc>,
    },

    /// Achieved amount was recomputed from the ledger
    AccrualRefreshed {
        budget_id: BudgetId,
        achieved_amount: Decimal,
        timestamp: DateTime<Utc>,
    },
}

impl BudgetEvent {
    /// Returns the budget ID associated with this event
    pub fn budget_id(&self) -> BudgetId {
        match self {
            BudgetEvent::BudgetConfirmed { budget_id, .. } => *budget_id,
            BudgetEvent::BudgetRevised { budget_id, .. } => *budget_id,
            BudgetEvent::BudgetArchived { budget_id, .. } => *budget_id,
            BudgetEvent::AccrualRefreshed { budget_id, .. } => *budget_id,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            BudgetEvent::BudgetConfirmed { .. } => "BudgetConfirmed",
            BudgetEvent::BudgetRevised { .. } => "BudgetRevised",
            BudgetEvent::BudgetArchived { .. } => "BudgetArchived",
            BudgetEvent::AccrualRefreshed { .. } => "AccrualRefreshed",
        }
    }
}
