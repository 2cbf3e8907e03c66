//! The Budget aggregate
//!
//! # Invariants
//!
//! - `achievement_percentage = min(achieved / budgeted * 100, 100)`
//! - `remaining_balance = budgeted - achieved`, uncapped; a negative balance
//!   signals overrun
//! - revision history is append-only; revising never rewrites prior entries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{AnalyticalAccountId, BudgetId, DateRange, Money};

use crate::error::BudgetError;
use crate::events::BudgetEvent;
use crate::revision::BudgetRevision;

/// Budget lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetState {
    /// Being prepared, not yet accruing
    Draft,
    /// Active; participates in accrual refresh
    Confirmed,
    /// Amount was revised after confirmation
    Revised,
    /// Retired
    Archived,
}

impl BudgetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetState::Draft => "draft",
            BudgetState::Confirmed => "confirmed",
            BudgetState::Revised => "revised",
            BudgetState::Archived => "archived",
        }
    }
}

impl fmt::Display for BudgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetState {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BudgetState::Draft),
            "confirmed" => Ok(BudgetState::Confirmed),
            "revised" => Ok(BudgetState::Revised),
            "archived" => Ok(BudgetState::Archived),
            other => Err(BudgetError::UnknownState(other.to_string())),
        }
    }
}

/// Whether the budget tracks spend or revenue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    /// Accrues from customer-invoice lines
    Income,
    /// Accrues from vendor-bill lines
    Expense,
}

impl BudgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetType::Income => "income",
            BudgetType::Expense => "expense",
        }
    }
}

impl FromStr for BudgetType {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(BudgetType::Income),
            "expense" => Ok(BudgetType::Expense),
            other => Err(BudgetError::UnknownType(other.to_string())),
        }
    }
}

/// A budget for an analytical account over a date window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,
    /// Budget name
    pub name: String,
    /// Accrual window, inclusive on both ends
    pub period: DateRange,
    /// The analytical account this budget tracks
    pub analytical_account_id: AnalyticalAccountId,
    /// Income or expense
    pub budget_type: BudgetType,
    /// Planned amount
    pub budgeted_amount: Money,
    /// Realized amount, recomputed from the ledger
    pub achieved_amount: Money,
    /// Utilization percentage, capped at 100
    pub achievement_percentage: Decimal,
    /// Budgeted minus achieved; negative signals overrun
    pub remaining_balance: Money,
    /// Lifecycle state
    pub state: BudgetState,
    /// Append-only revision history
    pub revisions: Vec<BudgetRevision>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Domain events to be published
    #[serde(skip)]
    events: Vec<BudgetEvent>,
}

impl Budget {
    /// Creates a new draft budget
    ///
    /// # Errors
    ///
    /// Returns an error if the budgeted amount is negative.
    pub fn new(
        name: impl Into<String>,
        period: DateRange,
        analytical_account_id: AnalyticalAccountId,
        budget_type: BudgetType,
        budgeted_amount: Money,
    ) -> Result<Self, BudgetError> {
        if budgeted_amount.is_negative() {
            return Err(BudgetError::Validation(
                "budgeted amount cannot be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let currency = budgeted_amount.currency();

        Ok(Self {
            id: BudgetId::new_v7(),
            name: name.into(),
            period,
            analytical_account_id,
            budget_type,
            budgeted_amount,
            achieved_amount: Money::zero(currency),
            achievement_percentage: Decimal::ZERO,
            remaining_balance: budgeted_amount,
            state: BudgetState::Draft,
            revisions: Vec::new(),
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        })
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<BudgetEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether document transitions should refresh this budget
    pub fn accrues_transactions(&self) -> bool {
        self.state == BudgetState::Confirmed
    }

    /// Confirms a draft budget
    ///
    /// # Errors
    ///
    /// Returns an error unless the budget is in `Draft`.
    pub fn confirm(&mut self) -> Result<(), BudgetError> {
        match self.state {
            BudgetState::Draft => {
                let now = Utc::now();
                self.state = BudgetState::Confirmed;
                self.updated_at = now;
                self.events.push(BudgetEvent::BudgetConfirmed {
                    budget_id: self.id,
                    timestamp: now,
                });
                Ok(())
            }
            from => Err(BudgetError::InvalidStateTransition {
                from: from.as_str(),
                to: "confirmed",
            }),
        }
    }

    /// Revises the budgeted amount, appending a revision record
    ///
    /// The budget moves to `Revised` and stops accruing from document
    /// transitions until explicitly refreshed; prior revisions are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the budget is archived or the amount is negative.
    pub fn revise(
        &mut self,
        new_amount: Money,
        reason: Option<String>,
    ) -> Result<BudgetRevision, BudgetError> {
        if self.state == BudgetState::Archived {
            return Err(BudgetError::InvalidStateTransition {
                from: "archived",
                to: "revised",
            });
        }
        if new_amount.is_negative() {
            return Err(BudgetError::Validation(
                "budgeted amount cannot be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let revision = BudgetRevision {
            budget_id: self.id,
            previous_amount: self.budgeted_amount,
            new_amount,
            reason,
            revision_date: now,
        };

        self.revisions.push(revision.clone());
        self.budgeted_amount = new_amount;
        self.state = BudgetState::Revised;
        self.updated_at = now;

        // Derived figures follow the new planned amount immediately; the
        // achieved amount itself only changes on a ledger refresh.
        self.recompute_derived();

        self.events.push(BudgetEvent::BudgetRevised {
            budget_id: self.id,
            previous_amount: revision.previous_amount.amount(),
            new_amount: new_amount.amount(),
            timestamp: now,
        });

        Ok(revision)
    }

    /// Archives the budget
    pub fn archive(&mut self) {
        let now = Utc::now();
        self.state = BudgetState::Archived;
        self.updated_at = now;
        self.events.push(BudgetEvent::BudgetArchived {
            budget_id: self.id,
            timestamp: now,
        });
    }

    /// Applies a freshly recomputed achieved total from the ledger
    ///
    /// # Errors
    ///
    /// Returns an error on currency mismatch.
    pub fn apply_accrual(&mut self, achieved: Money) -> Result<(), BudgetError> {
        if achieved.currency() != self.budgeted_amount.currency() {
            return Err(BudgetError::Money(core_kernel::MoneyError::CurrencyMismatch(
                self.budgeted_amount.currency().to_string(),
                achieved.currency().to_string(),
            )));
        }

        let now = Utc::now();
        self.achieved_amount = achieved;
        self.recompute_derived();
        self.updated_at = now;

        self.events.push(BudgetEvent::AccrualRefreshed {
            budget_id: self.id,
            achieved_amount: achieved.amount(),
            timestamp: now,
        });

        Ok(())
    }

    /// Recomputes percentage and remaining balance from the stored amounts
    fn recompute_derived(&mut self) {
        let budgeted = self.budgeted_amount.amount();
        let achieved = self.achieved_amount.amount();

        self.achievement_percentage = if budgeted.is_zero() {
            // Anything achieved against a zero budget is full utilization.
            if achieved > Decimal::ZERO {
                dec!(100)
            } else {
                Decimal::ZERO
            }
        } else {
            (achieved / budgeted * dec!(100)).min(dec!(100))
        };

        self.remaining_balance = self.budgeted_amount - self.achieved_amount;
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn accrual_invariants_hold(
            budgeted in 1i64..10_000_000i64,
            achieved in 0i64..20_000_000i64
        ) {
            let period = DateRange::new(
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            ).unwrap();

            let mut budget = Budget::new(
                "prop",
                period,
                AnalyticalAccountId::new(),
                BudgetType::Expense,
                Money::new(Decimal::from(budgeted), core_kernel::Currency::INR),
            ).unwrap();
            budget.confirm().unwrap();

            let achieved_money = Money::new(Decimal::from(achieved), core_kernel::Currency::INR);
            budget.apply_accrual(achieved_money).unwrap();

            let expected_pct = (Decimal::from(achieved) / Decimal::from(budgeted)
                * Decimal::from(100)).min(Decimal::from(100));
            prop_assert_eq!(budget.achievement_percentage, expected_pct);
            prop_assert_eq!(
                budget.remaining_balance.amount(),
                Decimal::from(budgeted) - Decimal::from(achieved)
            );
        }
    }
}
