//! Budget DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_budget::{Budget, BudgetRevision};

/// Request to create a draft budget
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub analytical_account_id: Uuid,
    /// "income" or "expense"
    #[serde(rename = "type")]
    pub budget_type: String,
    pub budgeted_amount: Decimal,
}

/// Request to revise a budget's amount
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviseBudgetRequest {
    pub new_amount: Decimal,
    pub reason: Option<String>,
}

/// Budget representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub analytical_account_id: Uuid,
    #[serde(rename = "type")]
    pub budget_type: String,
    pub budgeted_amount: Decimal,
    pub achieved_amount: Decimal,
    pub achievement_percentage: Decimal,
    pub remaining_balance: Decimal,
    pub state: String,
    pub revision_history: Vec<RevisionResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Budget revision representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionResponse {
    pub previous_amount: Decimal,
    pub new_amount: Decimal,
    pub reason: Option<String>,
    pub revision_date: DateTime<Utc>,
}

impl From<BudgetRevision> for RevisionResponse {
    fn from(revision: BudgetRevision) -> Self {
        Self {
            previous_amount: revision.previous_amount.amount(),
            new_amount: revision.new_amount.amount(),
            reason: revision.reason,
            revision_date: revision.revision_date,
        }
    }
}

impl From<Budget> for BudgetResponse {
    fn from(budget: Budget) -> Self {
        Self {
            id: *budget.id.as_uuid(),
            name: budget.name,
            start_date: budget.period.start(),
            end_date: budget.period.end(),
            analytical_account_id: *budget.analytical_account_id.as_uuid(),
            budget_type: budget.budget_type.as_str().to_string(),
            budgeted_amount: budget.budgeted_amount.amount(),
            achieved_amount: budget.achieved_amount.amount(),
            achievement_percentage: budget.achievement_percentage,
            remaining_balance: budget.remaining_balance.amount(),
            state: budget.state.as_str().to_string(),
            revision_history: budget.revisions.into_iter().map(Into::into).collect(),
            created_at: budget.created_at,
            updated_at: budget.updated_at,
        }
    }
}
