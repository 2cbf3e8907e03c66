//! Analytics DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_analytics::{AnalyticalAccount, AssignmentRule};

/// Request to create an analytical account
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
}

/// Analytical account representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AnalyticalAccount> for AccountResponse {
    fn from(account: AnalyticalAccount) -> Self {
        Self {
            id: *account.id.as_uuid(),
            code: account.code,
            name: account.name,
            description: account.description,
            is_archived: account.is_archived,
            created_at: account.created_at,
        }
    }
}

/// Request to create an auto-assignment rule
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub partner_tag_id: Option<Uuid>,
    pub partner_id: Option<Uuid>,
    pub product_category_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub analytical_account_id: Uuid,
    pub budget_id: Option<Uuid>,
}

/// Assignment rule representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResponse {
    pub id: Uuid,
    pub name: String,
    pub partner_tag_id: Option<Uuid>,
    pub partner_id: Option<Uuid>,
    pub product_category_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub analytical_account_id: Uuid,
    pub budget_id: Option<Uuid>,
    pub priority: u8,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AssignmentRule> for RuleResponse {
    fn from(rule: AssignmentRule) -> Self {
        Self {
            id: *rule.id.as_uuid(),
            name: rule.name,
            partner_tag_id: rule.partner_tag_id.map(|t| *t.as_uuid()),
            partner_id: rule.partner_id.map(|p| *p.as_uuid()),
            product_category_id: rule.product_category_id.map(|c| *c.as_uuid()),
            product_id: rule.product_id.map(|p| *p.as_uuid()),
            analytical_account_id: *rule.analytical_account_id.as_uuid(),
            budget_id: rule.budget_id.map(|b| *b.as_uuid()),
            priority: rule.priority,
            is_archived: rule.is_archived,
            created_at: rule.created_at,
        }
    }
}
