//! Analytical account and assignment rule handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{
    AnalyticalAccountId, AssignmentRuleId, BudgetId, CategoryId, PartyId, ProductId, TagId,
};
use domain_analytics::ports::{AccountPort, RulePort};
use domain_analytics::{AnalyticalAccount, AssignmentRuleBuilder};

use crate::dto::analytics::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates an analytical account
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    request.validate()?;

    let mut account = AnalyticalAccount::new(request.code, request.name);
    if let Some(description) = request.description {
        account = account.with_description(description);
    }

    state.accounts.insert(account.clone()).await?;
    Ok(Json(account.into()))
}

/// Lists analytical accounts
pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = state.accounts.list().await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// Archives an analytical account
pub async fn archive_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .accounts
        .archive(AnalyticalAccountId::from(id))
        .await?;
    Ok(Json(serde_json::json!({ "archived": true })))
}

/// Creates an auto-assignment rule
pub async fn create_rule(
    State(state): State<AppState>,
    Json(request): Json<CreateRuleRequest>,
) -> Result<Json<RuleResponse>, ApiError> {
    request.validate()?;

    let mut builder = AssignmentRuleBuilder::new(request.name)
        .analytical_account(AnalyticalAccountId::from(request.analytical_account_id));
    if let Some(tag) = request.partner_tag_id {
        builder = builder.partner_tag(TagId::from(tag));
    }
    if let Some(partner) = request.partner_id {
        builder = builder.partner(PartyId::from(partner));
    }
    if let Some(category) = request.product_category_id {
        builder = builder.product_category(CategoryId::from(category));
    }
    if let Some(product) = request.product_id {
        builder = builder.product(ProductId::from(product));
    }
    if let Some(budget) = request.budget_id {
        builder = builder.budget(BudgetId::from(budget));
    }

    let rule = builder
        .build()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state.rules.insert(rule.clone()).await?;
    Ok(Json(rule.into()))
}

/// Lists assignment rules
pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<Vec<RuleResponse>>, ApiError> {
    let rules = state.rules.list().await?;
    Ok(Json(rules.into_iter().map(Into::into).collect()))
}

/// Archives an assignment rule
pub async fn archive_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.rules.archive(AssignmentRuleId::from(id)).await?;
    Ok(Json(serde_json::json!({ "archived": true })))
}
