//! Budget handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{AnalyticalAccountId, BudgetId, Currency, DateRange, Money};
use domain_budget::ports::BudgetPort;
use domain_budget::BudgetType;

use crate::dto::budgets::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates a draft budget
pub async fn create_budget(
    State(state): State<AppState>,
    Json(request): Json<CreateBudgetRequest>,
) -> Result<Json<BudgetResponse>, ApiError> {
    request.validate()?;

    let budget_type: BudgetType = request
        .budget_type
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown budget type: {}", request.budget_type)))?;
    let period = DateRange::new(request.start_date, request.end_date)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let budget = state
        .budget_service
        .create(
            request.name,
            period,
            AnalyticalAccountId::from(request.analytical_account_id),
            budget_type,
            Money::new(request.budgeted_amount, Currency::INR),
        )
        .await?;

    Ok(Json(budget.into()))
}

/// Lists budgets
pub async fn list_budgets(
    State(state): State<AppState>,
) -> Result<Json<Vec<BudgetResponse>>, ApiError> {
    let budgets = state.budgets.list().await?;
    Ok(Json(budgets.into_iter().map(Into::into).collect()))
}

/// Gets a budget by id
pub async fn get_budget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetResponse>, ApiError> {
    let budget = state.budgets.get(BudgetId::from(id)).await?;
    Ok(Json(budget.into()))
}

/// Confirms a draft budget
pub async fn confirm_budget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetResponse>, ApiError> {
    let budget = state.budget_service.confirm(BudgetId::from(id)).await?;
    Ok(Json(budget.into()))
}

/// Revises a budget's amount, keeping the audit trail
pub async fn revise_budget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviseBudgetRequest>,
) -> Result<Json<BudgetResponse>, ApiError> {
    request.validate()?;

    let budget = state
        .budget_service
        .revise(
            BudgetId::from(id),
            Money::new(request.new_amount, Currency::INR),
            request.reason,
        )
        .await?;
    Ok(Json(budget.into()))
}

/// Recomputes a budget's achieved amount from the transaction ledger
pub async fn refresh_budget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetResponse>, ApiError> {
    let budget_id = BudgetId::from(id);
    state.accrual.refresh(budget_id).await?;
    let budget = state.budgets.get(budget_id).await?;
    Ok(Json(budget.into()))
}

/// Archives a budget
pub async fn archive_budget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetResponse>, ApiError> {
    let budget = state.budget_service.archive(BudgetId::from(id)).await?;
    Ok(Json(budget.into()))
}
