//! Budget application service
//!
//! Orchestrates budget lifecycle operations against the repository port.
//! Revision bookkeeping mirrors the document side: the audit record is
//! written first and a failure there is logged but does not block the
//! amount change itself.

use std::sync::Arc;

use core_kernel::{AnalyticalAccountId, BudgetId, DateRange, Money};
use tracing::warn;

use crate::budget::{Budget, BudgetType};
use crate::error::BudgetError;
use crate::ports::BudgetPort;

/// Service for budget lifecycle operations
pub struct BudgetService {
    budgets: Arc<dyn BudgetPort>,
}

impl BudgetService {
    /// Creates a new service over the given repository
    pub fn new(budgets: Arc<dyn BudgetPort>) -> Self {
        Self { budgets }
    }

    /// Creates and persists a draft budget
    pub async fn create(
        &self,
        name: impl Into<String>,
        period: DateRange,
        analytical_account_id: AnalyticalAccountId,
        budget_type: BudgetType,
        budgeted_amount: Money,
    ) -> Result<Budget, BudgetError> {
        let budget = Budget::new(
            name,
            period,
            analytical_account_id,
            budget_type,
            budgeted_amount,
        )?;
        self.budgets.insert(budget.clone()).await?;
        Ok(budget)
    }

    /// Confirms a draft budget, after which it accrues from transactions
    pub async fn confirm(&self, id: BudgetId) -> Result<Budget, BudgetError> {
        let mut budget = self.budgets.get(id).await?;
        budget.confirm()?;
        self.budgets.save(&budget).await?;
        Ok(budget)
    }

    /// Revises the budgeted amount, keeping the audit trail
    pub async fn revise(
        &self,
        id: BudgetId,
        new_amount: Money,
        reason: Option<String>,
    ) -> Result<Budget, BudgetError> {
        let mut budget = self.budgets.get(id).await?;
        let revision = budget.revise(new_amount, reason)?;

        // The audit record is best-effort: a write failure must not block
        // the revision itself.
        if let Err(error) = self.budgets.append_revision(&revision).await {
            warn!(budget_id = %id, %error, "failed to record budget revision");
        }

        self.budgets.save(&budget).await?;
        Ok(budget)
    }

    /// Archives a budget
    pub async fn archive(&self, id: BudgetId) -> Result<Budget, BudgetError> {
        let mut budget = self.budgets.get(id).await?;
        budget.archive();
        self.budgets.save(&budget).await?;
        Ok(budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use core_kernel::Currency;

    use crate::budget::BudgetState;
    use crate::ports::mock::MockBudgets;

    fn window() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        )
        .unwrap()
    }

    fn inr(amount: i64) -> Money {
        Money::new(Decimal::from(amount), Currency::INR)
    }

    #[tokio::test]
    async fn test_create_confirm_revise_flow() {
        let store = Arc::new(MockBudgets::new());
        let service = BudgetService::new(store.clone());

        let budget = service
            .create(
                "Q1 marketing",
                window(),
                AnalyticalAccountId::new(),
                BudgetType::Expense,
                inr(100_000),
            )
            .await
            .unwrap();
        assert_eq!(budget.state, BudgetState::Draft);

        let budget = service.confirm(budget.id).await.unwrap();
        assert_eq!(budget.state, BudgetState::Confirmed);

        let budget = service
            .revise(budget.id, inr(130_000), Some("extra spend".to_string()))
            .await
            .unwrap();
        assert_eq!(budget.state, BudgetState::Revised);
        assert_eq!(budget.budgeted_amount, inr(130_000));

        let revisions = store.revisions().await;
        assert_eq!(revisions.len(), 1);
        assert_eq!(revisions[0].previous_amount, inr(100_000));
    }

    #[tokio::test]
    async fn test_archive() {
        let store = Arc::new(MockBudgets::new());
        let service = BudgetService::new(store);

        let budget = service
            .create(
                "Old",
                window(),
                AnalyticalAccountId::new(),
                BudgetType::Income,
                inr(10),
            )
            .await
            .unwrap();

        let budget = service.archive(budget.id).await.unwrap();
        assert_eq!(budget.state, BudgetState::Archived);
    }
}
