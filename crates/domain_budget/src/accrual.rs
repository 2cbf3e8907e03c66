//! Budget accrual engine
//!
//! The engine recomputes a budget's achieved amount by summing qualifying
//! transaction lines from the ledger in full. It is deliberately not
//! incremental: a cancelled bill or an edited line simply vanishes from the
//! next sum, with no reversal bookkeeping.
//!
//! Refresh is idempotent; two consecutive refreshes with no ledger change
//! produce identical stored values.

use std::sync::Arc;

use core_kernel::{AnalyticalAccountId, BudgetId, Money};
use tracing::{info, warn};

use crate::budget::BudgetType;
use crate::error::BudgetError;
use crate::ports::{AccrualSourcePort, BudgetPort};

/// Recomputes budget accrual from the transaction ledger
pub struct AccrualEngine {
    budgets: Arc<dyn BudgetPort>,
    ledger: Arc<dyn AccrualSourcePort>,
}

impl AccrualEngine {
    /// Creates a new engine over the given ports
    pub fn new(budgets: Arc<dyn BudgetPort>, ledger: Arc<dyn AccrualSourcePort>) -> Self {
        Self { budgets, ledger }
    }

    /// Recomputes and persists one budget's achieved amount
    ///
    /// A ledger query failure is logged and leaves the stored values
    /// unchanged (stale but consistent). Persistence failures propagate.
    pub async fn refresh(&self, budget_id: BudgetId) -> Result<(), BudgetError> {
        let mut budget = self.budgets.get(budget_id).await?;

        let total = match budget.budget_type {
            BudgetType::Expense => {
                self.ledger
                    .expense_total(budget.analytical_account_id, budget.period)
                    .await
            }
            BudgetType::Income => {
                self.ledger
                    .income_total(budget.analytical_account_id, budget.period)
                    .await
            }
        };

        let total = match total {
            Ok(total) => total,
            Err(error) => {
                warn!(
                    budget_id = %budget_id,
                    %error,
                    "accrual query failed; keeping stored budget figures"
                );
                return Ok(());
            }
        };

        let achieved = Money::new(total, budget.budgeted_amount.currency());
        budget.apply_accrual(achieved)?;
        self.budgets.save(&budget).await?;

        info!(
            budget_id = %budget_id,
            achieved = %achieved,
            percentage = %budget.achievement_percentage,
            "budget accrual refreshed"
        );

        Ok(())
    }

    /// Refreshes every confirmed budget referencing the analytical account
    ///
    /// Individual refresh failures are logged and do not abort the sweep.
    pub async fn refresh_all_for_account(
        &self,
        account_id: AnalyticalAccountId,
    ) -> Result<(), BudgetError> {
        let budgets = self.budgets.list_confirmed_for_account(account_id).await?;

        for budget in budgets {
            if let Err(error) = self.refresh(budget.id).await {
                warn!(
                    budget_id = %budget.id,
                    account_id = %account_id,
                    %error,
                    "budget refresh failed during account sweep"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use core_kernel::{Currency, DateRange};

    use crate::budget::Budget;
    use crate::ports::mock::{MockBudgets, MockLedger};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window() -> DateRange {
        DateRange::new(date(2026, 1, 1), date(2026, 12, 31)).unwrap()
    }

    fn inr(amount: i64) -> Money {
        Money::new(Decimal::from(amount), Currency::INR)
    }

    async fn confirmed_budget(
        budgets: &MockBudgets,
        account: AnalyticalAccountId,
        budget_type: BudgetType,
        amount: i64,
    ) -> BudgetId {
        let mut budget =
            Budget::new("test", window(), account, budget_type, inr(amount)).unwrap();
        budget.confirm().unwrap();
        let id = budget.id;
        budgets.insert(budget).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_refresh_sums_window_entries() {
        let budgets = Arc::new(MockBudgets::new());
        let ledger = Arc::new(MockLedger::new());
        let account = AnalyticalAccountId::new();

        let id = confirmed_budget(&budgets, account, BudgetType::Expense, 100_000).await;

        ledger
            .push(account, BudgetType::Expense, date(2026, 3, 1), dec!(30000))
            .await;
        ledger
            .push(account, BudgetType::Expense, date(2026, 6, 1), dec!(20000))
            .await;
        // Outside the window, must not count.
        ledger
            .push(account, BudgetType::Expense, date(2025, 12, 31), dec!(99999))
            .await;
        // Different account, must not count.
        ledger
            .push(
                AnalyticalAccountId::new(),
                BudgetType::Expense,
                date(2026, 3, 1),
                dec!(7777),
            )
            .await;
        // Income entries never feed an expense budget.
        ledger
            .push(account, BudgetType::Income, date(2026, 3, 1), dec!(5555))
            .await;

        let engine = AccrualEngine::new(budgets.clone(), ledger);
        engine.refresh(id).await.unwrap();

        let budget = budgets.get(id).await.unwrap();
        assert_eq!(budget.achieved_amount, inr(50_000));
        assert_eq!(budget.achievement_percentage, dec!(50));
        assert_eq!(budget.remaining_balance, inr(50_000));
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let budgets = Arc::new(MockBudgets::new());
        let ledger = Arc::new(MockLedger::new());
        let account = AnalyticalAccountId::new();

        let id = confirmed_budget(&budgets, account, BudgetType::Income, 200_000).await;
        ledger
            .push(account, BudgetType::Income, date(2026, 2, 2), dec!(45000))
            .await;

        let engine = AccrualEngine::new(budgets.clone(), ledger);
        engine.refresh(id).await.unwrap();
        let first = budgets.get(id).await.unwrap();

        engine.refresh(id).await.unwrap();
        let second = budgets.get(id).await.unwrap();

        assert_eq!(first.achieved_amount, second.achieved_amount);
        assert_eq!(first.achievement_percentage, second.achievement_percentage);
        assert_eq!(first.remaining_balance, second.remaining_balance);
    }

    #[tokio::test]
    async fn test_ledger_failure_leaves_values_stale() {
        let budgets = Arc::new(MockBudgets::new());
        let ledger = Arc::new(MockLedger::new());
        let account = AnalyticalAccountId::new();

        let id = confirmed_budget(&budgets, account, BudgetType::Expense, 100_000).await;
        ledger
            .push(account, BudgetType::Expense, date(2026, 5, 5), dec!(40000))
            .await;

        let engine = AccrualEngine::new(budgets.clone(), ledger.clone());
        engine.refresh(id).await.unwrap();
        assert_eq!(budgets.get(id).await.unwrap().achieved_amount, inr(40_000));

        ledger
            .push(account, BudgetType::Expense, date(2026, 5, 6), dec!(10000))
            .await;
        ledger.set_failing(true);

        // The failed refresh must not corrupt the stored figures.
        engine.refresh(id).await.unwrap();
        assert_eq!(budgets.get(id).await.unwrap().achieved_amount, inr(40_000));

        ledger.set_failing(false);
        engine.refresh(id).await.unwrap();
        assert_eq!(budgets.get(id).await.unwrap().achieved_amount, inr(50_000));
    }

    #[tokio::test]
    async fn test_account_sweep_skips_unconfirmed() {
        let budgets = Arc::new(MockBudgets::new());
        let ledger = Arc::new(MockLedger::new());
        let account = AnalyticalAccountId::new();

        let confirmed = confirmed_budget(&budgets, account, BudgetType::Expense, 100_000).await;

        let draft = Budget::new(
            "draft",
            window(),
            account,
            BudgetType::Expense,
            inr(50_000),
        )
        .unwrap();
        let draft_id = draft.id;
        budgets.insert(draft).await.unwrap();

        ledger
            .push(account, BudgetType::Expense, date(2026, 4, 4), dec!(25000))
            .await;

        let engine = AccrualEngine::new(budgets.clone(), ledger);
        engine.refresh_all_for_account(account).await.unwrap();

        assert_eq!(
            budgets.get(confirmed).await.unwrap().achieved_amount,
            inr(25_000)
        );
        // The draft budget was not touched by the sweep.
        assert_eq!(budgets.get(draft_id).await.unwrap().achieved_amount, inr(0));
    }
}
