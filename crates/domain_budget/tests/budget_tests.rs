//! Scenario tests for the budget domain

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AnalyticalAccountId, Currency, DateRange, Money};
use domain_budget::ports::mock::{MockBudgets, MockLedger};
use domain_budget::{AccrualEngine, BudgetPort, BudgetService, BudgetState, BudgetType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn inr(amount: i64) -> Money {
    Money::new(Decimal::from(amount), Currency::INR)
}

#[tokio::test]
async fn full_budget_lifecycle_with_accrual() {
    let store = Arc::new(MockBudgets::new());
    let ledger = Arc::new(MockLedger::new());
    let service = BudgetService::new(store.clone());
    let engine = AccrualEngine::new(store.clone(), ledger.clone());

    let account = AnalyticalAccountId::new();
    let period = DateRange::new(date(2026, 1, 1), date(2026, 6, 30)).unwrap();

    let budget = service
        .create("H1 campaign", period, account, BudgetType::Expense, inr(200_000))
        .await
        .unwrap();

    // Draft budgets are ignored by account sweeps.
    ledger
        .push(account, BudgetType::Expense, date(2026, 2, 1), dec!(80000))
        .await;
    engine.refresh_all_for_account(account).await.unwrap();
    assert_eq!(store.get(budget.id).await.unwrap().achieved_amount, inr(0));

    // Confirmation brings the budget into the sweep.
    service.confirm(budget.id).await.unwrap();
    engine.refresh_all_for_account(account).await.unwrap();

    let refreshed = store.get(budget.id).await.unwrap();
    assert_eq!(refreshed.achieved_amount, inr(80_000));
    assert_eq!(refreshed.achievement_percentage, dec!(40));
    assert_eq!(refreshed.remaining_balance, inr(120_000));

    // Revision preserves the achieved amount and re-derives utilization.
    let revised = service
        .revise(budget.id, inr(160_000), Some("cut".to_string()))
        .await
        .unwrap();
    assert_eq!(revised.state, BudgetState::Revised);
    assert_eq!(revised.achieved_amount, inr(80_000));
    assert_eq!(revised.achievement_percentage, dec!(50));
    assert_eq!(revised.remaining_balance, inr(80_000));

    // A revised budget no longer joins account-triggered sweeps.
    ledger
        .push(account, BudgetType::Expense, date(2026, 3, 1), dec!(10000))
        .await;
    engine.refresh_all_for_account(account).await.unwrap();
    assert_eq!(
        store.get(budget.id).await.unwrap().achieved_amount,
        inr(80_000)
    );

    // But a direct refresh still recomputes in full.
    engine.refresh(budget.id).await.unwrap();
    assert_eq!(
        store.get(budget.id).await.unwrap().achieved_amount,
        inr(90_000)
    );
}

#[tokio::test]
async fn derived_figures_always_consistent_after_refresh() {
    let store = Arc::new(MockBudgets::new());
    let ledger = Arc::new(MockLedger::new());
    let service = BudgetService::new(store.clone());
    let engine = AccrualEngine::new(store.clone(), ledger.clone());

    let account = AnalyticalAccountId::new();
    let period = DateRange::new(date(2026, 1, 1), date(2026, 12, 31)).unwrap();

    let budget = service
        .create("Income plan", period, account, BudgetType::Income, inr(118_000))
        .await
        .unwrap();
    service.confirm(budget.id).await.unwrap();

    for amount in [dec!(50000), dec!(68000), dec!(25000)] {
        ledger
            .push(account, BudgetType::Income, date(2026, 5, 5), amount)
            .await;
        engine.refresh(budget.id).await.unwrap();

        let b = store.get(budget.id).await.unwrap();
        let expected_pct = (b.achieved_amount.amount() / b.budgeted_amount.amount()
            * dec!(100))
        .min(dec!(100));
        assert_eq!(b.achievement_percentage, expected_pct);
        assert_eq!(
            b.remaining_balance.amount(),
            b.budgeted_amount.amount() - b.achieved_amount.amount()
        );
    }
}
