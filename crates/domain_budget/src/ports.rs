//! Budget domain ports
//!
//! [`BudgetPort`] is the repository interface for the budget aggregate.
//! [`AccrualSourcePort`] is the read side of the transaction ledger that
//! accrual recomputation sums over; the Postgres adapter implements it with
//! joins against the document line tables.

use async_trait::async_trait;
use rust_decimal::Decimal;

use core_kernel::{AnalyticalAccountId, BudgetId, DateRange, PortError};

use crate::budget::Budget;
use crate::revision::BudgetRevision;

/// Repository interface for budgets
#[async_trait]
pub trait BudgetPort: Send + Sync {
    /// Retrieves a budget by id
    async fn get(&self, id: BudgetId) -> Result<Budget, PortError>;

    /// Lists all budgets
    async fn list(&self) -> Result<Vec<Budget>, PortError>;

    /// Lists confirmed budgets referencing the given analytical account
    async fn list_confirmed_for_account(
        &self,
        account_id: AnalyticalAccountId,
    ) -> Result<Vec<Budget>, PortError>;

    /// Inserts a new budget
    async fn insert(&self, budget: Budget) -> Result<(), PortError>;

    /// Persists the budget's current header state (amounts, state, timestamps)
    async fn save(&self, budget: &Budget) -> Result<(), PortError>;

    /// Appends a revision record to the audit trail
    async fn append_revision(&self, revision: &BudgetRevision) -> Result<(), PortError>;
}

/// Read-side of the transaction ledger used for accrual recomputation
///
/// Totals are sums of line subtotals for lines tagged with the analytical
/// account, whose parent document is in an accruing status (posted, paid,
/// partially paid) and dated inside the window, boundaries included.
#[async_trait]
pub trait AccrualSourcePort: Send + Sync {
    /// Qualifying vendor-bill line total for an expense budget
    async fn expense_total(
        &self,
        account_id: AnalyticalAccountId,
        period: DateRange,
    ) -> Result<Decimal, PortError>;

    /// Qualifying customer-invoice line total for an income budget
    async fn income_total(
        &self,
        account_id: AnalyticalAccountId,
        period: DateRange,
    ) -> Result<Decimal, PortError>;
}

/// In-memory mock adapters for testing without a database
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use chrono::NaiveDate;
    use tokio::sync::RwLock;

    use crate::budget::BudgetType;

    /// In-memory budget store
    #[derive(Debug, Default)]
    pub struct MockBudgets {
        budgets: Arc<RwLock<HashMap<BudgetId, Budget>>>,
        revisions: Arc<RwLock<Vec<BudgetRevision>>>,
    }

    impl MockBudgets {
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns the recorded revisions, oldest first
        pub async fn revisions(&self) -> Vec<BudgetRevision> {
            self.revisions.read().await.clone()
        }
    }

    #[async_trait]
    impl BudgetPort for MockBudgets {
        async fn get(&self, id: BudgetId) -> Result<Budget, PortError> {
            self.budgets
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Budget", id))
        }

        async fn list(&self) -> Result<Vec<Budget>, PortError> {
            let mut budgets: Vec<_> = self.budgets.read().await.values().cloned().collect();
            budgets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(budgets)
        }

        async fn list_confirmed_for_account(
            &self,
            account_id: AnalyticalAccountId,
        ) -> Result<Vec<Budget>, PortError> {
            Ok(self
                .budgets
                .read()
                .await
                .values()
                .filter(|b| b.analytical_account_id == account_id && b.accrues_transactions())
                .cloned()
                .collect())
        }

        async fn insert(&self, budget: Budget) -> Result<(), PortError> {
            self.budgets.write().await.insert(budget.id, budget);
            Ok(())
        }

        async fn save(&self, budget: &Budget) -> Result<(), PortError> {
            let mut budgets = self.budgets.write().await;
            if !budgets.contains_key(&budget.id) {
                return Err(PortError::not_found("Budget", budget.id));
            }
            budgets.insert(budget.id, budget.clone());
            Ok(())
        }

        async fn append_revision(&self, revision: &BudgetRevision) -> Result<(), PortError> {
            self.revisions.write().await.push(revision.clone());
            Ok(())
        }
    }

    /// A single dated ledger entry used by [`MockLedger`]
    #[derive(Debug, Clone)]
    pub struct LedgerEntry {
        pub account_id: AnalyticalAccountId,
        pub kind: BudgetType,
        pub date: NaiveDate,
        pub amount: Decimal,
    }

    /// In-memory accrual source over explicit dated entries
    ///
    /// Entries model qualifying document lines; the window filter runs here
    /// the same way the SQL adapter filters on document dates. A failure
    /// toggle simulates a ledger query error.
    #[derive(Debug, Default)]
    pub struct MockLedger {
        entries: Arc<RwLock<Vec<LedgerEntry>>>,
        fail: AtomicBool,
    }

    impl MockLedger {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn push(
            &self,
            account_id: AnalyticalAccountId,
            kind: BudgetType,
            date: NaiveDate,
            amount: Decimal,
        ) {
            self.entries.write().await.push(LedgerEntry {
                account_id,
                kind,
                date,
                amount,
            });
        }

        /// Makes subsequent queries fail until cleared
        pub fn set_failing(&self, failing: bool) {
            self.fail.store(failing, Ordering::SeqCst);
        }

        async fn total(
            &self,
            account_id: AnalyticalAccountId,
            kind: BudgetType,
            period: DateRange,
        ) -> Result<Decimal, PortError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PortError::storage("ledger query failed"));
            }

            Ok(self
                .entries
                .read()
                .await
                .iter()
                .filter(|e| {
                    e.account_id == account_id && e.kind == kind && period.contains(e.date)
                })
                .map(|e| e.amount)
                .sum())
        }
    }

    #[async_trait]
    impl AccrualSourcePort for MockLedger {
        async fn expense_total(
            &self,
            account_id: AnalyticalAccountId,
            period: DateRange,
        ) -> Result<Decimal, PortError> {
            self.total(account_id, BudgetType::Expense, period).await
        }

        async fn income_total(
            &self,
            account_id: AnalyticalAccountId,
            period: DateRange,
        ) -> Result<Decimal, PortError> {
            self.total(account_id, BudgetType::Income, period).await
        }
    }
}
