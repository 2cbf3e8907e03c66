//! Budget repository and accrual source
//!
//! Implements the budget aggregate port and the ledger read model the
//! accrual engine sums over. Accrual totals join line tables against their
//! document headers so that only accruing statuses inside the budget window
//! count.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{AnalyticalAccountId, BudgetId, Currency, DateRange, Money, PortError};
use domain_budget::ports::{AccrualSourcePort, BudgetPort};
use domain_budget::{Budget, BudgetRevision, BudgetState, BudgetType};

use crate::error::{corrupt, storage_err};

/// PostgreSQL adapter for the budget domain ports
#[derive(Debug, Clone)]
pub struct PgBudgetRepository {
    pool: PgPool,
}

impl PgBudgetRepository {
    /// Creates a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BudgetRow {
    id: Uuid,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    analytical_account_id: Uuid,
    budget_type: String,
    currency: String,
    budgeted_amount: Decimal,
    achieved_amount: Decimal,
    achievement_percentage: Decimal,
    remaining_balance: Decimal,
    state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct RevisionRow {
    budget_id: Uuid,
    currency: String,
    previous_amount: Decimal,
    new_amount: Decimal,
    reason: Option<String>,
    revision_date: DateTime<Utc>,
}

fn budget_from_row(row: BudgetRow, revisions: Vec<RevisionRow>) -> Result<Budget, PortError> {
    let currency: Currency = row
        .currency
        .parse()
        .map_err(|_| corrupt("currency", &row.currency))?;
    let budget_type: BudgetType = row
        .budget_type
        .parse()
        .map_err(|_| corrupt("budget_type", &row.budget_type))?;
    let state: BudgetState = row
        .state
        .parse()
        .map_err(|_| corrupt("budget state", &row.state))?;
    let period = DateRange::new(row.start_date, row.end_date)
        .map_err(|e| corrupt("budget period", e))?;

    let mut budget = Budget::new(
        row.name,
        period,
        AnalyticalAccountId::from(row.analytical_account_id),
        budget_type,
        Money::new(row.budgeted_amount, currency),
    )
    .map_err(|e| corrupt("budget amounts", e))?;

    budget.id = BudgetId::from(row.id);
    budget.achieved_amount = Money::new(row.achieved_amount, currency);
    budget.achievement_percentage = row.achievement_percentage;
    budget.remaining_balance = Money::new(row.remaining_balance, currency);
    budget.state = state;
    budget.created_at = row.created_at;
    budget.updated_at = row.updated_at;
    budget.revisions = revisions
        .into_iter()
        .map(|r| revision_from_row(r, currency))
        .collect();
    budget.take_events();

    Ok(budget)
}

fn revision_from_row(row: RevisionRow, currency: Currency) -> BudgetRevision {
    BudgetRevision {
        budget_id: BudgetId::from(row.budget_id),
        previous_amount: Money::new(row.previous_amount, currency),
        new_amount: Money::new(row.new_amount, currency),
        reason: row.reason,
        revision_date: row.revision_date,
    }
}

const SELECT_BUDGET: &str = r#"
    SELECT id, name, start_date, end_date, analytical_account_id, budget_type,
           currency, budgeted_amount, achieved_amount, achievement_percentage,
           remaining_balance, state, created_at, updated_at
    FROM budgets
"#;

impl PgBudgetRepository {
    async fn revisions_for(&self, budget_id: Uuid) -> Result<Vec<RevisionRow>, PortError> {
        sqlx::query_as::<_, RevisionRow>(
            r#"
            SELECT budget_id, currency, previous_amount, new_amount, reason, revision_date
            FROM budget_revisions
            WHERE budget_id = $1
            ORDER BY revision_date
            "#,
        )
        .bind(budget_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)
    }
}

#[async_trait]
impl BudgetPort for PgBudgetRepository {
    async fn get(&self, id: BudgetId) -> Result<Budget, PortError> {
        let row = sqlx::query_as::<_, BudgetRow>(&format!("{} WHERE id = $1", SELECT_BUDGET))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| PortError::not_found("Budget", id))?;

        let revisions = self.revisions_for(row.id).await?;
        budget_from_row(row, revisions)
    }

    async fn list(&self) -> Result<Vec<Budget>, PortError> {
        let rows = sqlx::query_as::<_, BudgetRow>(&format!(
            "{} ORDER BY created_at DESC",
            SELECT_BUDGET
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut budgets = Vec::with_capacity(rows.len());
        for row in rows {
            let revisions = self.revisions_for(row.id).await?;
            budgets.push(budget_from_row(row, revisions)?);
        }
        Ok(budgets)
    }

    async fn list_confirmed_for_account(
        &self,
        account_id: AnalyticalAccountId,
    ) -> Result<Vec<Budget>, PortError> {
        let rows = sqlx::query_as::<_, BudgetRow>(&format!(
            "{} WHERE analytical_account_id = $1 AND state = 'confirmed'",
            SELECT_BUDGET
        ))
        .bind(*account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut budgets = Vec::with_capacity(rows.len());
        for row in rows {
            let revisions = self.revisions_for(row.id).await?;
            budgets.push(budget_from_row(row, revisions)?);
        }
        Ok(budgets)
    }

    async fn insert(&self, budget: Budget) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO budgets (
                id, name, start_date, end_date, analytical_account_id, budget_type,
                currency, budgeted_amount, achieved_amount, achievement_percentage,
                remaining_balance, state, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(*budget.id.as_uuid())
        .bind(&budget.name)
        .bind(budget.period.start())
        .bind(budget.period.end())
        .bind(*budget.analytical_account_id.as_uuid())
        .bind(budget.budget_type.as_str())
        .bind(budget.budgeted_amount.currency().code())
        .bind(budget.budgeted_amount.amount())
        .bind(budget.achieved_amount.amount())
        .bind(budget.achievement_percentage)
        .bind(budget.remaining_balance.amount())
        .bind(budget.state.as_str())
        .bind(budget.created_at)
        .bind(budget.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn save(&self, budget: &Budget) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE budgets SET
                name = $2,
                budgeted_amount = $3,
                achieved_amount = $4,
                achievement_percentage = $5,
                remaining_balance = $6,
                state = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(*budget.id.as_uuid())
        .bind(&budget.name)
        .bind(budget.budgeted_amount.amount())
        .bind(budget.achieved_amount.amount())
        .bind(budget.achievement_percentage)
        .bind(budget.remaining_balance.amount())
        .bind(budget.state.as_str())
        .bind(budget.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Budget", budget.id));
        }
        Ok(())
    }

    async fn append_revision(&self, revision: &BudgetRevision) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO budget_revisions (
                budget_id, currency, previous_amount, new_amount, reason, revision_date
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*revision.budget_id.as_uuid())
        .bind(revision.previous_amount.currency().code())
        .bind(revision.previous_amount.amount())
        .bind(revision.new_amount.amount())
        .bind(&revision.reason)
        .bind(revision.revision_date)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

#[async_trait]
impl AccrualSourcePort for PgBudgetRepository {
    async fn expense_total(
        &self,
        account_id: AnalyticalAccountId,
        period: DateRange,
    ) -> Result<Decimal, PortError> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(l.subtotal), 0)
            FROM vendor_bill_lines l
            JOIN vendor_bills b ON b.id = l.vendor_bill_id
            WHERE l.analytical_account_id = $1
              AND b.status IN ('posted', 'paid', 'partially_paid')
              AND b.bill_date >= $2
              AND b.bill_date <= $3
            "#,
        )
        .bind(*account_id.as_uuid())
        .bind(period.start())
        .bind(period.end())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(total)
    }

    async fn income_total(
        &self,
        account_id: AnalyticalAccountId,
        period: DateRange,
    ) -> Result<Decimal, PortError> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(l.subtotal), 0)
            FROM customer_invoice_lines l
            JOIN customer_invoices i ON i.id = l.customer_invoice_id
            WHERE l.analytical_account_id = $1
              AND i.status IN ('posted', 'paid', 'partially_paid')
              AND i.invoice_date >= $2
              AND i.invoice_date <= $3
            "#,
        )
        .bind(*account_id.as_uuid())
        .bind(period.start())
        .bind(period.end())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(total)
    }
}
