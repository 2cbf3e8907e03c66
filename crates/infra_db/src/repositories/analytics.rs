//! Analytics repository
//!
//! Backs the analytical account and assignment-rule ports, plus the two
//! criteria-resolution lookups the auto-assigner needs (product category and
//! partner tags).

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{
    AnalyticalAccountId, AssignmentRuleId, CategoryId, PartyId, PortError, ProductId, TagId,
};
use domain_analytics::ports::{AccountPort, PartnerDirectoryPort, ProductCatalogPort, RulePort};
use domain_analytics::{AnalyticalAccount, AssignmentRule};

use crate::error::storage_err;

/// PostgreSQL adapter for the analytics domain ports
#[derive(Debug, Clone)]
pub struct PgAnalyticsRepository {
    pool: PgPool,
}

impl PgAnalyticsRepository {
    /// Creates a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    code: String,
    name: String,
    description: Option<String>,
    is_archived: bool,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for AnalyticalAccount {
    fn from(row: AccountRow) -> Self {
        AnalyticalAccount {
            id: AnalyticalAccountId::from(row.id),
            code: row.code,
            name: row.name,
            description: row.description,
            is_archived: row.is_archived,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RuleRow {
    id: Uuid,
    name: String,
    partner_tag_id: Option<Uuid>,
    partner_id: Option<Uuid>,
    product_category_id: Option<Uuid>,
    product_id: Option<Uuid>,
    analytical_account_id: Uuid,
    budget_id: Option<Uuid>,
    priority: i16,
    is_archived: bool,
    created_at: DateTime<Utc>,
}

impl From<RuleRow> for AssignmentRule {
    fn from(row: RuleRow) -> Self {
        AssignmentRule {
            id: AssignmentRuleId::from(row.id),
            name: row.name,
            partner_tag_id: row.partner_tag_id.map(TagId::from),
            partner_id: row.partner_id.map(PartyId::from),
            product_category_id: row.product_category_id.map(CategoryId::from),
            product_id: row.product_id.map(ProductId::from),
            analytical_account_id: AnalyticalAccountId::from(row.analytical_account_id),
            budget_id: row.budget_id.map(core_kernel::BudgetId::from),
            priority: row.priority as u8,
            is_archived: row.is_archived,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl AccountPort for PgAnalyticsRepository {
    async fn get(&self, id: AnalyticalAccountId) -> Result<AnalyticalAccount, PortError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, code, name, description, is_archived, created_at
            FROM analytical_accounts
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?
        .ok_or_else(|| PortError::not_found("AnalyticalAccount", id))?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<AnalyticalAccount>, PortError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, code, name, description, is_archived, created_at
            FROM analytical_accounts
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, account: AnalyticalAccount) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO analytical_accounts (id, code, name, description, is_archived, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*account.id.as_uuid())
        .bind(&account.code)
        .bind(&account.name)
        .bind(&account.description)
        .bind(account.is_archived)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn archive(&self, id: AnalyticalAccountId) -> Result<(), PortError> {
        let result = sqlx::query("UPDATE analytical_accounts SET is_archived = TRUE WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("AnalyticalAccount", id));
        }
        Ok(())
    }
}

#[async_trait]
impl RulePort for PgAnalyticsRepository {
    async fn list_active(&self) -> Result<Vec<AssignmentRule>, PortError> {
        let rows = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT id, name, partner_tag_id, partner_id, product_category_id, product_id,
                   analytical_account_id, budget_id, priority, is_archived, created_at
            FROM auto_assignment_rules
            WHERE is_archived = FALSE
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list(&self) -> Result<Vec<AssignmentRule>, PortError> {
        let rows = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT id, name, partner_tag_id, partner_id, product_category_id, product_id,
                   analytical_account_id, budget_id, priority, is_archived, created_at
            FROM auto_assignment_rules
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, rule: AssignmentRule) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO auto_assignment_rules (
                id, name, partner_tag_id, partner_id, product_category_id, product_id,
                analytical_account_id, budget_id, priority, is_archived, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(*rule.id.as_uuid())
        .bind(&rule.name)
        .bind(rule.partner_tag_id.map(|t| *t.as_uuid()))
        .bind(rule.partner_id.map(|p| *p.as_uuid()))
        .bind(rule.product_category_id.map(|c| *c.as_uuid()))
        .bind(rule.product_id.map(|p| *p.as_uuid()))
        .bind(*rule.analytical_account_id.as_uuid())
        .bind(rule.budget_id.map(|b| *b.as_uuid()))
        .bind(rule.priority as i16)
        .bind(rule.is_archived)
        .bind(rule.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn archive(&self, id: AssignmentRuleId) -> Result<(), PortError> {
        let result =
            sqlx::query("UPDATE auto_assignment_rules SET is_archived = TRUE WHERE id = $1")
                .bind(*id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("AssignmentRule", id));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductCatalogPort for PgAnalyticsRepository {
    async fn category_of(&self, product_id: ProductId) -> Result<Option<CategoryId>, PortError> {
        let category: Option<Option<Uuid>> =
            sqlx::query_scalar("SELECT category_id FROM products WHERE id = $1")
                .bind(*product_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_err)?;

        Ok(category.flatten().map(CategoryId::from))
    }
}

#[async_trait]
impl PartnerDirectoryPort for PgAnalyticsRepository {
    async fn tag_ids(&self, partner_id: PartyId) -> Result<HashSet<TagId>, PortError> {
        let tags: Vec<Uuid> =
            sqlx::query_scalar("SELECT tag_id FROM contact_tags WHERE contact_id = $1")
                .bind(*partner_id.as_uuid())
                .fetch_all(&self.pool)
                .await
                .map_err(storage_err)?;

        Ok(tags.into_iter().map(TagId::from).collect())
    }
}
