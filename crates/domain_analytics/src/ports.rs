//! Analytics domain ports
//!
//! Port traits define what the analytics domain needs from its data sources.
//! The Postgres adapters live in `infra_db`; in-memory mock adapters for
//! tests live in the [`mock`] module.

use std::collections::HashSet;

use async_trait::async_trait;

use core_kernel::{
    AnalyticalAccountId, AssignmentRuleId, CategoryId, PartyId, PortError, ProductId, TagId,
};

use crate::account::AnalyticalAccount;
use crate::rule::AssignmentRule;

/// Repository interface for analytical accounts
#[async_trait]
pub trait AccountPort: Send + Sync {
    /// Retrieves an account by id
    async fn get(&self, id: AnalyticalAccountId) -> Result<AnalyticalAccount, PortError>;

    /// Lists all accounts, archived included
    async fn list(&self) -> Result<Vec<AnalyticalAccount>, PortError>;

    /// Inserts a new account
    async fn insert(&self, account: AnalyticalAccount) -> Result<(), PortError>;

    /// Marks an account archived
    async fn archive(&self, id: AnalyticalAccountId) -> Result<(), PortError>;
}

/// Repository interface for auto-assignment rules
#[async_trait]
pub trait RulePort: Send + Sync {
    /// Lists rules that participate in matching (not archived)
    async fn list_active(&self) -> Result<Vec<AssignmentRule>, PortError>;

    /// Lists all rules, archived included
    async fn list(&self) -> Result<Vec<AssignmentRule>, PortError>;

    /// Inserts a new rule
    async fn insert(&self, rule: AssignmentRule) -> Result<(), PortError>;

    /// Marks a rule archived
    async fn archive(&self, id: AssignmentRuleId) -> Result<(), PortError>;
}

/// Lookup of a product's category, needed to resolve match criteria
#[async_trait]
pub trait ProductCatalogPort: Send + Sync {
    /// Returns the category of the product, if the product exists and has one
    async fn category_of(&self, product_id: ProductId) -> Result<Option<CategoryId>, PortError>;
}

/// Lookup of a partner's tags, needed to resolve match criteria
#[async_trait]
pub trait PartnerDirectoryPort: Send + Sync {
    /// Returns the tag ids carried by the partner; empty set if unknown
    async fn tag_ids(&self, partner_id: PartyId) -> Result<HashSet<TagId>, PortError>;
}

/// In-memory mock adapters for testing without a database
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory account store
    #[derive(Debug, Default)]
    pub struct MockAccounts {
        accounts: Arc<RwLock<HashMap<AnalyticalAccountId, AnalyticalAccount>>>,
    }

    impl MockAccounts {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl AccountPort for MockAccounts {
        async fn get(&self, id: AnalyticalAccountId) -> Result<AnalyticalAccount, PortError> {
            self.accounts
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("AnalyticalAccount", id))
        }

        async fn list(&self) -> Result<Vec<AnalyticalAccount>, PortError> {
            let mut accounts: Vec<_> = self.accounts.read().await.values().cloned().collect();
            accounts.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(accounts)
        }

        async fn insert(&self, account: AnalyticalAccount) -> Result<(), PortError> {
            self.accounts.write().await.insert(account.id, account);
            Ok(())
        }

        async fn archive(&self, id: AnalyticalAccountId) -> Result<(), PortError> {
            let mut accounts = self.accounts.write().await;
            let account = accounts
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("AnalyticalAccount", id))?;
            account.archive();
            Ok(())
        }
    }

    /// In-memory rule store
    #[derive(Debug, Default)]
    pub struct MockRules {
        rules: Arc<RwLock<Vec<AssignmentRule>>>,
    }

    impl MockRules {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with rules for testing
        pub async fn with_rules(rules: Vec<AssignmentRule>) -> Self {
            let store = Self::new();
            *store.rules.write().await = rules;
            store
        }
    }

    #[async_trait]
    impl RulePort for MockRules {
        async fn list_active(&self) -> Result<Vec<AssignmentRule>, PortError> {
            Ok(self
                .rules
                .read()
                .await
                .iter()
                .filter(|r| !r.is_archived)
                .cloned()
                .collect())
        }

        async fn list(&self) -> Result<Vec<AssignmentRule>, PortError> {
            Ok(self.rules.read().await.clone())
        }

        async fn insert(&self, rule: AssignmentRule) -> Result<(), PortError> {
            self.rules.write().await.push(rule);
            Ok(())
        }

        async fn archive(&self, id: AssignmentRuleId) -> Result<(), PortError> {
            let mut rules = self.rules.write().await;
            let rule = rules
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| PortError::not_found("AssignmentRule", id))?;
            rule.archive();
            Ok(())
        }
    }

    /// In-memory product catalog keyed by product id
    #[derive(Debug, Default)]
    pub struct MockCatalog {
        categories: Arc<RwLock<HashMap<ProductId, CategoryId>>>,
    }

    impl MockCatalog {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn insert(&self, product_id: ProductId, category_id: CategoryId) {
            self.categories.write().await.insert(product_id, category_id);
        }
    }

    #[async_trait]
    impl ProductCatalogPort for MockCatalog {
        async fn category_of(
            &self,
            product_id: ProductId,
        ) -> Result<Option<CategoryId>, PortError> {
            Ok(self.categories.read().await.get(&product_id).copied())
        }
    }

    /// In-memory partner tag directory
    #[derive(Debug, Default)]
    pub struct MockPartnerDirectory {
        tags: Arc<RwLock<HashMap<PartyId, HashSet<TagId>>>>,
    }

    impl MockPartnerDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn insert(&self, partner_id: PartyId, tag_ids: HashSet<TagId>) {
            self.tags.write().await.insert(partner_id, tag_ids);
        }
    }

    #[async_trait]
    impl PartnerDirectoryPort for MockPartnerDirectory {
        async fn tag_ids(&self, partner_id: PartyId) -> Result<HashSet<TagId>, PortError> {
            Ok(self
                .tags
                .read()
                .await
                .get(&partner_id)
                .cloned()
                .unwrap_or_default())
        }
    }
}
