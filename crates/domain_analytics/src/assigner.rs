//! Auto-assignment service
//!
//! Resolves a transaction line's match criteria through the catalog and
//! partner-directory ports, then runs the pure matcher over the active rules.

use std::sync::Arc;

use core_kernel::{PartyId, PortError, ProductId};
use tracing::debug;

use crate::matching::{best_match, MatchCriteria, MatchOutcome};
use crate::ports::{PartnerDirectoryPort, ProductCatalogPort, RulePort};

/// Service that assigns analytical accounts to transaction lines
pub struct AutoAssigner {
    rules: Arc<dyn RulePort>,
    catalog: Arc<dyn ProductCatalogPort>,
    partners: Arc<dyn PartnerDirectoryPort>,
}

impl AutoAssigner {
    /// Creates a new assigner over the given ports
    pub fn new(
        rules: Arc<dyn RulePort>,
        catalog: Arc<dyn ProductCatalogPort>,
        partners: Arc<dyn PartnerDirectoryPort>,
    ) -> Self {
        Self {
            rules,
            catalog,
            partners,
        }
    }

    /// Finds the analytical assignment for a line, if any rule matches
    ///
    /// Criteria are resolved from the document's partner (tags) and the
    /// line's product (category) before matching. No match returns `None`;
    /// the line then keeps a null assignment.
    pub async fn assign(
        &self,
        partner_id: Option<PartyId>,
        product_id: Option<ProductId>,
    ) -> Result<Option<MatchOutcome>, PortError> {
        let mut criteria = MatchCriteria::default();

        if let Some(partner) = partner_id {
            criteria.partner_id = Some(partner);
            criteria.tag_ids = self.partners.tag_ids(partner).await?;
        }
        if let Some(product) = product_id {
            criteria.product_id = Some(product);
            criteria.category_id = self.catalog.category_of(product).await?;
        }

        let rules = self.rules.list_active().await?;
        let outcome = best_match(&rules, &criteria);

        debug!(
            ?partner_id,
            ?product_id,
            matched = outcome.is_some(),
            "auto-assignment evaluated"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use core_kernel::{AnalyticalAccountId, CategoryId, TagId};

    use crate::ports::mock::{MockCatalog, MockPartnerDirectory, MockRules};
    use crate::rule::AssignmentRuleBuilder;

    #[tokio::test]
    async fn test_assign_resolves_criteria_through_ports() {
        let tag = TagId::new();
        let partner = PartyId::new();
        let product = ProductId::new();
        let category = CategoryId::new();
        let account = AnalyticalAccountId::new();

        let rule = AssignmentRuleBuilder::new("tag + category")
            .partner_tag(tag)
            .product_category(category)
            .analytical_account(account)
            .build()
            .unwrap();

        let rules = Arc::new(MockRules::with_rules(vec![rule]).await);
        let catalog = Arc::new(MockCatalog::new());
        catalog.insert(product, category).await;
        let partners = Arc::new(MockPartnerDirectory::new());
        partners.insert(partner, HashSet::from([tag])).await;

        let assigner = AutoAssigner::new(rules, catalog, partners);

        let outcome = assigner
            .assign(Some(partner), Some(product))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.analytical_account_id, account);
    }

    #[tokio::test]
    async fn test_assign_without_match_is_none() {
        let assigner = AutoAssigner::new(
            Arc::new(MockRules::new()),
            Arc::new(MockCatalog::new()),
            Arc::new(MockPartnerDirectory::new()),
        );

        let outcome = assigner
            .assign(Some(PartyId::new()), Some(ProductId::new()))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }
}
