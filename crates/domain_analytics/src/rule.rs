//! Auto-assignment rules
//!
//! A rule maps transaction attributes to an analytical account. Rule priority
//! is fixed at creation time as the count of non-null criteria, so a rule
//! scoped to both a tag and a category outranks a tag-only rule when both
//! match with the same score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    AnalyticalAccountId, AssignmentRuleId, BudgetId, CategoryId, PartyId, ProductId, TagId,
};

use crate::error::AnalyticsError;

/// A rule mapping transaction attributes to an analytical account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRule {
    /// Unique identifier
    pub id: AssignmentRuleId,
    /// Rule name
    pub name: String,
    /// Matches lines whose partner carries this tag
    pub partner_tag_id: Option<TagId>,
    /// Matches lines for this specific partner
    pub partner_id: Option<PartyId>,
    /// Matches lines whose product belongs to this category
    pub product_category_id: Option<CategoryId>,
    /// Matches lines for this specific product
    pub product_id: Option<ProductId>,
    /// Account assigned on match
    pub analytical_account_id: AnalyticalAccountId,
    /// Budget assigned on match, if any
    pub budget_id: Option<BudgetId>,
    /// Count of non-null criteria, fixed at creation
    pub priority: u8,
    /// Whether the rule is archived
    pub is_archived: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl AssignmentRule {
    /// Archives the rule, excluding it from future matching
    pub fn archive(&mut self) {
        self.is_archived = true;
    }
}

/// Builder for assignment rules
///
/// Computes the rule priority from the criteria that were set and rejects
/// rules with no criteria, which could never match anything.
pub struct AssignmentRuleBuilder {
    name: String,
    partner_tag_id: Option<TagId>,
    partner_id: Option<PartyId>,
    product_category_id: Option<CategoryId>,
    product_id: Option<ProductId>,
    analytical_account_id: Option<AnalyticalAccountId>,
    budget_id: Option<BudgetId>,
}

impl AssignmentRuleBuilder {
    /// Creates a builder for a named rule
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partner_tag_id: None,
            partner_id: None,
            product_category_id: None,
            product_id: None,
            analytical_account_id: None,
            budget_id: None,
        }
    }

    /// Matches partners carrying the given tag
    pub fn partner_tag(mut self, tag_id: TagId) -> Self {
        self.partner_tag_id = Some(tag_id);
        self
    }

    /// Matches a specific partner
    pub fn partner(mut self, partner_id: PartyId) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    /// Matches products in the given category
    pub fn product_category(mut self, category_id: CategoryId) -> Self {
        self.product_category_id = Some(category_id);
        self
    }

    /// Matches a specific product
    pub fn product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// Sets the account assigned on match
    pub fn analytical_account(mut self, account_id: AnalyticalAccountId) -> Self {
        self.analytical_account_id = Some(account_id);
        self
    }

    /// Sets the budget assigned on match
    pub fn budget(mut self, budget_id: BudgetId) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    /// Builds the rule
    ///
    /// # Errors
    ///
    /// Returns an error if the target account is missing or no matching
    /// criterion was set.
    pub fn build(self) -> Result<AssignmentRule, AnalyticsError> {
        let analytical_account_id = self
            .analytical_account_id
            .ok_or(AnalyticsError::MissingRequiredField("analytical_account_id"))?;

        let priority = [
            self.partner_tag_id.is_some(),
            self.partner_id.is_some(),
            self.product_category_id.is_some(),
            self.product_id.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count() as u8;

        if priority == 0 {
            return Err(AnalyticsError::NoCriteria);
        }

        Ok(AssignmentRule {
            id: AssignmentRuleId::new_v7(),
            name: self.name,
            partner_tag_id: self.partner_tag_id,
            partner_id: self.partner_id,
            product_category_id: self.product_category_id,
            product_id: self.product_id,
            analytical_account_id,
            budget_id: self.budget_id,
            priority,
            is_archived: false,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_counts_criteria() {
        let rule = AssignmentRuleBuilder::new("VIP Deepavali")
            .partner_tag(TagId::new())
            .product_category(CategoryId::new())
            .analytical_account(AnalyticalAccountId::new())
            .build()
            .unwrap();

        assert_eq!(rule.priority, 2);
        assert!(!rule.is_archived);
    }

    #[test]
    fn test_rule_without_criteria_rejected() {
        let result = AssignmentRuleBuilder::new("Matches nothing")
            .analytical_account(AnalyticalAccountId::new())
            .build();

        assert!(matches!(result, Err(AnalyticsError::NoCriteria)));
    }

    #[test]
    fn test_rule_without_account_rejected() {
        let result = AssignmentRuleBuilder::new("No target")
            .partner_tag(TagId::new())
            .build();

        assert!(matches!(
            result,
            Err(AnalyticsError::MissingRequiredField("analytical_account_id"))
        ));
    }
}
