//! Rule matching
//!
//! Pure lookup: given a transaction line's attributes, select the
//! best-matching active rule. A line with no matching rule simply keeps a
//! null analytical assignment; that is not an error.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use core_kernel::{AnalyticalAccountId, BudgetId, CategoryId, PartyId, ProductId, TagId};

use crate::rule::AssignmentRule;

/// Attributes of a transaction line used for rule matching
#[derive(Debug, Clone, Default)]
pub struct MatchCriteria {
    /// Tags carried by the document's partner
    pub tag_ids: HashSet<TagId>,
    /// The document's partner (customer or vendor)
    pub partner_id: Option<PartyId>,
    /// Category of the line's product
    pub category_id: Option<CategoryId>,
    /// The line's product
    pub product_id: Option<ProductId>,
}

/// The assignment produced by a winning rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub analytical_account_id: AnalyticalAccountId,
    pub budget_id: Option<BudgetId>,
}

/// Counts how many of the rule's criteria the line satisfies
///
/// A rule field contributes when it is set and equal to the corresponding
/// criterion; the tag field contributes when the partner carries that tag.
pub fn match_score(rule: &AssignmentRule, criteria: &MatchCriteria) -> u8 {
    let mut score = 0;

    if let Some(tag) = rule.partner_tag_id {
        if criteria.tag_ids.contains(&tag) {
            score += 1;
        }
    }
    if rule.partner_id.is_some() && rule.partner_id == criteria.partner_id {
        score += 1;
    }
    if rule.product_category_id.is_some() && rule.product_category_id == criteria.category_id {
        score += 1;
    }
    if rule.product_id.is_some() && rule.product_id == criteria.product_id {
        score += 1;
    }

    score
}

/// Selects the best-matching rule among the given set
///
/// Archived rules and rules with a zero score are excluded. Among the rest
/// the highest score wins; ties break deterministically by higher rule
/// priority, then earlier creation time, then lowest id.
pub fn best_match(rules: &[AssignmentRule], criteria: &MatchCriteria) -> Option<MatchOutcome> {
    rules
        .iter()
        .filter(|rule| !rule.is_archived)
        .filter_map(|rule| {
            let score = match_score(rule, criteria);
            (score > 0).then_some((score, rule))
        })
        .min_by(|(score_a, a), (score_b, b)| {
            // "Smallest" is the winner: higher score, then higher priority,
            // then oldest, then lowest id.
            score_b
                .cmp(score_a)
                .then(b.priority.cmp(&a.priority))
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        })
        .map(|(_, rule)| MatchOutcome {
            analytical_account_id: rule.analytical_account_id,
            budget_id: rule.budget_id,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::AssignmentRuleBuilder;

    fn tag_rule(tag: TagId, account: AnalyticalAccountId) -> AssignmentRule {
        AssignmentRuleBuilder::new("tag rule")
            .partner_tag(tag)
            .analytical_account(account)
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_rules_no_match() {
        let criteria = MatchCriteria::default();
        assert_eq!(best_match(&[], &criteria), None);
    }

    #[test]
    fn test_zero_score_excluded() {
        let rule = tag_rule(TagId::new(), AnalyticalAccountId::new());
        let criteria = MatchCriteria {
            partner_id: Some(PartyId::new()),
            ..Default::default()
        };

        assert_eq!(best_match(&[rule], &criteria), None);
    }

    #[test]
    fn test_higher_score_wins() {
        let tag = TagId::new();
        let category = CategoryId::new();

        let tag_only_account = AnalyticalAccountId::new();
        let combined_account = AnalyticalAccountId::new();

        let tag_only = tag_rule(tag, tag_only_account);
        let tag_and_category = AssignmentRuleBuilder::new("tag + category")
            .partner_tag(tag)
            .product_category(category)
            .analytical_account(combined_account)
            .build()
            .unwrap();

        let criteria = MatchCriteria {
            tag_ids: HashSet::from([tag]),
            category_id: Some(category),
            ..Default::default()
        };

        let outcome = best_match(&[tag_only, tag_and_category], &criteria).unwrap();
        assert_eq!(outcome.analytical_account_id, combined_account);
    }

    #[test]
    fn test_tie_breaks_by_priority() {
        let tag = TagId::new();
        let product = ProductId::new();

        // Both rules score 1 against tag-only criteria, but the broader rule
        // carries priority 2.
        let narrow_account = AnalyticalAccountId::new();
        let broad_account = AnalyticalAccountId::new();

        let narrow = tag_rule(tag, narrow_account);
        let broad = AssignmentRuleBuilder::new("tag + product")
            .partner_tag(tag)
            .product(product)
            .analytical_account(broad_account)
            .build()
            .unwrap();

        let criteria = MatchCriteria {
            tag_ids: HashSet::from([tag]),
            ..Default::default()
        };

        let outcome = best_match(&[narrow, broad], &criteria).unwrap();
        assert_eq!(outcome.analytical_account_id, broad_account);
    }

    #[test]
    fn test_full_tie_breaks_by_creation_order() {
        let tag = TagId::new();

        let first_account = AnalyticalAccountId::new();
        let second_account = AnalyticalAccountId::new();

        let mut first = tag_rule(tag, first_account);
        let mut second = tag_rule(tag, second_account);
        first.created_at = chrono::Utc::now() - chrono::Duration::days(2);
        second.created_at = chrono::Utc::now() - chrono::Duration::days(1);

        let criteria = MatchCriteria {
            tag_ids: HashSet::from([tag]),
            ..Default::default()
        };

        // Order in the slice must not matter.
        let outcome = best_match(&[second.clone(), first.clone()], &criteria).unwrap();
        assert_eq!(outcome.analytical_account_id, first_account);

        let outcome = best_match(&[first, second], &criteria).unwrap();
        assert_eq!(outcome.analytical_account_id, first_account);
    }

    #[test]
    fn test_archived_rules_skipped() {
        let tag = TagId::new();
        let mut rule = tag_rule(tag, AnalyticalAccountId::new());
        rule.archive();

        let criteria = MatchCriteria {
            tag_ids: HashSet::from([tag]),
            ..Default::default()
        };

        assert_eq!(best_match(&[rule], &criteria), None);
    }

    #[test]
    fn test_budget_carried_through() {
        let product = ProductId::new();
        let budget = BudgetId::new();

        let rule = AssignmentRuleBuilder::new("product rule")
            .product(product)
            .analytical_account(AnalyticalAccountId::new())
            .budget(budget)
            .build()
            .unwrap();

        let criteria = MatchCriteria {
            product_id: Some(product),
            ..Default::default()
        };

        let outcome = best_match(&[rule], &criteria).unwrap();
        assert_eq!(outcome.budget_id, Some(budget));
    }
}
