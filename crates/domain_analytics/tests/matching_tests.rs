//! Integration tests for rule matching semantics

use std::collections::HashSet;

use core_kernel::{AnalyticalAccountId, BudgetId, CategoryId, PartyId, ProductId, TagId};
use domain_analytics::{best_match, match_score, AssignmentRuleBuilder, MatchCriteria};

#[test]
fn tag_and_category_rule_beats_tag_only_rule() {
    // Rule A: tag-only, priority 1. Rule B: tag + category, priority 2.
    // Against a line carrying both the tag and the category, B scores 2 and
    // must win.
    let tag = TagId::new();
    let category = CategoryId::new();
    let account_a = AnalyticalAccountId::new();
    let account_b = AnalyticalAccountId::new();

    let rule_a = AssignmentRuleBuilder::new("VIP customers")
        .partner_tag(tag)
        .analytical_account(account_a)
        .build()
        .unwrap();
    assert_eq!(rule_a.priority, 1);

    let rule_b = AssignmentRuleBuilder::new("VIP living room")
        .partner_tag(tag)
        .product_category(category)
        .analytical_account(account_b)
        .budget(BudgetId::new())
        .build()
        .unwrap();
    assert_eq!(rule_b.priority, 2);

    let criteria = MatchCriteria {
        tag_ids: HashSet::from([tag]),
        category_id: Some(category),
        ..Default::default()
    };

    assert_eq!(match_score(&rule_a, &criteria), 1);
    assert_eq!(match_score(&rule_b, &criteria), 2);

    let outcome = best_match(&[rule_a, rule_b], &criteria).unwrap();
    assert_eq!(outcome.analytical_account_id, account_b);
    assert!(outcome.budget_id.is_some());
}

#[test]
fn partial_overlap_still_matches() {
    // A rule with two criteria matches with score 1 when only one criterion
    // holds; a set criterion that contradicts the line does not disqualify
    // the rule, it simply does not contribute to the score.
    let partner = PartyId::new();
    let account = AnalyticalAccountId::new();

    let rule = AssignmentRuleBuilder::new("partner + product")
        .partner(partner)
        .product(ProductId::new())
        .analytical_account(account)
        .build()
        .unwrap();

    let criteria = MatchCriteria {
        partner_id: Some(partner),
        product_id: Some(ProductId::new()),
        ..Default::default()
    };

    assert_eq!(match_score(&rule, &criteria), 1);
    let outcome = best_match(&[rule], &criteria).unwrap();
    assert_eq!(outcome.analytical_account_id, account);
}

#[test]
fn deterministic_winner_regardless_of_input_order() {
    let tag = TagId::new();
    let accounts: Vec<_> = (0..4).map(|_| AnalyticalAccountId::new()).collect();

    let rules: Vec<_> = accounts
        .iter()
        .map(|account| {
            AssignmentRuleBuilder::new("same shape")
                .partner_tag(tag)
                .analytical_account(*account)
                .build()
                .unwrap()
        })
        .collect();

    let criteria = MatchCriteria {
        tag_ids: HashSet::from([tag]),
        ..Default::default()
    };

    let forward = best_match(&rules, &criteria).unwrap();

    let mut reversed = rules.clone();
    reversed.reverse();
    let backward = best_match(&reversed, &criteria).unwrap();

    assert_eq!(forward, backward);
}
