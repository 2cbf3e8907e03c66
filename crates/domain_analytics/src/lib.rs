//! Analytical Accounting Domain
//!
//! Analytical accounts are cost/revenue tracking dimensions orthogonal to the
//! chart of accounts (a campaign, a project, an expo). Transaction lines are
//! tagged with an analytical account either explicitly or through
//! auto-assignment rules.
//!
//! # Rule matching
//!
//! An [`AssignmentRule`] maps transaction attributes (partner tag, partner,
//! product category, product) to an analytical account and optionally a
//! budget. Matching scores every active rule by the number of criteria it
//! shares with the transaction line; the highest score wins, with a
//! deterministic tie-break (priority, then creation time, then id).

pub mod account;
pub mod rule;
pub mod matching;
pub mod assigner;
pub mod ports;
pub mod error;

pub use account::AnalyticalAccount;
pub use rule::{AssignmentRule, AssignmentRuleBuilder};
pub use matching::{MatchCriteria, MatchOutcome, best_match, match_score};
pub use assigner::AutoAssigner;
pub use ports::{AccountPort, RulePort, ProductCatalogPort, PartnerDirectoryPort};
pub use error::AnalyticsError;
