//! Repository implementations over PostgreSQL

pub mod analytics;
pub mod budgets;
pub mod documents;
pub mod party;
