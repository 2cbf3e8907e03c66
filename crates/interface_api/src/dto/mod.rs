//! Request/Response data transfer objects

pub mod analytics;
pub mod budgets;
pub mod documents;
pub mod party;
pub mod portal;
