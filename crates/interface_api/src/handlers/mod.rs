//! Request handlers

pub mod analytics;
pub mod budgets;
pub mod documents;
pub mod health;
pub mod party;
pub mod portal;
