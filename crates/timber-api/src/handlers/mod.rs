//! HTTP request handlers, one module per API area.

pub mod admin_docs;
pub mod advisor;
pub mod analytics;
pub mod assets;
pub mod billing;
pub mod debts;
pub mod documents;
pub mod insights;
pub mod payoff;
pub mod pitch_access;
pub mod profile;
