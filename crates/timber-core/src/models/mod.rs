//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Each sub-module represents a specific feature area.

mod advisor;
mod analysis;
mod analytics;
mod asset;
mod debt;
mod document;
mod financial_profile;
mod insights;
mod payoff;
mod pitch_access;
mod subscription;
mod tip;
mod user;

// Re-export all models for convenient imports
pub use advisor::*;
pub use analysis::*;
pub use analytics::*;
pub use asset::*;
pub use debt::*;
pub use document::*;
pub use financial_profile::*;
pub use insights::*;
pub use payoff::*;
pub use pitch_access::*;
pub use subscription::*;
pub use tip::*;
pub use user::*;
