//! Database repositories
//!
//! One repository per table. Queries on user-owned rows are always scoped
//! by the owner's id.

pub mod analytics;
pub mod asset;
pub mod debt;
pub mod document;
pub mod pitch_access;
pub mod profile;
pub mod user;

pub use analytics::{AnalyticsRepositoryTrait, PostgresAnalyticsRepository};
pub use asset::AssetRepository;
pub use debt::DebtRepository;
pub use document::{DocumentRepository, NewDocument};
pub use pitch_access::PitchAccessRepository;
pub use profile::ProfileRepository;
pub use user::UserRepository;
