//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what they need
//! via Axum's `FromRef`.

use crate::auth::AuthFailureLimiter;
use std::sync::Arc;
use sqlx::PgPool;
use timber_core::Config;
use timber_db::{
    AnalyticsRepositoryTrait, AssetRepository, DebtRepository, DocumentRepository,
    PitchAccessRepository, ProfileRepository, UserRepository,
};
use timber_processing::DocumentValidator;
use timber_services::{BillingProvider, FinancialAssistant};

// ----- Sub-state types -----

/// Database pool and one repository per table.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub users: UserRepository,
    pub profiles: ProfileRepository,
    pub documents: DocumentRepository,
    pub debts: DebtRepository,
    pub assets: AssetRepository,
    pub pitch_access: PitchAccessRepository,
    pub analytics: Arc<dyn AnalyticsRepositoryTrait>,
}

impl DbState {
    pub fn new(pool: PgPool, analytics: Arc<dyn AnalyticsRepositoryTrait>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            documents: DocumentRepository::new(pool.clone()),
            debts: DebtRepository::new(pool.clone()),
            assets: AssetRepository::new(pool.clone()),
            pitch_access: PitchAccessRepository::new(pool.clone()),
            analytics,
            pool,
        }
    }
}

/// External collaborators; `None` when the integration is not configured.
#[derive(Clone, Default)]
pub struct ServicesState {
    pub assistant: Option<Arc<dyn FinancialAssistant>>,
    pub billing: Option<Arc<dyn BillingProvider>>,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub services: ServicesState,
    pub document_validator: DocumentValidator,
    pub auth_failure_limiter: Arc<AuthFailureLimiter>,
    pub config: Config,
    pub is_production: bool,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for ServicesState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.services.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
