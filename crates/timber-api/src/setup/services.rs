//! Service initialization and application state setup

use crate::auth::AuthFailureLimiter;
use crate::constants::{AUTH_FAILURE_LIMIT, AUTH_FAILURE_WINDOW_SECS};
use crate::state::{AppState, DbState, ServicesState};
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use timber_core::Config;
use timber_db::PostgresAnalyticsRepository;
use timber_processing::DocumentValidator;
use timber_services::{BillingProvider, FinancialAssistant, OpenAiClient, StripeClient};

/// Build the external clients whose keys are configured
pub fn build_services(config: &Config) -> Result<ServicesState> {
    let assistant: Option<Arc<dyn FinancialAssistant>> = match config.openai_api_key() {
        Some(key) => {
            let client = OpenAiClient::new(key, config.openai_base_url())
                .context("Failed to build OpenAI client")?;
            tracing::info!(
                paid_model = %config.openai_paid_model(),
                free_model = %config.openai_free_model(),
                "OpenAI document analysis and advisor enabled"
            );
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set; uploads are stored without analysis");
            None
        }
    };

    let billing: Option<Arc<dyn BillingProvider>> = match config.stripe_secret_key() {
        Some(key) => {
            let client = StripeClient::new(key, config.stripe_base_url())
                .context("Failed to build Stripe client")?;
            tracing::info!("Stripe billing enabled");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set; checkout is disabled");
            None
        }
    };

    Ok(ServicesState { assistant, billing })
}

/// Assemble the application state around an existing pool and services
pub fn build_state(config: &Config, pool: PgPool, services: ServicesState) -> Arc<AppState> {
    let analytics = Arc::new(PostgresAnalyticsRepository::new(pool.clone()));
    let document_validator = DocumentValidator::new(
        config.max_document_size_bytes(),
        config.document_allowed_extensions().to_vec(),
        config.document_allowed_content_types().to_vec(),
    );

    Arc::new(AppState {
        db: DbState::new(pool, analytics),
        services,
        document_validator,
        auth_failure_limiter: Arc::new(AuthFailureLimiter::new(
            AUTH_FAILURE_LIMIT,
            AUTH_FAILURE_WINDOW_SECS,
        )),
        is_production: config.is_production(),
        config: config.clone(),
    })
}

/// Initialize all services and repositories, returning the application state
pub fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let services = build_services(config)?;
    Ok(build_state(config, pool, services))
}
