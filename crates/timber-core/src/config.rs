//! Configuration module
//!
//! This module provides the configuration structures for the API server,
//! including database, authentication, document upload limits and the
//! external AI / billing integrations.

use std::env;

use crate::models::SubscriptionPlan;

const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_DOCUMENT_SIZE_MB: usize = 20;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const TRUSTED_PROXY_COUNT: usize = 1;
const MAX_TRUSTED_PROXY_COUNT: usize = 10;
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_PAID_MODEL: &str = "gpt-4o";
const OPENAI_FREE_MODEL: &str = "gpt-4o-mini";
const STRIPE_BASE_URL: &str = "https://api.stripe.com/v1";

/// Stripe price ids for each paid plan.
#[derive(Clone, Debug, Default)]
pub struct StripePrices {
    pub pro_monthly: Option<String>,
    pub pro_annual: Option<String>,
    pub family_monthly: Option<String>,
    pub family_annual: Option<String>,
}

impl StripePrices {
    pub fn price_for(&self, plan: SubscriptionPlan) -> Option<&str> {
        match plan {
            SubscriptionPlan::Free => None,
            SubscriptionPlan::ProMonthly => self.pro_monthly.as_deref(),
            SubscriptionPlan::ProAnnual => self.pro_annual.as_deref(),
            SubscriptionPlan::FamilyMonthly => self.family_monthly.as_deref(),
            SubscriptionPlan::FamilyAnnual => self.family_annual.as_deref(),
        }
    }

    /// Reverse lookup used when Stripe reports a subscription by price id.
    pub fn plan_for_price(&self, price_id: &str) -> Option<SubscriptionPlan> {
        SubscriptionPlan::PAID
            .into_iter()
            .find(|plan| self.price_for(*plan) == Some(price_id))
    }
}

/// Server configuration loaded from the environment.
#[derive(Clone, Debug)]
pub struct TimberConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub admin_view_key: Option<String>,
    pub http_concurrency_limit: usize,
    /// Proxies in front of the server that append to `X-Forwarded-For`
    pub trusted_proxy_count: usize,
    // Document uploads
    pub max_document_size_bytes: usize,
    pub document_allowed_extensions: Vec<String>,
    pub document_allowed_content_types: Vec<String>,
    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_paid_model: String,
    pub openai_free_model: String,
    // Stripe
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub stripe_base_url: String,
    pub stripe_prices: StripePrices,
    pub frontend_url: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<TimberConfig>);

impl Config {
    fn inner(&self) -> &TimberConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = TimberConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().jwt_secret
    }

    pub fn admin_view_key(&self) -> Option<&str> {
        self.inner().admin_view_key.as_deref()
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().http_concurrency_limit
    }

    pub fn trusted_proxy_count(&self) -> usize {
        self.inner().trusted_proxy_count
    }

    pub fn max_document_size_bytes(&self) -> usize {
        self.inner().max_document_size_bytes
    }

    pub fn document_allowed_extensions(&self) -> &[String] {
        &self.inner().document_allowed_extensions
    }

    pub fn document_allowed_content_types(&self) -> &[String] {
        &self.inner().document_allowed_content_types
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        self.inner().openai_api_key.as_deref()
    }

    pub fn openai_base_url(&self) -> &str {
        &self.inner().openai_base_url
    }

    pub fn openai_paid_model(&self) -> &str {
        &self.inner().openai_paid_model
    }

    pub fn openai_free_model(&self) -> &str {
        &self.inner().openai_free_model
    }

    pub fn stripe_secret_key(&self) -> Option<&str> {
        self.inner().stripe_secret_key.as_deref()
    }

    pub fn stripe_webhook_secret(&self) -> Option<&str> {
        self.inner().stripe_webhook_secret.as_deref()
    }

    pub fn stripe_base_url(&self) -> &str {
        &self.inner().stripe_base_url
    }

    pub fn stripe_prices(&self) -> &StripePrices {
        &self.inner().stripe_prices
    }

    pub fn frontend_url(&self) -> Option<&str> {
        self.inner().frontend_url.as_deref()
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn csv_list(name: &str, default: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl TimberConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_document_size_mb = env::var("MAX_DOCUMENT_SIZE_MB")
            .unwrap_or_else(|_| MAX_DOCUMENT_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_DOCUMENT_SIZE_MB);

        let config = TimberConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            admin_view_key: non_empty("ADMIN_VIEW_KEY"),
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            trusted_proxy_count: env::var("TRUSTED_PROXY_COUNT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(TRUSTED_PROXY_COUNT),
            max_document_size_bytes: max_document_size_mb * 1024 * 1024,
            document_allowed_extensions: csv_list(
                "DOCUMENT_ALLOWED_EXTENSIONS",
                "pdf,png,jpg,jpeg,webp,txt,csv",
            ),
            document_allowed_content_types: csv_list(
                "DOCUMENT_ALLOWED_CONTENT_TYPES",
                "application/pdf,image/png,image/jpeg,image/webp,text/plain,text/csv",
            ),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| OPENAI_BASE_URL.to_string()),
            openai_paid_model: env::var("OPENAI_PAID_MODEL")
                .unwrap_or_else(|_| OPENAI_PAID_MODEL.to_string()),
            openai_free_model: env::var("OPENAI_FREE_MODEL")
                .unwrap_or_else(|_| OPENAI_FREE_MODEL.to_string()),
            stripe_secret_key: non_empty("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: non_empty("STRIPE_WEBHOOK_SECRET"),
            stripe_base_url: env::var("STRIPE_BASE_URL")
                .unwrap_or_else(|_| STRIPE_BASE_URL.to_string()),
            stripe_prices: StripePrices {
                pro_monthly: non_empty("PRICE_PRO_MONTHLY"),
                pro_annual: non_empty("PRICE_PRO_ANNUAL"),
                family_monthly: non_empty("PRICE_FAMILY_MONTHLY"),
                family_annual: non_empty("PRICE_FAMILY_ANNUAL"),
            },
            frontend_url: non_empty("FRONTEND_URL"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        let env = self.environment.to_lowercase();
        let is_production = env == "production" || env == "prod";
        if is_production && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.trusted_proxy_count > MAX_TRUSTED_PROXY_COUNT {
            return Err(anyhow::anyhow!(
                "TRUSTED_PROXY_COUNT must be at most {}",
                MAX_TRUSTED_PROXY_COUNT
            ));
        }

        if self.document_allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "DOCUMENT_ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        if self.stripe_webhook_secret.is_some() && self.stripe_secret_key.is_none() {
            return Err(anyhow::anyhow!(
                "STRIPE_WEBHOOK_SECRET requires STRIPE_SECRET_KEY to be set"
            ));
        }

        Ok(())
    }
}
