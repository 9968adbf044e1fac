//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::constants::ADMIN_KEY_HEADER;
use crate::error;
use crate::handlers;
use timber_core::models;

/// Returns the OpenAPI spec for the running API.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Registers the bearer token and admin key schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "admin_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_KEY_HEADER))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timber API",
        version = "0.1.0",
        description = "Personal finance API: document upload and AI analysis, debts and assets, debt payoff planning, cashflow insights, the Timber advisor, and Stripe subscriptions. All endpoints are under /api/."
    ),
    modifiers(&SecurityAddon),
    security(("bearer_auth" = [])),
    paths(
        // Documents
        handlers::documents::upload_document,
        handlers::documents::list_documents,
        handlers::documents::get_document,
        handlers::documents::delete_document,
        // Finances
        handlers::debts::list_debts,
        handlers::debts::create_debt,
        handlers::debts::update_debt,
        handlers::debts::delete_debt,
        handlers::assets::list_assets,
        handlers::assets::create_asset,
        handlers::assets::update_asset,
        handlers::assets::delete_asset,
        handlers::profile::get_profile,
        handlers::profile::update_profile,
        // Payoff and insights
        handlers::payoff::create_payoff_plan,
        handlers::payoff::compare_payoff_strategies,
        handlers::payoff::export_payoff_plan,
        handlers::insights::get_cashflow_analysis,
        handlers::insights::get_financial_stats,
        // Advisor
        handlers::advisor::ask_advisor,
        handlers::advisor::timber_chat,
        handlers::advisor::list_tips,
        handlers::advisor::get_random_tip,
        // Analytics
        handlers::analytics::record_tip_event,
        handlers::analytics::get_analytics_summary,
        // Billing
        handlers::billing::create_checkout,
        handlers::billing::test_checkout,
        handlers::billing::verify_checkout_session,
        handlers::billing::stripe_webhook,
        // Admin review
        handlers::admin_docs::list_review_documents,
        handlers::admin_docs::edit_document,
        handlers::admin_docs::approve_document,
        // Pitch access
        handlers::pitch_access::create_pitch_access,
        handlers::pitch_access::list_pitch_access,
        handlers::pitch_access::deactivate_pitch_access,
        handlers::pitch_access::validate_pitch_access,
    ),
    components(
        schemas(
            // Documents and analysis
            models::Document,
            models::DocumentType,
            models::DocumentStatus,
            models::DocumentEditRequest,
            models::StoredAnalysis,
            models::EnrichedAnalysis,
            models::AnalysisSummary,
            models::AnalysisValidations,
            models::StatementPeriod,
            models::ExtractedTransaction,
            models::ExtractedFinancialData,
            models::ExtractedDebt,
            models::ExtractedAsset,
            models::ExtractedIncome,
            // Finances
            models::Debt,
            models::DebtType,
            models::CreateDebtRequest,
            models::UpdateDebtRequest,
            models::Asset,
            models::AssetType,
            models::CreateAssetRequest,
            models::UpdateAssetRequest,
            models::FinancialProfile,
            models::UpdateProfileRequest,
            // Payoff and insights
            models::PayoffStrategy,
            models::PayoffDebt,
            models::PayoffPlanRequest,
            models::PayoffCompareRequest,
            models::PayoffScheduleEntry,
            models::DebtPayoffSummary,
            models::PayoffPlan,
            models::StrategyComparison,
            models::ExportFormat,
            models::CashflowAnalysis,
            models::BudgetBreakdown,
            models::ExpenseSource,
            models::FinancialStats,
            models::CreditRating,
            // Advisor
            models::AdvisorQuestion,
            models::AdvisorAnswer,
            models::ChatRole,
            models::ChatTurn,
            models::TimberChatRequest,
            models::TimberChatReply,
            models::Tip,
            models::TipCategory,
            // Analytics
            models::AnalyticsSummary,
            models::EventCount,
            models::TipCount,
            // Billing
            models::SubscriptionPlan,
            models::SubscriptionStatus,
            models::User,
            handlers::billing::CheckoutBody,
            handlers::billing::CheckoutResponse,
            handlers::billing::SubscriptionSummary,
            handlers::billing::VerifySessionResponse,
            handlers::billing::WebhookAck,
            // Admin and pitch access
            handlers::admin_docs::ReviewActionResponse,
            models::PitchAccessToken,
            models::CreatePitchAccessRequest,
            models::CreatePitchAccessResponse,
            models::PitchAccessValidation,
            // Error
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "documents", description = "Financial document upload and AI analysis"),
        (name = "finances", description = "Debts, assets and the financial profile"),
        (name = "payoff", description = "Debt payoff plans, strategy comparison and exports"),
        (name = "insights", description = "Cashflow analysis and financial stats"),
        (name = "advisor", description = "AI advisor, Timber chat and tips"),
        (name = "analytics", description = "Timber tip analytics"),
        (name = "billing", description = "Stripe checkout and webhooks"),
        (name = "admin", description = "Document review queue (admin key)"),
        (name = "pitch", description = "Pitch page access tokens")
    )
)]
pub struct ApiDoc;
