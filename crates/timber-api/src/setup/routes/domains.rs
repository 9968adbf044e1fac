//! Domain route groups (documents, finances, payoff, advisor, billing, admin).

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;

pub fn document_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/documents", API_PREFIX),
            post(handlers::documents::upload_document).get(handlers::documents::list_documents),
        )
        .route(
            &format!("{}/documents/{{id}}", API_PREFIX),
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .with_state(state)
}

pub fn finance_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/debts", API_PREFIX),
            get(handlers::debts::list_debts).post(handlers::debts::create_debt),
        )
        .route(
            &format!("{}/debts/{{id}}", API_PREFIX),
            put(handlers::debts::update_debt).delete(handlers::debts::delete_debt),
        )
        .route(
            &format!("{}/assets", API_PREFIX),
            get(handlers::assets::list_assets).post(handlers::assets::create_asset),
        )
        .route(
            &format!("{}/assets/{{id}}", API_PREFIX),
            put(handlers::assets::update_asset).delete(handlers::assets::delete_asset),
        )
        .route(
            &format!("{}/profile", API_PREFIX),
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .with_state(state)
}

pub fn payoff_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/payoff-plan", API_PREFIX),
            post(handlers::payoff::create_payoff_plan),
        )
        .route(
            &format!("{}/payoff-plan/compare", API_PREFIX),
            post(handlers::payoff::compare_payoff_strategies),
        )
        .route(
            &format!("{}/payoff-plan/export", API_PREFIX),
            post(handlers::payoff::export_payoff_plan),
        )
        .route(
            &format!("{}/cashflow/analysis", API_PREFIX),
            get(handlers::insights::get_cashflow_analysis),
        )
        .route(
            &format!("{}/financial-stats", API_PREFIX),
            get(handlers::insights::get_financial_stats),
        )
        .with_state(state)
}

pub fn advisor_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/advisor/ask", API_PREFIX),
            post(handlers::advisor::ask_advisor),
        )
        .route(
            &format!("{}/timber/chat", API_PREFIX),
            post(handlers::advisor::timber_chat),
        )
        .with_state(state)
}

pub fn billing_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/checkout", API_PREFIX),
            post(handlers::billing::create_checkout),
        )
        .route(
            &format!("{}/checkout/test/{{plan}}", API_PREFIX),
            get(handlers::billing::test_checkout),
        )
        .route(
            &format!("{}/checkout/verify-session", API_PREFIX),
            get(handlers::billing::verify_checkout_session),
        )
        .with_state(state)
}

/// Routes gated by the admin view key instead of a user token
pub fn admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/admin/docs", API_PREFIX),
            get(handlers::admin_docs::list_review_documents),
        )
        .route(
            &format!("{}/admin/docs/{{id}}/edit", API_PREFIX),
            post(handlers::admin_docs::edit_document),
        )
        .route(
            &format!("{}/admin/docs/{{id}}/approve", API_PREFIX),
            post(handlers::admin_docs::approve_document),
        )
        .route(
            &format!("{}/timber/analytics/summary", API_PREFIX),
            get(handlers::analytics::get_analytics_summary),
        )
        .route(
            &format!("{}/pitch-access/create", API_PREFIX),
            post(handlers::pitch_access::create_pitch_access),
        )
        .route(
            &format!("{}/pitch-access/list", API_PREFIX),
            get(handlers::pitch_access::list_pitch_access),
        )
        .route(
            &format!("{}/pitch-access/deactivate/{{id}}", API_PREFIX),
            delete(handlers::pitch_access::deactivate_pitch_access),
        )
        .with_state(state)
}

/// Unauthenticated API routes: tips, the analytics beacon, the Stripe
/// webhook and pitch token validation.
pub fn open_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/timber/tips", API_PREFIX),
            get(handlers::advisor::list_tips),
        )
        .route(
            &format!("{}/timber/tips/random", API_PREFIX),
            get(handlers::advisor::get_random_tip),
        )
        .route(
            &format!("{}/timber/analytics", API_PREFIX),
            post(handlers::analytics::record_tip_event),
        )
        .route(
            &format!("{}/stripe/webhook", API_PREFIX),
            post(handlers::billing::stripe_webhook),
        )
        .route(
            &format!("{}/pitch-access/validate/{{token}}", API_PREFIX),
            get(handlers::pitch_access::validate_pitch_access),
        )
        .with_state(state)
}
