//! Cashflow analysis and headline financial stats

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use timber_core::models::{CashflowAnalysis, EnrichedAnalysis, FinancialStats};
use timber_core::AppError;
use timber_processing::{analyze_cashflow, financial_stats, resolve_expenses};

/// Positive-transaction totals of the user's completed statements
async fn statement_totals(state: &AppState, user_id: &str) -> Result<Vec<Decimal>, AppError> {
    let analyses = state
        .db
        .documents
        .completed_statement_analyses(user_id)
        .await?;
    Ok(positive_totals(analyses))
}

fn positive_totals(analyses: Vec<Value>) -> Vec<Decimal> {
    analyses
        .into_iter()
        .filter_map(|value| serde_json::from_value::<EnrichedAnalysis>(value).ok())
        .map(|analysis| analysis.positive_total())
        .filter(|total| *total > Decimal::ZERO)
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/cashflow/analysis",
    tag = "insights",
    responses(
        (status = 200, description = "Monthly cashflow and safe extra payment", body = CashflowAnalysis),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_cashflow_analysis(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let profile = state.db.profiles.get(&user.user_id).await?;
    let debts = state.db.debts.list_for_user(&user.user_id).await?;
    let totals = statement_totals(&state, &user.user_id).await?;

    Ok(Json(analyze_cashflow(profile.as_ref(), &debts, &totals)))
}

#[utoipa::path(
    get,
    path = "/api/financial-stats",
    tag = "insights",
    responses(
        (status = 200, description = "Net worth, savings rate and credit rating", body = FinancialStats),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_financial_stats(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let profile = state.db.profiles.get(&user.user_id).await?;
    let debts = state.db.debts.list_for_user(&user.user_id).await?;
    let assets = state.db.assets.list_for_user(&user.user_id).await?;
    let totals = statement_totals(&state, &user.user_id).await?;
    let (expenses, _) = resolve_expenses(profile.as_ref(), &totals);

    Ok(Json(financial_stats(
        profile.as_ref(),
        &debts,
        &assets,
        expenses,
    )))
}
