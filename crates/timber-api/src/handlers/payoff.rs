use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use timber_core::models::{
    ExportQuery, PayoffCompareRequest, PayoffDebt, PayoffPlan, PayoffPlanRequest,
    StrategyComparison,
};
use timber_core::AppError;
use timber_processing::{compare_strategies, export_plan, generate_payoff_plan, PayoffOptions};

/// The user's open debts as engine input
async fn open_debts(state: &AppState, user_id: &str) -> Result<Vec<PayoffDebt>, AppError> {
    let debts = state.db.debts.list_for_user(user_id).await?;
    Ok(debts
        .iter()
        .filter(|d| d.current_balance > Decimal::ZERO)
        .map(PayoffDebt::from)
        .collect())
}

fn start_date(requested: Option<NaiveDate>) -> NaiveDate {
    requested.unwrap_or_else(|| Utc::now().date_naive())
}

async fn build_plan(
    state: &AppState,
    user: &UserContext,
    request: &PayoffPlanRequest,
) -> Result<PayoffPlan, HttpAppError> {
    let debts = open_debts(state, &user.user_id).await?;
    let plan = generate_payoff_plan(
        &debts,
        PayoffOptions {
            strategy: request.strategy,
            monthly_budget: request.monthly_budget,
            start_date: start_date(request.start_date),
        },
    )?;
    Ok(plan)
}

#[utoipa::path(
    post,
    path = "/api/payoff-plan",
    tag = "payoff",
    request_body = PayoffPlanRequest,
    responses(
        (status = 200, description = "Month-by-month payoff plan", body = PayoffPlan),
        (status = 400, description = "Budget below minimums or invalid debts", body = ErrorResponse)
    )
)]
pub async fn create_payoff_plan(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<PayoffPlanRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let plan = build_plan(&state, &user, &request).await?;
    tracing::debug!(
        user_id = %user.user_id,
        strategy = request.strategy.as_str(),
        total_months = plan.total_months,
        "Payoff plan generated"
    );
    Ok(Json(plan))
}

#[utoipa::path(
    post,
    path = "/api/payoff-plan/compare",
    tag = "payoff",
    request_body = PayoffCompareRequest,
    responses(
        (status = 200, description = "Avalanche and snowball side by side", body = StrategyComparison),
        (status = 400, description = "Budget below minimums or invalid debts", body = ErrorResponse)
    )
)]
pub async fn compare_payoff_strategies(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<PayoffCompareRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let debts = open_debts(&state, &user.user_id).await?;
    let comparison = compare_strategies(
        &debts,
        request.monthly_budget,
        start_date(request.start_date),
    )?;
    Ok(Json(comparison))
}

#[utoipa::path(
    post,
    path = "/api/payoff-plan/export",
    tag = "payoff",
    params(ExportQuery),
    request_body = PayoffPlanRequest,
    responses(
        (status = 200, description = "Schedule file download", body = String, content_type = "text/csv"),
        (status = 400, description = "Budget below minimums or invalid debts", body = ErrorResponse)
    )
)]
pub async fn export_payoff_plan(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Query(query): Query<ExportQuery>,
    ValidatedJson(request): ValidatedJson<PayoffPlanRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let plan = build_plan(&state, &user, &request).await?;
    let format = query.format.unwrap_or_default();
    let export = export_plan(&plan, format, Utc::now().date_naive())?;

    Ok((
        [
            (header::CONTENT_TYPE, export.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.body,
    ))
}
