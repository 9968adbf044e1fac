//! AI financial advisor, the Timber chat assistant and its tips

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::model_for;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use timber_core::models::{
    AdvisorAnswer, AdvisorQuestion, Tip, TimberChatReply, TimberChatRequest, TipQuery,
};
use timber_core::AppError;
use timber_processing::tips::{fallback_reply, random_tip, tip_for_message, tips_by_category};
use timber_services::FinancialContext;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/advisor/ask",
    tag = "advisor",
    request_body = AdvisorQuestion,
    responses(
        (status = 200, description = "Advice grounded in the user's figures", body = AdvisorAnswer),
        (status = 400, description = "Invalid question", body = ErrorResponse),
        (status = 503, description = "AI is not configured", body = ErrorResponse)
    )
)]
pub async fn ask_advisor(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<AdvisorQuestion>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let assistant = state
        .services
        .assistant
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("AI advisor is not configured".to_string()))?;

    let debts = state.db.debts.list_for_user(&user.user_id).await?;
    let assets = state.db.assets.list_for_user(&user.user_id).await?;
    let profile = state.db.profiles.get(&user.user_id).await?;
    let context = FinancialContext::from_records(&debts, &assets, profile.as_ref());

    let model = model_for(&state.config, user.is_paid);
    let answer = assistant
        .generate_advice(model, request.question.trim(), &context)
        .await?;

    Ok(Json(AdvisorAnswer {
        answer,
        model: model.to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/timber/chat",
    tag = "advisor",
    request_body = TimberChatRequest,
    responses(
        (status = 200, description = "Timber's reply and a related tip", body = TimberChatReply),
        (status = 400, description = "Invalid message", body = ErrorResponse)
    )
)]
pub async fn timber_chat(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<TimberChatRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let message = request.message.trim();

    let reply = match state.services.assistant.as_ref() {
        Some(assistant) => {
            let model = model_for(&state.config, user.is_paid);
            match assistant.chat(model, message, &request.history).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(user_id = %user.user_id, error = %e, "Timber chat fell back to a canned reply");
                    fallback_reply(message).to_string()
                }
            }
        }
        None => fallback_reply(message).to_string(),
    };

    Ok(Json(TimberChatReply {
        reply,
        tip: tip_for_message(message),
    }))
}

#[utoipa::path(
    get,
    path = "/api/timber/tips",
    tag = "advisor",
    params(TipQuery),
    responses(
        (status = 200, description = "Built-in Timber tips", body = Vec<Tip>)
    )
)]
pub async fn list_tips(Query(query): Query<TipQuery>) -> impl IntoResponse {
    Json(tips_by_category(query.category))
}

#[utoipa::path(
    get,
    path = "/api/timber/tips/random",
    tag = "advisor",
    params(TipQuery),
    responses(
        (status = 200, description = "One random tip", body = Tip),
        (status = 404, description = "No tip in that category", body = ErrorResponse)
    )
)]
pub async fn get_random_tip(
    Query(query): Query<TipQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tip = random_tip(query.category)
        .ok_or_else(|| AppError::NotFound("No tips in that category".to_string()))?;
    Ok(Json(tip))
}
