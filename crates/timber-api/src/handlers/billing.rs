//! Stripe checkout and webhook endpoints

use crate::auth::UserContext;
use crate::constants::STRIPE_SIGNATURE_HEADER;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::billing::{
    apply_event, checkout_origin, start_checkout, verify_session, SessionVerification,
};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use timber_core::models::{SubscriptionPlan, SubscriptionStatus};
use timber_core::AppError;
use timber_services::{parse_event, verify_webhook_signature};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutBody {
    /// One of family_monthly, pro_annual, family_annual, pro_monthly
    pub plan: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifySessionQuery {
    pub session_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionSummary {
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifySessionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<SessionVerification> for VerifySessionResponse {
    fn from(verification: SessionVerification) -> Self {
        match verification {
            SessionVerification::Activated(user) => Self {
                success: true,
                subscription: Some(SubscriptionSummary {
                    plan: user.subscription_plan,
                    status: user.subscription_status,
                }),
                pending: None,
                message: None,
            },
            SessionVerification::Pending => Self {
                success: false,
                subscription: None,
                pending: Some(true),
                message: Some("Payment is still being processed".to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}

async fn checkout(
    state: &AppState,
    user: &UserContext,
    headers: &HeaderMap,
    plan: &str,
) -> Result<CheckoutResponse, AppError> {
    let origin = checkout_origin(headers, state.config.frontend_url()).ok_or_else(|| {
        AppError::BadRequest("Cannot determine where to return after checkout".to_string())
    })?;
    let url = start_checkout(state, user, plan, &origin).await?;
    Ok(CheckoutResponse { url })
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    tag = "billing",
    request_body = CheckoutBody,
    responses(
        (status = 200, description = "Checkout session URL", body = CheckoutResponse),
        (status = 400, description = "Invalid plan", body = ErrorResponse),
        (status = 503, description = "Billing is not configured", body = ErrorResponse)
    )
)]
pub async fn create_checkout(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<CheckoutBody>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = checkout(&state, &user, &headers, &body.plan).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/checkout/test/{plan}",
    tag = "billing",
    params(("plan" = String, Path, description = "Plan key")),
    responses(
        (status = 200, description = "Checkout session URL", body = CheckoutResponse),
        (status = 400, description = "Invalid plan", body = ErrorResponse)
    )
)]
pub async fn test_checkout(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    headers: HeaderMap,
    Path(plan): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = checkout(&state, &user, &headers, &plan).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/checkout/verify-session",
    tag = "billing",
    params(VerifySessionQuery),
    responses(
        (status = 200, description = "Activated subscription or pending payment", body = VerifySessionResponse),
        (status = 404, description = "Session belongs to another user", body = ErrorResponse)
    )
)]
pub async fn verify_checkout_session(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Query(query): Query<VerifySessionQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    if query.session_id.trim().is_empty() {
        return Err(AppError::BadRequest("session_id is required".to_string()).into());
    }
    let verification = verify_session(&state, &user, query.session_id.trim()).await?;
    Ok(Json(VerifySessionResponse::from(verification)))
}

#[utoipa::path(
    post,
    path = "/api/stripe/webhook",
    tag = "billing",
    request_body(content = String, description = "Raw Stripe event", content_type = "application/json"),
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 400, description = "Invalid signature or payload", body = ErrorResponse),
        (status = 503, description = "Webhook secret is not configured", body = ErrorResponse)
    )
)]
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let secret = state.config.stripe_webhook_secret().ok_or_else(|| {
        AppError::ServiceUnavailable("Stripe webhook secret is not configured".to_string())
    })?;

    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    verify_webhook_signature(&body, signature, secret, Utc::now().timestamp())?;
    let event = parse_event(&body)?;
    apply_event(&state, event).await?;

    Ok(Json(WebhookAck { received: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use timber_core::models::User;

    #[test]
    fn test_verify_session_response_shapes() {
        let pending = serde_json::to_value(VerifySessionResponse::from(
            SessionVerification::Pending,
        ))
        .unwrap();
        assert_eq!(pending["success"], false);
        assert_eq!(pending["pending"], true);
        assert!(pending.get("subscription").is_none());

        let user = User {
            id: "user_1".to_string(),
            email: None,
            first_name: None,
            last_name: None,
            subscription_plan: SubscriptionPlan::ProMonthly,
            subscription_status: SubscriptionStatus::Active,
            stripe_customer_id: Some("cus_1".to_string()),
            stripe_subscription_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let activated =
            serde_json::to_value(VerifySessionResponse::from(SessionVerification::Activated(user)))
                .unwrap();
        assert_eq!(activated["success"], true);
        assert_eq!(activated["subscription"]["plan"], "pro_monthly");
        assert_eq!(activated["subscription"]["status"], "active");
        assert!(activated.get("pending").is_none());
    }
}
