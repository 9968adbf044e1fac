//! Subscription checkout and Stripe event handling

use crate::auth::UserContext;
use crate::state::AppState;
use axum::http::{header, HeaderMap};
use timber_core::models::{SubscriptionPlan, SubscriptionStatus, SubscriptionUpdate, User};
use timber_core::AppError;
use timber_services::{BillingEvent, BillingProvider, CheckoutRequest, CheckoutSession};

/// Where Stripe sends the browser back to: the `Origin` header, then
/// `FRONTEND_URL`, then the request host.
pub fn checkout_origin(headers: &HeaderMap, frontend_url: Option<&str>) -> Option<String> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "null")
        .map(String::from);

    origin
        .or_else(|| frontend_url.map(String::from))
        .or_else(|| {
            let host = headers.get(header::HOST)?.to_str().ok()?;
            let scheme = headers
                .get("x-forwarded-proto")
                .and_then(|h| h.to_str().ok())
                .unwrap_or("http");
            Some(format!("{}://{}", scheme, host))
        })
        .map(|o| o.trim_end_matches('/').to_string())
}

/// Success and cancel URLs for a checkout opened from `origin`
pub fn checkout_urls(origin: &str) -> (String, String) {
    (
        format!(
            "{}/subscription-success?session_id={{CHECKOUT_SESSION_ID}}",
            origin
        ),
        format!("{}/?checkout=cancel", origin),
    )
}

fn billing(state: &AppState) -> Result<&dyn BillingProvider, AppError> {
    state
        .services
        .billing
        .as_deref()
        .ok_or_else(|| AppError::ServiceUnavailable("Billing is not configured".to_string()))
}

/// Open a subscription checkout for `plan_key` and return its URL
pub async fn start_checkout(
    state: &AppState,
    user: &UserContext,
    plan_key: &str,
    origin: &str,
) -> Result<String, AppError> {
    let plan = SubscriptionPlan::from_checkout_key(plan_key)
        .ok_or_else(|| AppError::BadRequest("Invalid plan.".to_string()))?;

    let price_id = state
        .config
        .stripe_prices()
        .price_for(plan)
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Missing Stripe price id for plan {} ({})",
                plan,
                plan.price_env_var().unwrap_or_default()
            ))
        })?
        .to_string();

    let provider = billing(state)?;
    let (success_url, cancel_url) = checkout_urls(origin);
    let session = provider
        .create_checkout_session(&CheckoutRequest {
            plan,
            price_id,
            user_id: user.user_id.clone(),
            customer_email: user.email.clone(),
            success_url,
            cancel_url,
        })
        .await
        .map_err(|e| AppError::StripeError(e.to_string()))?;

    tracing::info!(user_id = %user.user_id, plan = %plan, session_id = %session.id, "Checkout session created");

    session
        .url
        .ok_or_else(|| AppError::StripeError("Checkout session has no URL".to_string()))
}

/// Outcome of confirming a checkout session
#[derive(Debug)]
pub enum SessionVerification {
    Activated(User),
    Pending,
}

/// Confirm a session the browser came back with; a paid session activates the plan
pub async fn verify_session(
    state: &AppState,
    user: &UserContext,
    session_id: &str,
) -> Result<SessionVerification, AppError> {
    let session = billing(state)?
        .retrieve_session(session_id)
        .await
        .map_err(|e| AppError::StripeError(e.to_string()))?;

    if session_owner(&session) != Some(user.user_id.as_str()) {
        return Err(AppError::NotFound("Checkout session not found".to_string()));
    }

    if !session.is_paid() {
        return Ok(SessionVerification::Pending);
    }

    let update = activation(&session)
        .ok_or_else(|| AppError::StripeError("Checkout session has no plan".to_string()))?;
    let updated = state
        .db
        .users
        .update_subscription(&user.user_id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.user_id, plan = %update.plan, "Subscription activated");
    Ok(SessionVerification::Activated(updated))
}

/// User a session was opened for
fn session_owner(session: &CheckoutSession) -> Option<&str> {
    session
        .client_reference_id
        .as_deref()
        .or_else(|| session.metadata.get("user_id").map(String::as_str))
}

/// Subscription fields written when a session completes
pub fn activation(session: &CheckoutSession) -> Option<SubscriptionUpdate> {
    Some(SubscriptionUpdate {
        plan: session.plan()?,
        status: SubscriptionStatus::Active,
        stripe_customer_id: session.customer.clone(),
        stripe_subscription_id: session.subscription.clone(),
    })
}

/// Apply a verified webhook event to the users table
pub async fn apply_event(state: &AppState, event: BillingEvent) -> Result<(), AppError> {
    match event {
        BillingEvent::CheckoutCompleted(session) => {
            let (Some(user_id), Some(update)) = (session_owner(&session), activation(&session))
            else {
                tracing::warn!(session_id = %session.id, "Completed session without user or plan");
                return Ok(());
            };
            if !session.is_paid() {
                tracing::debug!(session_id = %session.id, "Completed session is not paid yet");
                return Ok(());
            }
            let updated = state.db.users.update_subscription(user_id, &update).await?;
            tracing::info!(
                user_id = user_id,
                plan = %update.plan,
                found = updated.is_some(),
                "Subscription activated from webhook"
            );
        }
        BillingEvent::SubscriptionUpdated { customer, status } => {
            let rows = state
                .db
                .users
                .update_status_by_customer(&customer, status)
                .await?;
            tracing::info!(customer = %customer, status = %status, rows, "Subscription status updated");
        }
        BillingEvent::SubscriptionDeleted { customer } => {
            let rows = state.db.users.cancel_by_customer(&customer).await?;
            tracing::info!(customer = %customer, rows, "Subscription canceled");
        }
        BillingEvent::Other(event_type) => {
            tracing::debug!(event_type = %event_type, "Ignoring Stripe event");
        }
    }
    Ok(())
}
