//! Stripe Checkout for subscriptions, plus webhook verification

mod client;
mod webhook;

pub use client::StripeClient;
pub use webhook::{parse_event, sign_payload, verify_webhook_signature, BillingEvent};

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use timber_core::models::SubscriptionPlan;

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Stripe request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Stripe returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(&'static str),

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// A subscription checkout to open for a user
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub plan: SubscriptionPlan,
    pub price_id: String,
    pub user_id: String,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// The fields of a Checkout Session this app relies on
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// Complete and paid (or free of charge, e.g. a 100% promotion code)
    pub fn is_paid(&self) -> bool {
        self.status.as_deref() == Some("complete")
            && matches!(
                self.payment_status.as_deref(),
                Some("paid") | Some("no_payment_required")
            )
    }

    /// Plan recorded in the session metadata at creation
    pub fn plan(&self) -> Option<SubscriptionPlan> {
        self.metadata.get("plan")?.parse().ok()
    }
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, BillingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(status: &str, payment_status: &str) -> CheckoutSession {
        CheckoutSession {
            id: "cs_test_1".to_string(),
            status: Some(status.to_string()),
            payment_status: Some(payment_status.to_string()),
            metadata: HashMap::from([("plan".to_string(), "pro_annual".to_string())]),
            ..Default::default()
        }
    }

    #[test]
    fn test_session_is_paid() {
        assert!(session("complete", "paid").is_paid());
        assert!(session("complete", "no_payment_required").is_paid());
        assert!(!session("complete", "unpaid").is_paid());
        assert!(!session("open", "paid").is_paid());
    }

    #[test]
    fn test_session_plan_from_metadata() {
        assert_eq!(session("complete", "paid").plan(), Some(SubscriptionPlan::ProAnnual));
        assert_eq!(CheckoutSession::default().plan(), None);
    }
}
