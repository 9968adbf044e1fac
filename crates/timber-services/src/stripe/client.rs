use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use super::{BillingError, BillingProvider, CheckoutRequest, CheckoutSession};

/// Stripe REST client (form-encoded requests, JSON responses)
pub struct StripeClient {
    http_client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl Debug for StripeClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StripeClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: String,
}

impl StripeClient {
    pub fn new(
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, BillingError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            secret_key: secret_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn parse_session(response: reqwest::Response) -> Result<CheckoutSession, BillingError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), error = %message, "Stripe request failed");
            return Err(BillingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("mode", "subscription".to_string()),
        ("line_items[0][price]", request.price_id.clone()),
        ("line_items[0][quantity]", "1".to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("automatic_tax[enabled]", "true".to_string()),
        ("allow_promotion_codes", "true".to_string()),
        ("client_reference_id", request.user_id.clone()),
        ("metadata[plan]", request.plan.as_str().to_string()),
        ("metadata[user_id]", request.user_id.clone()),
    ];
    if let Some(email) = &request.customer_email {
        form.push(("customer_email", email.clone()));
    }
    form
}

#[async_trait]
impl BillingProvider for StripeClient {
    #[tracing::instrument(skip(self, request), fields(plan = %request.plan))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        let response = self
            .http_client
            .post(format!("{}/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(request))
            .send()
            .await?;

        let session = Self::parse_session(response).await?;
        tracing::info!(session_id = %session.id, "Checkout session created");
        Ok(session)
    }

    #[tracing::instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, BillingError> {
        let response = self
            .http_client
            .get(format!("{}/checkout/sessions/{}", self.base_url, session_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        Self::parse_session(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use timber_core::models::SubscriptionPlan;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            plan: SubscriptionPlan::FamilyMonthly,
            price_id: "price_family_m".to_string(),
            user_id: "user_42".to_string(),
            customer_email: Some("sam@example.com".to_string()),
            success_url: "https://app.example.com/subscription-success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "https://app.example.com/?checkout=cancel".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_checkout_session_posts_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/checkout/sessions")
            .match_header("authorization", "Bearer sk_test_123")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("mode".into(), "subscription".into()),
                Matcher::UrlEncoded("line_items[0][price]".into(), "price_family_m".into()),
                Matcher::UrlEncoded("automatic_tax[enabled]".into(), "true".into()),
                Matcher::UrlEncoded("allow_promotion_codes".into(), "true".into()),
                Matcher::UrlEncoded("client_reference_id".into(), "user_42".into()),
                Matcher::UrlEncoded("metadata[plan]".into(), "family_monthly".into()),
                Matcher::UrlEncoded(
                    "success_url".into(),
                    "https://app.example.com/subscription-success?session_id={CHECKOUT_SESSION_ID}"
                        .into(),
                ),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id": "cs_test_1", "object": "checkout.session", "url": "https://checkout.stripe.com/c/pay/cs_test_1", "status": "open", "payment_status": "unpaid", "metadata": {"plan": "family_monthly"}}"#,
            )
            .create_async()
            .await;

        let client = StripeClient::new("sk_test_123", server.url()).unwrap();
        let session = client.create_checkout_session(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(session.id, "cs_test_1");
        assert_eq!(
            session.url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_test_1")
        );
        assert!(!session.is_paid());
    }

    #[tokio::test]
    async fn test_retrieve_session() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/checkout/sessions/cs_test_2")
            .with_status(200)
            .with_body(
                r#"{"id": "cs_test_2", "status": "complete", "payment_status": "paid", "client_reference_id": "user_42", "customer": "cus_1", "subscription": "sub_1", "metadata": {"plan": "pro_monthly"}}"#,
            )
            .create_async()
            .await;

        let client = StripeClient::new("sk_test_123", server.url()).unwrap();
        let session = client.retrieve_session("cs_test_2").await.unwrap();

        assert!(session.is_paid());
        assert_eq!(session.plan(), Some(SubscriptionPlan::ProMonthly));
        assert_eq!(session.customer.as_deref(), Some("cus_1"));
        assert_eq!(session.subscription.as_deref(), Some("sub_1"));
    }

    #[tokio::test]
    async fn test_stripe_error_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/checkout/sessions/cs_missing")
            .with_status(404)
            .with_body(r#"{"error": {"type": "invalid_request_error", "message": "No such checkout.session: 'cs_missing'"}}"#)
            .create_async()
            .await;

        let client = StripeClient::new("sk_test_123", server.url()).unwrap();
        match client.retrieve_session("cs_missing").await.unwrap_err() {
            BillingError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("cs_missing"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }
}
