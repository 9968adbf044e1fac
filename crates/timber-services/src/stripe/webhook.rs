use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use timber_core::models::SubscriptionStatus;

use super::{BillingError, CheckoutSession};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Billing events the app reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum BillingEvent {
    CheckoutCompleted(CheckoutSession),
    SubscriptionUpdated {
        customer: String,
        status: SubscriptionStatus,
    },
    SubscriptionDeleted {
        customer: String,
    },
    Other(String),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawSubscription {
    customer: String,
    #[serde(default)]
    status: Option<String>,
}

fn compute_signature(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, BillingError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::InvalidSignature("invalid signing secret"))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a `Stripe-Signature` header value for a payload
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, BillingError> {
    let signature = compute_signature(payload, secret, timestamp)?;
    Ok(format!("t={},v1={}", timestamp, signature))
}

/// Check a `Stripe-Signature` header against the raw request body.
///
/// Any `v1` entry may match; the timestamp must be within
/// [`SIGNATURE_TOLERANCE_SECS`] of `now` (unix seconds).
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), BillingError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(BillingError::InvalidSignature("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(BillingError::InvalidSignature("missing v1 signature"));
    }

    let expected = compute_signature(payload, secret, timestamp)?;
    let matched = signatures
        .iter()
        .any(|candidate| bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())));
    if !matched {
        return Err(BillingError::InvalidSignature("signature mismatch"));
    }

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(BillingError::InvalidSignature("timestamp outside tolerance"));
    }

    Ok(())
}

/// Decode a verified webhook body into a [`BillingEvent`]
pub fn parse_event(payload: &[u8]) -> Result<BillingEvent, BillingError> {
    let raw: RawEvent = serde_json::from_slice(payload)
        .map_err(|e| BillingError::InvalidPayload(e.to_string()))?;

    let invalid = |e: serde_json::Error| BillingError::InvalidPayload(e.to_string());
    match raw.event_type.as_str() {
        "checkout.session.completed" => {
            let session: CheckoutSession =
                serde_json::from_value(raw.data.object).map_err(invalid)?;
            Ok(BillingEvent::CheckoutCompleted(session))
        }
        "customer.subscription.updated" => {
            let subscription: RawSubscription =
                serde_json::from_value(raw.data.object).map_err(invalid)?;
            Ok(BillingEvent::SubscriptionUpdated {
                customer: subscription.customer,
                status: SubscriptionStatus::from_stripe(
                    subscription.status.as_deref().unwrap_or_default(),
                ),
            })
        }
        "customer.subscription.deleted" => {
            let subscription: RawSubscription =
                serde_json::from_value(raw.data.object).map_err(invalid)?;
            Ok(BillingEvent::SubscriptionDeleted {
                customer: subscription.customer,
            })
        }
        _ => Ok(BillingEvent::Other(raw.event_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_760_000_000;

    #[test]
    fn test_signed_payload_verifies() {
        let payload = br#"{"type": "ping"}"#;
        let header = sign_payload(payload, SECRET, NOW).unwrap();
        assert!(header.starts_with(&format!("t={},v1=", NOW)));
        assert!(verify_webhook_signature(payload, &header, SECRET, NOW + 10).is_ok());
    }

    #[test]
    fn test_any_v1_entry_may_match() {
        let payload = b"{}";
        let good = compute_signature(payload, SECRET, NOW).unwrap();
        let header = format!("t={},v1=deadbeef,v0=ignored,v1={}", NOW, good);
        assert!(verify_webhook_signature(payload, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let header = sign_payload(b"{\"amount\": 1}", SECRET, NOW).unwrap();
        let result = verify_webhook_signature(b"{\"amount\": 2}", &header, SECRET, NOW);
        assert!(matches!(
            result,
            Err(BillingError::InvalidSignature("signature mismatch"))
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let header = sign_payload(b"{}", "whsec_other", NOW).unwrap();
        assert!(verify_webhook_signature(b"{}", &header, SECRET, NOW).is_err());
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let header = sign_payload(b"{}", SECRET, NOW).unwrap();
        let result = verify_webhook_signature(b"{}", &header, SECRET, NOW + 301);
        assert!(matches!(
            result,
            Err(BillingError::InvalidSignature("timestamp outside tolerance"))
        ));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        assert!(verify_webhook_signature(b"{}", "", SECRET, NOW).is_err());
        assert!(verify_webhook_signature(b"{}", "t=abc,v1=00", SECRET, NOW).is_err());
        assert!(verify_webhook_signature(b"{}", &format!("t={}", NOW), SECRET, NOW).is_err());
    }

    #[test]
    fn test_parse_checkout_completed() {
        let payload = br#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_1",
                "status": "complete",
                "payment_status": "paid",
                "client_reference_id": "user_7",
                "customer": "cus_7",
                "subscription": "sub_7",
                "metadata": {"plan": "pro_annual", "user_id": "user_7"}
            }}
        }"#;

        match parse_event(payload).unwrap() {
            BillingEvent::CheckoutCompleted(session) => {
                assert!(session.is_paid());
                assert_eq!(session.client_reference_id.as_deref(), Some("user_7"));
                assert_eq!(session.subscription.as_deref(), Some("sub_7"));
            }
            other => panic!("Unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_parse_subscription_events() {
        let updated = br#"{"type": "customer.subscription.updated", "data": {"object": {"id": "sub_1", "customer": "cus_1", "status": "past_due"}}}"#;
        assert_eq!(
            parse_event(updated).unwrap(),
            BillingEvent::SubscriptionUpdated {
                customer: "cus_1".to_string(),
                status: SubscriptionStatus::PastDue,
            }
        );

        let deleted = br#"{"type": "customer.subscription.deleted", "data": {"object": {"id": "sub_1", "customer": "cus_1", "status": "canceled"}}}"#;
        assert_eq!(
            parse_event(deleted).unwrap(),
            BillingEvent::SubscriptionDeleted {
                customer: "cus_1".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_unhandled_and_invalid_events() {
        let other = br#"{"type": "invoice.paid", "data": {"object": {}}}"#;
        assert_eq!(
            parse_event(other).unwrap(),
            BillingEvent::Other("invoice.paid".to_string())
        );
        assert!(matches!(
            parse_event(b"not json"),
            Err(BillingError::InvalidPayload(_))
        ));
    }
}
