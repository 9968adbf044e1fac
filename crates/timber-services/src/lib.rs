//! External collaborators: the OpenAI chat completions API and Stripe billing.
//!
//! Each is reached through a trait (`FinancialAssistant`, `BillingProvider`)
//! so the API can run against fakes in tests.

pub mod openai;
pub mod stripe;

pub use openai::{
    AiError, DocumentAnalysisRequest, DocumentContent, FinancialAssistant, FinancialContext,
    OpenAiClient,
};
pub use stripe::{
    parse_event, verify_webhook_signature, BillingError, BillingEvent, BillingProvider,
    CheckoutRequest, CheckoutSession, StripeClient,
};
