//! In-process stand-ins for OpenAI, Stripe and the analytics store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;
use timber_core::models::{
    AnalyticsSummary, ChatTurn, DocumentAiAnalysis, EventCount, NewTipEvent, TipCount,
};
use timber_core::AppError;
use timber_db::AnalyticsRepositoryTrait;
use timber_services::{
    AiError, BillingError, BillingProvider, CheckoutRequest, CheckoutSession,
    DocumentAnalysisRequest, FinancialAssistant, FinancialContext,
};

/// Assistant with canned answers; `fail` makes every call error.
#[derive(Default)]
pub struct FakeAssistant {
    pub analysis: DocumentAiAnalysis,
    pub fail: bool,
    pub questions: Mutex<Vec<String>>,
}

impl FakeAssistant {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn outcome(&self, text: String) -> Result<String, AiError> {
        if self.fail {
            return Err(AiError::Api {
                status: 500,
                message: "upstream unavailable".to_string(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl FinancialAssistant for FakeAssistant {
    async fn analyze_document(
        &self,
        _request: DocumentAnalysisRequest<'_>,
    ) -> Result<DocumentAiAnalysis, AiError> {
        self.outcome(String::new())?;
        Ok(self.analysis.clone())
    }

    async fn generate_advice(
        &self,
        model: &str,
        question: &str,
        context: &FinancialContext,
    ) -> Result<String, AiError> {
        self.questions
            .lock()
            .expect("lock")
            .push(question.to_string());
        self.outcome(format!(
            "[{}] {} debts on file. Pay the highest APR first.",
            model,
            context.debt_count
        ))
    }

    async fn chat(
        &self,
        _model: &str,
        message: &str,
        _history: &[ChatTurn],
    ) -> Result<String, AiError> {
        self.outcome(format!("Timber heard: {}", message))
    }
}

/// Billing provider that records checkout requests and serves one session.
#[derive(Default)]
pub struct FakeBilling {
    pub session: Mutex<CheckoutSession>,
    pub requests: Mutex<Vec<CheckoutRequest>>,
}

impl FakeBilling {
    pub fn with_session(session: CheckoutSession) -> Self {
        Self {
            session: Mutex::new(session),
            requests: Mutex::default(),
        }
    }
}

#[async_trait]
impl BillingProvider for FakeBilling {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        self.requests.lock().expect("lock").push(request.clone());
        Ok(CheckoutSession {
            id: "cs_test_fake".to_string(),
            url: Some("https://checkout.stripe.test/c/cs_test_fake".to_string()),
            client_reference_id: Some(request.user_id.clone()),
            ..CheckoutSession::default()
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, BillingError> {
        let session = self.session.lock().expect("lock").clone();
        if session.id != session_id {
            return Err(BillingError::Api {
                status: 404,
                message: "No such checkout.session".to_string(),
            });
        }
        Ok(session)
    }
}

/// Analytics store kept in memory, with the same aggregation as Postgres.
#[derive(Default)]
pub struct InMemoryAnalytics {
    events: Mutex<Vec<(DateTime<Utc>, NewTipEvent)>>,
}

impl InMemoryAnalytics {
    pub fn events(&self) -> Vec<NewTipEvent> {
        self.events
            .lock()
            .expect("lock")
            .iter()
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl AnalyticsRepositoryTrait for InMemoryAnalytics {
    async fn record_event(&self, event: &NewTipEvent) -> Result<(), AppError> {
        self.events
            .lock()
            .expect("lock")
            .push((Utc::now(), event.clone()));
        Ok(())
    }

    async fn summary(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<AnalyticsSummary, AppError> {
        let events = self.events.lock().expect("lock");
        let in_range = events.iter().filter(|(at, _)| {
            since.is_none_or(|s| *at >= s) && until.is_none_or(|u| *at < u)
        });

        let mut by_event: BTreeMap<String, i64> = BTreeMap::new();
        let mut by_tip: BTreeMap<i64, i64> = BTreeMap::new();
        let mut total_events = 0;
        for (_, event) in in_range {
            total_events += 1;
            *by_event.entry(event.event.clone()).or_default() += 1;
            if let Some(hash) = event.tip_hash {
                *by_tip.entry(hash).or_default() += 1;
            }
        }

        Ok(AnalyticsSummary {
            total_events,
            by_event: by_event
                .into_iter()
                .map(|(event, count)| EventCount { event, count })
                .collect(),
            by_tip: by_tip
                .into_iter()
                .map(|(tip_hash, count)| TipCount {
                    tip_hash,
                    tip_id: None,
                    count,
                })
                .collect(),
        })
    }
}
