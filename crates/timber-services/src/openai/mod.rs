//! Financial assistant backed by an OpenAI-compatible chat completions API

mod client;
mod context;
mod prompts;

pub use client::OpenAiClient;
pub use context::{advice_message, format_amount, FinancialContext};

use async_trait::async_trait;
use timber_core::models::{ChatTurn, DocumentAiAnalysis, DocumentType};

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("AI service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("AI response could not be used: {0}")]
    InvalidResponse(String),
}

/// What is sent to the model for a document
#[derive(Debug, Clone, Copy)]
pub enum DocumentContent<'a> {
    Image { data: &'a [u8], mime_type: &'a str },
    Text(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub struct DocumentAnalysisRequest<'a> {
    pub model: &'a str,
    pub document_type: DocumentType,
    pub content: DocumentContent<'a>,
}

#[async_trait]
pub trait FinancialAssistant: Send + Sync {
    /// Extract a summary, stated figures and debts/assets/income from a document
    async fn analyze_document(
        &self,
        request: DocumentAnalysisRequest<'_>,
    ) -> Result<DocumentAiAnalysis, AiError>;

    /// Answer a personal finance question given the user's figures
    async fn generate_advice(
        &self,
        model: &str,
        question: &str,
        context: &FinancialContext,
    ) -> Result<String, AiError>;

    /// Reply in the Timber persona. Fails on an empty completion.
    async fn chat(
        &self,
        model: &str,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, AiError>;
}
