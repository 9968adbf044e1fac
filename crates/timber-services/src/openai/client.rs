use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use timber_core::constants::CHAT_HISTORY_TURNS;
use timber_core::models::{ChatRole, ChatTurn, DocumentAiAnalysis};

use super::context::{advice_message, FinancialContext};
use super::prompts::{
    document_system_prompt, document_user_prompt, extract_json, ADVISOR_SYSTEM_PROMPT,
    EMPTY_ADVICE_FALLBACK, EMPTY_ANALYSIS_SUMMARY, MAX_DOCUMENT_TEXT_CHARS, TIMBER_SYSTEM_PROMPT,
};
use super::{AiError, DocumentAnalysisRequest, DocumentContent, FinancialAssistant};

/// Chat completions client
pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl Debug for OpenAiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

impl ChatMessage {
    fn text(role: &'static str, text: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(text.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, AiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Run one completion and return the first choice's text, if any
    async fn complete(&self, request: &ChatCompletionRequest<'_>) -> Result<Option<String>, AiError> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), model = request.model, "Chat completion failed");
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty());

        Ok(text)
    }
}

fn document_message(request: &DocumentAnalysisRequest<'_>) -> ChatMessage {
    let prompt = document_user_prompt(request.document_type);
    match request.content {
        DocumentContent::Image { data, mime_type } => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(data);
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:{};base64,{}", mime_type, encoded),
                        },
                    },
                ]),
            }
        }
        DocumentContent::Text(text) => {
            let text: String = text.chars().take(MAX_DOCUMENT_TEXT_CHARS).collect();
            ChatMessage::text("user", format!("{}\n\nDocument text:\n{}", prompt, text))
        }
    }
}

fn history_messages(history: &[ChatTurn]) -> impl Iterator<Item = ChatMessage> + '_ {
    let skip = history.len().saturating_sub(CHAT_HISTORY_TURNS);
    history[skip..].iter().map(|turn| {
        let role = match turn.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        ChatMessage::text(role, turn.content.clone())
    })
}

#[async_trait]
impl FinancialAssistant for OpenAiClient {
    #[tracing::instrument(skip(self, request), fields(model = request.model, document_type = %request.document_type))]
    async fn analyze_document(
        &self,
        request: DocumentAnalysisRequest<'_>,
    ) -> Result<DocumentAiAnalysis, AiError> {
        let body = ChatCompletionRequest {
            model: request.model,
            messages: vec![
                ChatMessage::text("system", document_system_prompt(request.document_type)),
                document_message(&request),
            ],
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let text = self.complete(&body).await?.unwrap_or_else(|| "{}".to_string());
        let mut analysis: DocumentAiAnalysis = serde_json::from_str(extract_json(&text))
            .map_err(|e| AiError::InvalidResponse(format!("document analysis JSON: {}", e)))?;

        if analysis.summary.trim().is_empty() {
            analysis.summary = EMPTY_ANALYSIS_SUMMARY.to_string();
        }

        tracing::debug!(
            debts = analysis.extracted_data.debts.len(),
            assets = analysis.extracted_data.assets.len(),
            "Document analyzed"
        );
        Ok(analysis)
    }

    #[tracing::instrument(skip(self, question, context))]
    async fn generate_advice(
        &self,
        model: &str,
        question: &str,
        context: &FinancialContext,
    ) -> Result<String, AiError> {
        let body = ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage::text("system", ADVISOR_SYSTEM_PROMPT),
                ChatMessage::text("user", advice_message(question, context)),
            ],
            response_format: None,
        };

        Ok(self
            .complete(&body)
            .await?
            .unwrap_or_else(|| EMPTY_ADVICE_FALLBACK.to_string()))
    }

    #[tracing::instrument(skip(self, message, history), fields(history_len = history.len()))]
    async fn chat(
        &self,
        model: &str,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, AiError> {
        let mut messages = vec![ChatMessage::text("system", TIMBER_SYSTEM_PROMPT)];
        messages.extend(history_messages(history));
        messages.push(ChatMessage::text("user", message));

        let body = ChatCompletionRequest {
            model,
            messages,
            response_format: None,
        };

        self.complete(&body)
            .await?
            .ok_or_else(|| AiError::InvalidResponse("empty chat completion".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use timber_core::models::DocumentType;

    fn completion(content: &str) -> String {
        json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_analyze_document_parses_fenced_json() {
        let mut server = mockito::Server::new_async().await;
        let content = "```json\n{\"summary\": \"Visa statement\", \"statement\": {\"total\": \"$1,050.00\", \"vendor\": \"Visa\"}, \"extractedData\": {\"debts\": [{\"creditor\": \"Visa\", \"balance\": \"1,050.00\", \"apr\": 22.9}]}}\n```";
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "response_format": { "type": "json_object" }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(content))
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", server.url()).unwrap();
        let analysis = client
            .analyze_document(DocumentAnalysisRequest {
                model: "gpt-4o-mini",
                document_type: DocumentType::CreditCard,
                content: DocumentContent::Text("01/05 Coffee 4.50"),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(analysis.summary, "Visa statement");
        assert_eq!(analysis.statement.total.as_deref(), Some("$1,050.00"));
        let debt = &analysis.extracted_data.debts[0];
        assert_eq!(debt.creditor, "Visa");
        assert_eq!(debt.balance.to_string(), "1050.00");
        assert_eq!(debt.apr, Some(rust_decimal::Decimal::new(229, 1)));
    }

    #[tokio::test]
    async fn test_analyze_document_sends_images_as_data_urls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex("data:image/png;base64,iVBORw0K".to_string()))
            .with_status(200)
            .with_body(completion("{}"))
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", server.url()).unwrap();
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let analysis = client
            .analyze_document(DocumentAnalysisRequest {
                model: "gpt-4o",
                document_type: DocumentType::Receipt,
                content: DocumentContent::Image {
                    data: &png,
                    mime_type: "image/png",
                },
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(analysis.summary, "Document analyzed successfully");
        assert!(analysis.extracted_data.is_empty());
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "Rate limit reached"}}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", server.url()).unwrap();
        let err = client
            .generate_advice("gpt-4o", "Hi", &FinancialContext::default())
            .await
            .unwrap_err();

        match err {
            AiError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit reached");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_advice_falls_back_on_empty_completion() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex("User's question: What is APR\\?".to_string()))
            .with_status(200)
            .with_body(completion(""))
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", server.url()).unwrap();
        let answer = client
            .generate_advice("gpt-4o", "What is APR?", &FinancialContext::default())
            .await
            .unwrap();
        assert_eq!(answer, EMPTY_ADVICE_FALLBACK);
    }

    #[tokio::test]
    async fn test_chat_sends_recent_history_only() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion("Let's stack those logs!"))
            .create_async()
            .await;

        let history: Vec<ChatTurn> = (0..15)
            .map(|i| ChatTurn {
                role: if i % 2 == 0 { ChatRole::User } else { ChatRole::Assistant },
                content: format!("turn {}", i),
            })
            .collect();
        let sent: Vec<ChatMessage> = history_messages(&history).collect();
        assert_eq!(sent.len(), CHAT_HISTORY_TURNS);
        assert!(matches!(&sent[0].content, MessageContent::Text(t) if t == "turn 5"));

        let client = OpenAiClient::new("test-key", format!("{}/", server.url())).unwrap();
        let reply = client.chat("gpt-4o-mini", "Help me save", &history).await.unwrap();
        assert_eq!(reply, "Let's stack those logs!");
    }

    #[tokio::test]
    async fn test_chat_fails_on_empty_completion() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion("  "))
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", server.url()).unwrap();
        let err = client.chat("gpt-4o-mini", "Hello", &[]).await.unwrap_err();
        assert!(matches!(err, AiError::InvalidResponse(_)));
    }
}
