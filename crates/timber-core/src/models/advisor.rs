use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::tip::Tip;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct AdvisorQuestion {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdvisorAnswer {
    pub answer: String,
    pub model: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct TimberChatRequest {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimberChatReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<Tip>,
}
