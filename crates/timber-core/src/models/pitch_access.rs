use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Shareable access token for the investor pitch page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PitchAccessToken {
    pub id: Uuid,
    pub token: String,
    pub recipient_email: Option<String>,
    pub recipient_name: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub usage_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl PitchAccessToken {
    /// Why this token cannot be used right now, if anything.
    pub fn rejection_reason(&self, now: DateTime<Utc>) -> Option<&'static str> {
        if !self.is_active {
            return Some("Token has been deactivated");
        }
        if self.expires_at.is_some_and(|expires| expires <= now) {
            return Some("Token has expired");
        }
        if self.max_uses.is_some_and(|max| self.usage_count >= max) {
            return Some("Token usage limit reached");
        }
        None
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePitchAccessRequest {
    #[validate(email)]
    pub recipient_email: Option<String>,
    #[validate(length(max = 200))]
    pub recipient_name: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePitchAccessResponse {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PitchAccessValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token() -> PitchAccessToken {
        PitchAccessToken {
            id: Uuid::new_v4(),
            token: "abc".to_string(),
            recipient_email: None,
            recipient_name: None,
            expires_at: None,
            max_uses: None,
            usage_count: 0,
            is_active: true,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    #[test]
    fn test_rejection_reason() {
        let now = Utc::now();
        assert_eq!(token().rejection_reason(now), None);

        let mut t = token();
        t.is_active = false;
        assert_eq!(t.rejection_reason(now), Some("Token has been deactivated"));

        let mut t = token();
        t.expires_at = Some(now - Duration::minutes(1));
        assert_eq!(t.rejection_reason(now), Some("Token has expired"));

        let mut t = token();
        t.max_uses = Some(3);
        t.usage_count = 3;
        assert_eq!(t.rejection_reason(now), Some("Token usage limit reached"));
    }
}
