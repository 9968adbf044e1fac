use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// A sanitised Timber tip interaction, ready to persist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTipEvent {
    pub event: String,
    pub path: String,
    pub tip_hash: Option<i64>,
    pub uid: String,
    pub ip: String,
    pub client_ts: Option<DateTime<Utc>>,
}

/// Stored tip interaction
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TipEvent {
    pub id: Uuid,
    pub event: String,
    pub path: String,
    pub tip_hash: Option<i64>,
    pub uid: String,
    pub ip: String,
    pub client_ts: Option<DateTime<Utc>>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AnalyticsSummaryQuery {
    /// Inclusive lower bound on the receive time
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the receive time
    pub until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EventCount {
    pub event: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TipCount {
    pub tip_hash: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip_id: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_events: i64,
    pub by_event: Vec<EventCount>,
    pub by_tip: Vec<TipCount>,
}
