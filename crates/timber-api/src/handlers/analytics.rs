//! Timber tip analytics: a public beacon and an admin summary

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::ip_extraction::client_ip_from_request;
use axum::{
    body::to_bytes,
    extract::{Query, Request, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use timber_core::models::{AnalyticsSummary, AnalyticsSummaryQuery};
use timber_processing::analytics::{resolve_tip_ids, tip_event_from_json};

/// Beacons are tiny; anything larger is read as an empty payload.
const MAX_BEACON_BYTES: usize = 16 * 1024;

fn parse_beacon(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}

#[utoipa::path(
    post,
    path = "/api/timber/analytics",
    tag = "analytics",
    request_body(content = Object, description = "{event?, path?, ts?, uid?, tipHash?}", content_type = "application/json"),
    responses(
        (status = 204, description = "Event accepted")
    )
)]
pub async fn record_tip_event(State(state): State<Arc<AppState>>, request: Request) -> StatusCode {
    let ip = client_ip_from_request(&request);
    let body = to_bytes(request.into_body(), MAX_BEACON_BYTES)
        .await
        .map(|bytes| parse_beacon(&bytes))
        .unwrap_or(Value::Null);

    let event = tip_event_from_json(&body, &ip);
    tracing::info!(
        target: "timber_analytics",
        event = %event.event,
        path = %event.path,
        tip_hash = ?event.tip_hash,
        uid = %event.uid,
        ip = %event.ip,
        client_ts = ?event.client_ts,
        "timber_analytics"
    );

    if let Err(e) = state.db.analytics.record_event(&event).await {
        tracing::warn!(error = %e, event = %event.event, "Failed to persist analytics event");
    }

    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/api/timber/analytics/summary",
    tag = "analytics",
    params(AnalyticsSummaryQuery),
    responses(
        (status = 200, description = "Event totals by name and by tip", body = AnalyticsSummary),
        (status = 401, description = "Missing or wrong admin key", body = ErrorResponse)
    )
)]
pub async fn get_analytics_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsSummaryQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut summary = state.db.analytics.summary(query.since, query.until).await?;
    summary.by_tip = resolve_tip_ids(summary.by_tip);
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_beacon_tolerates_garbage() {
        assert_eq!(parse_beacon(b""), Value::Null);
        assert_eq!(parse_beacon(b"not json"), Value::Null);
        assert_eq!(parse_beacon(br#"{"event":"tip_view"}"#)["event"], "tip_view");
    }
}
