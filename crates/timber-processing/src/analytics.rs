//! Tip analytics event normalisation

use chrono::DateTime;
use serde_json::Value;
use timber_core::constants::ANALYTICS_FIELD_MAX_LEN;
use timber_core::models::{NewTipEvent, TipCount};

use crate::tips::tip_id_for_hash;

/// Replace line breaks with spaces and cap the length, so a value cannot
/// forge extra log lines.
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .take(ANALYTICS_FIELD_MAX_LEN)
        .collect()
}

fn string_field(body: &Value, key: &str, default: &str) -> String {
    match body.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => sanitize(value),
        _ => default.to_string(),
    }
}

/// Build an event from an arbitrary client payload. Missing or mistyped
/// fields fall back to their defaults rather than rejecting the event.
pub fn tip_event_from_json(body: &Value, ip: &str) -> NewTipEvent {
    let tip_hash = body.get("tipHash").and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
    });

    let client_ts = body
        .get("ts")
        .and_then(Value::as_i64)
        .and_then(DateTime::from_timestamp_millis);

    NewTipEvent {
        event: string_field(body, "event", "unknown"),
        path: string_field(body, "path", ""),
        tip_hash,
        uid: string_field(body, "uid", "anon"),
        ip: sanitize(ip),
        client_ts,
    }
}

/// Attach built-in tip ids to per-hash counts
pub fn resolve_tip_ids(counts: Vec<TipCount>) -> Vec<TipCount> {
    counts
        .into_iter()
        .map(|count| TipCount {
            tip_id: tip_id_for_hash(count.tip_hash).map(str::to_string),
            ..count
        })
        .collect()
}
