//! Manual review of processed documents (admin key)

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use timber_core::constants::MAX_DOCUMENT_LIST_LIMIT;
use timber_core::models::{Document, DocumentEditRequest};
use timber_core::AppError;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListQuery {
    /// Only documents flagged for review (default true)
    #[serde(default = "default_needs_review")]
    pub needs_review: bool,
}

fn default_needs_review() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewActionResponse {
    pub ok: bool,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/admin/docs",
    tag = "admin",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Documents for review", body = Vec<Document>),
        (status = 401, description = "Missing or wrong admin key", body = ErrorResponse)
    )
)]
pub async fn list_review_documents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let documents = state
        .db
        .documents
        .list_for_review(query.needs_review, MAX_DOCUMENT_LIST_LIMIT)
        .await?;
    Ok(Json(documents))
}

#[utoipa::path(
    post,
    path = "/api/admin/docs/{id}/edit",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = DocumentEditRequest,
    responses(
        (status = 200, description = "Corrections saved", body = ReviewActionResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
pub async fn edit_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(edit): ValidatedJson<DocumentEditRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .db
        .documents
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let analysis_data = apply_edit(document.analysis_data, &edit);
    state
        .db
        .documents
        .apply_review_edit(id, &analysis_data, edit.document_type)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    tracing::info!(document_id = %id, "Document review edit saved");
    Ok(Json(ReviewActionResponse {
        ok: true,
        message: "Document updated".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/docs/{id}/approve",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document approved", body = ReviewActionResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
pub async fn approve_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .db
        .documents
        .approve(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    tracing::info!(document_id = %id, "Document approved");
    Ok(Json(ReviewActionResponse {
        ok: true,
        message: "Document approved".to_string(),
    }))
}

/// Merge reviewer corrections into stored analysis data
fn apply_edit(existing: Option<Value>, edit: &DocumentEditRequest) -> Value {
    let mut data = match existing {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let mut summary = take_object(&mut data, "summary");
    for (key, value) in [
        ("total", &edit.total),
        ("date", &edit.date),
        ("vendor", &edit.vendor),
    ] {
        if let Some(value) = value {
            summary.insert(key.to_string(), json!(value));
        }
    }
    data.insert("summary".to_string(), Value::Object(summary));

    if let Some(notes) = &edit.notes {
        let mut validations = take_object(&mut data, "validations");
        validations.insert("notes".to_string(), json!(notes));
        data.insert("validations".to_string(), Value::Object(validations));
    }

    if let Some(document_type) = edit.document_type {
        data.insert("type".to_string(), json!(document_type.as_str()));
    }

    Value::Object(data)
}

/// Remove the object under `key`; anything else is dropped
fn take_object(map: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match map.remove(key) {
        Some(Value::Object(inner)) => inner,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timber_core::models::DocumentType;

    #[test]
    fn test_edit_merges_into_summary() {
        let existing = json!({
            "type": "receipt",
            "summary": {"total": "$10.00", "date": "01/02/2025", "vendor": "Cafe"},
            "validations": {"totalMatches": false, "notes": ["Sum 9 != stated 10"]},
            "aiSummary": "Coffee"
        });
        let edit = DocumentEditRequest {
            total: Some("$9.00".to_string()),
            notes: Some(vec!["Corrected by reviewer".to_string()]),
            ..Default::default()
        };

        let merged = apply_edit(Some(existing), &edit);
        assert_eq!(merged["summary"]["total"], "$9.00");
        assert_eq!(merged["summary"]["vendor"], "Cafe");
        assert_eq!(merged["validations"]["notes"], json!(["Corrected by reviewer"]));
        assert_eq!(merged["validations"]["totalMatches"], false);
        assert_eq!(merged["aiSummary"], "Coffee");
        assert_eq!(merged["type"], "receipt");
    }

    #[test]
    fn test_edit_without_existing_data() {
        let edit = DocumentEditRequest {
            vendor: Some("Acme".to_string()),
            document_type: Some(DocumentType::Invoice),
            ..Default::default()
        };
        let merged = apply_edit(None, &edit);
        assert_eq!(merged["summary"], json!({"vendor": "Acme"}));
        assert_eq!(merged["type"], "invoice");
        assert!(merged.get("validations").is_none());
    }

    #[test]
    fn test_edit_replaces_malformed_summary() {
        let merged = apply_edit(
            Some(json!({"summary": "oops"})),
            &DocumentEditRequest {
                date: Some("02/01/2025".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(merged["summary"], json!({"date": "02/01/2025"}));
    }
}
