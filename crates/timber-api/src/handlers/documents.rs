use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::document_processing::process_upload;
use crate::state::AppState;
use crate::utils::upload::extract_document_upload;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use timber_core::constants::{DEFAULT_DOCUMENT_LIST_LIMIT, MAX_DOCUMENT_LIST_LIMIT};
use timber_core::models::Document;
use timber_core::AppError;
use utoipa::ToSchema;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "documents",
    request_body(content = String, description = "Multipart form with `file` and optional `documentType`", content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored and analysed", body = Document),
        (status = 400, description = "Invalid file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = extract_document_upload(multipart).await?;

    state.document_validator.validate_all(
        &upload.filename,
        &upload.content_type,
        upload.data.len(),
    )?;

    tracing::info!(
        user_id = %user.user_id,
        filename = %upload.filename,
        size = upload.data.len(),
        document_type = %upload.document_type,
        "Document upload received"
    );

    let document = process_upload(&state, &user, upload).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[derive(Deserialize, ToSchema, utoipa::IntoParams)]
pub struct DocumentListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_DOCUMENT_LIST_LIMIT
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "documents",
    params(
        DocumentListQuery
    ),
    responses(
        (status = 200, description = "The user's documents, newest first", body = Vec<Document>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Query(query): Query<DocumentListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = query.limit.clamp(1, MAX_DOCUMENT_LIST_LIMIT);
    let documents = state
        .db
        .documents
        .list_for_user(&user.user_id, limit)
        .await?;
    Ok(Json(documents))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document found", body = Document),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .db
        .documents
        .get_for_user(&user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(document))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.documents.delete_for_user(&user.user_id, id).await? {
        return Err(AppError::NotFound("Document not found".to_string()).into());
    }
    tracing::info!(user_id = %user.user_id, document_id = %id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
