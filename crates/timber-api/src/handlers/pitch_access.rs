//! Shareable pitch page access tokens

use crate::constants::PITCH_TOKEN_BYTES;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::billing::checkout_origin;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use timber_core::models::{
    CreatePitchAccessRequest, CreatePitchAccessResponse, PitchAccessToken, PitchAccessValidation,
};
use timber_core::AppError;
use uuid::Uuid;
use validator::Validate;

/// Generate a random pitch access token
pub fn generate_pitch_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..PITCH_TOKEN_BYTES).map(|_| rng.random()).collect();
    hex::encode(random_bytes)
}

fn pitch_url(base: &str, token: &str) -> String {
    format!("{}/pitch?token={}", base.trim_end_matches('/'), token)
}

#[utoipa::path(
    post,
    path = "/api/pitch-access/create",
    tag = "pitch",
    request_body = CreatePitchAccessRequest,
    responses(
        (status = 201, description = "Token created", body = CreatePitchAccessResponse),
        (status = 401, description = "Missing or wrong admin key", body = ErrorResponse)
    )
)]
pub async fn create_pitch_access(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<CreatePitchAccessRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let base = state
        .config
        .frontend_url()
        .map(String::from)
        .or_else(|| checkout_origin(&headers, None))
        .ok_or_else(|| AppError::BadRequest("Cannot determine the pitch page URL".to_string()))?;

    let token = generate_pitch_token();
    let created = state.db.pitch_access.create(&token, &request).await?;
    tracing::info!(token_id = %created.id, "Pitch access token created");

    Ok((
        StatusCode::CREATED,
        Json(CreatePitchAccessResponse {
            url: pitch_url(&base, &token),
            token,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/pitch-access/list",
    tag = "pitch",
    responses(
        (status = 200, description = "All pitch tokens, newest first", body = Vec<PitchAccessToken>),
        (status = 401, description = "Missing or wrong admin key", body = ErrorResponse)
    )
)]
pub async fn list_pitch_access(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tokens = state.db.pitch_access.list().await?;
    Ok(Json(tokens))
}

#[utoipa::path(
    delete,
    path = "/api/pitch-access/deactivate/{id}",
    tag = "pitch",
    params(("id" = Uuid, Path, description = "Token ID")),
    responses(
        (status = 204, description = "Token deactivated"),
        (status = 404, description = "Token not found", body = ErrorResponse)
    )
)]
pub async fn deactivate_pitch_access(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.pitch_access.deactivate(id).await? {
        return Err(AppError::NotFound("Pitch access token not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/pitch-access/validate/{token}",
    tag = "pitch",
    params(("token" = String, Path, description = "Pitch access token")),
    responses(
        (status = 200, description = "Whether the token grants access", body = PitchAccessValidation)
    )
)]
pub async fn validate_pitch_access(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Some(existing) = state.db.pitch_access.get_by_token(&token).await? else {
        return Ok(Json(rejected("Token not found")));
    };
    if let Some(reason) = existing.rejection_reason(Utc::now()) {
        return Ok(Json(rejected(reason)));
    }

    // Consumption re-checks the limits, so a concurrent request can still lose.
    match state.db.pitch_access.consume(&token).await? {
        Some(_) => Ok(Json(PitchAccessValidation {
            valid: true,
            reason: None,
        })),
        None => Ok(Json(rejected("Token usage limit reached"))),
    }
}

fn rejected(reason: &str) -> PitchAccessValidation {
    PitchAccessValidation {
        valid: false,
        reason: Some(reason.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_pitch_token() {
        let a = generate_pitch_token();
        let b = generate_pitch_token();
        assert_eq!(a.len(), PITCH_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_pitch_url() {
        assert_eq!(
            pitch_url("https://timber.app/", "abc"),
            "https://timber.app/pitch?token=abc"
        );
    }
}
