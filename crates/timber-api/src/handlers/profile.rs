use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use timber_core::models::{FinancialProfile, UpdateProfileRequest};
use timber_core::AppError;
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "finances",
    responses(
        (status = 200, description = "The user's financial profile", body = FinancialProfile),
        (status = 404, description = "No profile yet", body = ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let profile = state
        .db
        .profiles
        .get(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Financial profile not found".to_string()))?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "finances",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = FinancialProfile),
        (status = 400, description = "Invalid profile", body = ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let profile = state.db.profiles.upsert(&user.user_id, &request).await?;
    Ok(Json(profile))
}
