use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use timber_core::models::{Asset, CreateAssetRequest, UpdateAssetRequest};
use timber_core::AppError;
use uuid::Uuid;
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/assets",
    tag = "finances",
    responses(
        (status = 200, description = "The user's assets", body = Vec<Asset>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let assets = state.db.assets.list_for_user(&user.user_id).await?;
    Ok(Json(assets))
}

#[utoipa::path(
    post,
    path = "/api/assets",
    tag = "finances",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid asset", body = ErrorResponse)
    )
)]
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<CreateAssetRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let asset = state.db.assets.create(&user.user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

#[utoipa::path(
    put,
    path = "/api/assets/{id}",
    tag = "finances",
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateAssetRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let asset = state
        .db
        .assets
        .update(&user.user_id, id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))?;
    Ok(Json(asset))
}

#[utoipa::path(
    delete,
    path = "/api/assets/{id}",
    tag = "finances",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.assets.delete(&user.user_id, id).await? {
        return Err(AppError::NotFound("Asset not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
