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
use timber_core::models::{CreateDebtRequest, Debt, UpdateDebtRequest};
use timber_core::AppError;
use uuid::Uuid;
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/debts",
    tag = "finances",
    responses(
        (status = 200, description = "The user's debts", body = Vec<Debt>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_debts(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let debts = state.db.debts.list_for_user(&user.user_id).await?;
    Ok(Json(debts))
}

#[utoipa::path(
    post,
    path = "/api/debts",
    tag = "finances",
    request_body = CreateDebtRequest,
    responses(
        (status = 201, description = "Debt created", body = Debt),
        (status = 400, description = "Invalid debt", body = ErrorResponse)
    )
)]
pub async fn create_debt(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<CreateDebtRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let debt = state.db.debts.create(&user.user_id, &request).await?;
    tracing::info!(user_id = %user.user_id, debt_id = %debt.id, "Debt created");
    Ok((StatusCode::CREATED, Json(debt)))
}

#[utoipa::path(
    put,
    path = "/api/debts/{id}",
    tag = "finances",
    params(("id" = Uuid, Path, description = "Debt ID")),
    request_body = UpdateDebtRequest,
    responses(
        (status = 200, description = "Debt updated", body = Debt),
        (status = 400, description = "Invalid debt", body = ErrorResponse),
        (status = 404, description = "Debt not found", body = ErrorResponse)
    )
)]
pub async fn update_debt(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateDebtRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let debt = state
        .db
        .debts
        .update(&user.user_id, id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound("Debt not found".to_string()))?;
    Ok(Json(debt))
}

#[utoipa::path(
    delete,
    path = "/api/debts/{id}",
    tag = "finances",
    params(("id" = Uuid, Path, description = "Debt ID")),
    responses(
        (status = 204, description = "Debt deleted"),
        (status = 404, description = "Debt not found", body = ErrorResponse)
    )
)]
pub async fn delete_debt(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.debts.delete(&user.user_id, id).await? {
        return Err(AppError::NotFound("Debt not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
