//! Account HTTP handlers (admin only)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::AdminAccount;
use crate::error::ApiError;
use crate::models::{
    AccountResponse, ApiResponse, CreateAccountRequest, PaginatedResponse, PaginationParams,
};
use crate::services::AccountService;

/// GET /api/accounts - List accounts
pub async fn list_accounts(
    State(service): State<Arc<AccountService>>,
    _admin: AdminAccount,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<AccountResponse>>>, ApiError> {
    let (page, limit) = params.resolve();
    let result = service.list_accounts(page, limit).await?;

    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/accounts - Create an account
pub async fn create_account(
    State(service): State<Arc<AccountService>>,
    _admin: AdminAccount,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), ApiError> {
    request.validate()?;

    let account = service.create_account(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(account))))
}

/// GET /api/accounts/:id - Retrieve an account
pub async fn get_account(
    State(service): State<Arc<AccountService>>,
    _admin: AdminAccount,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account = service.get_account(id).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// DELETE /api/accounts/:id - Delete an account and everything it owns
pub async fn delete_account(
    State(service): State<Arc<AccountService>>,
    _admin: AdminAccount,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service.delete_account(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
