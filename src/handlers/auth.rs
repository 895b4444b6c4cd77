//! Authentication HTTP handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use super::AuthenticatedAccount;
use crate::auth::{AuthError, AuthService};
use crate::error::ApiError;
use crate::models::{
    AccountResponse, AuthTokensResponse, LoginRequest, RefreshTokenRequest,
};
use crate::services::AccountService;

/// POST /auth/login - Verify credentials and issue tokens
pub async fn login(
    State(auth_service): State<Arc<AuthService>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthTokensResponse>, ApiError> {
    let tokens = auth_service
        .login(&req.email, &req.password)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(tokens))
}

/// POST /auth/refresh - Refresh access token using refresh token
pub async fn refresh_token(
    State(auth_service): State<Arc<AuthService>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<AuthTokensResponse>, ApiError> {
    let tokens = auth_service
        .refresh_tokens(&req.refresh_token)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(tokens))
}

/// POST /auth/logout - Revoke the current session
pub async fn logout(
    State(auth_service): State<Arc<AuthService>>,
    account: AuthenticatedAccount,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth_service
        .revoke_session(&account.jti)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /auth/me - Current account details
pub async fn me(
    State(account_service): State<Arc<AccountService>>,
    account: AuthenticatedAccount,
) -> Result<Json<AccountResponse>, ApiError> {
    let stored = account_service.get_account(account.account_id).await?;
    Ok(Json(stored.into()))
}

fn map_auth_error(e: AuthError) -> ApiError {
    match e {
        AuthError::InvalidCredentials
        | AuthError::SessionNotFound
        | AuthError::InvalidRefreshToken => ApiError::Unauthorized(e.to_string()),
        AuthError::TokenError(_) => ApiError::Unauthorized(e.to_string()),
        AuthError::DatabaseError(msg) => ApiError::DatabaseError(msg),
    }
}
