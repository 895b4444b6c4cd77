//! Loan HTTP handlers

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::AuthenticatedAccount;
use crate::error::ApiError;
use crate::models::{
    ApiResponse, LoanView, LoanWriteRequest, PaginatedResponse, PaginationParams, Payment,
};
use crate::services::LoanService;

/// GET /api/loans - List loans (all for admins, own otherwise)
pub async fn list_loans(
    State(service): State<Arc<LoanService>>,
    account: AuthenticatedAccount,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<LoanView>>>, ApiError> {
    let (page, limit) = params.resolve();
    let result = service
        .list_loans(account.account_id, account.is_admin(), page, limit)
        .await?;

    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/loans - Create a loan owned by the authenticated account
pub async fn create_loan(
    State(service): State<Arc<LoanService>>,
    account: AuthenticatedAccount,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<LoanWriteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LoanView>>), ApiError> {
    request.validate()?;

    let ip_address = client_ip(&headers).unwrap_or_else(|| addr.ip().to_string());
    let view = service
        .create_loan(account.account_id, Some(ip_address), request)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(view))))
}

/// GET /api/loans/:id - Retrieve a loan with its derived figures
pub async fn get_loan(
    State(service): State<Arc<LoanService>>,
    account: AuthenticatedAccount,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LoanView>>, ApiError> {
    let loan = service.get_loan(id).await?;
    if loan.account_id != account.account_id && !account.is_admin() {
        return Err(ApiError::Forbidden(
            "You don't have permission to view this loan".to_string(),
        ));
    }

    let view = service.view(&loan).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// PUT /api/loans/:id - Update a loan (owner only)
pub async fn update_loan(
    State(service): State<Arc<LoanService>>,
    account: AuthenticatedAccount,
    Path(id): Path<Uuid>,
    Json(request): Json<LoanWriteRequest>,
) -> Result<Json<ApiResponse<LoanView>>, ApiError> {
    request.validate()?;

    let loan = service.get_loan(id).await?;
    if loan.account_id != account.account_id {
        return Err(ApiError::Forbidden(
            "You don't have permission to edit this loan".to_string(),
        ));
    }

    let view = service.update_loan(&loan, request).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// DELETE /api/loans/:id - Delete a loan and its payments (owner only)
pub async fn delete_loan(
    State(service): State<Arc<LoanService>>,
    account: AuthenticatedAccount,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let loan = service.get_loan(id).await?;
    if loan.account_id != account.account_id {
        return Err(ApiError::Forbidden(
            "You don't have permission to delete this loan".to_string(),
        ));
    }

    service.delete_loan(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/loans/:id/payments - List a loan's payments
pub async fn list_loan_payments(
    State(service): State<Arc<LoanService>>,
    account: AuthenticatedAccount,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, ApiError> {
    let loan = service.get_loan(id).await?;
    if loan.account_id != account.account_id && !account.is_admin() {
        return Err(ApiError::Forbidden(
            "You don't have permission to view this loan".to_string(),
        ));
    }

    let payments = service.payments_for(id).await?;
    Ok(Json(ApiResponse::ok(payments)))
}

/// Client IP from proxy headers, if present
fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            if let Some(ip) = s.split(',').next() {
                return Some(ip.trim().to_string());
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}
