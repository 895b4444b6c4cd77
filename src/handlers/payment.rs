//! Payment HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::AuthenticatedAccount;
use crate::error::ApiError;
use crate::models::{ApiResponse, PaginatedResponse, PaginationParams, Payment, PaymentWriteRequest};
use crate::services::{LoanService, PaymentService};

/// GET /api/payments - List payments (all for admins, own otherwise)
pub async fn list_payments(
    State(service): State<Arc<PaymentService>>,
    account: AuthenticatedAccount,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<Payment>>>, ApiError> {
    let (page, limit) = params.resolve();
    let result = service
        .list_payments(account.account_id, account.is_admin(), page, limit)
        .await?;

    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/payments - Record a payment against a loan
pub async fn create_payment(
    State(service): State<Arc<PaymentService>>,
    account: AuthenticatedAccount,
    Json(request): Json<PaymentWriteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), ApiError> {
    request.validate()?;

    let payment = service.create_payment(account.account_id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(payment))))
}

/// GET /api/payments/:id - Retrieve a payment
pub async fn get_payment(
    State(service): State<Arc<PaymentService>>,
    State(loan_service): State<Arc<LoanService>>,
    account: AuthenticatedAccount,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Payment>>, ApiError> {
    let payment = service.get_payment(id).await?;

    let loan = loan_service.get_loan(payment.loan_id).await?;
    if loan.account_id != account.account_id && !account.is_admin() {
        return Err(ApiError::Forbidden(
            "You don't have permission to view this payment".to_string(),
        ));
    }

    Ok(Json(ApiResponse::ok(payment)))
}

/// PUT /api/payments/:id - Update a payment (loan owner only)
pub async fn update_payment(
    State(service): State<Arc<PaymentService>>,
    account: AuthenticatedAccount,
    Path(id): Path<Uuid>,
    Json(request): Json<PaymentWriteRequest>,
) -> Result<Json<ApiResponse<Payment>>, ApiError> {
    request.validate()?;

    let payment = service
        .update_payment(account.account_id, id, request)
        .await?;
    Ok(Json(ApiResponse::ok(payment)))
}

/// DELETE /api/payments/:id - Delete a payment (loan owner only)
pub async fn delete_payment(
    State(service): State<Arc<PaymentService>>,
    account: AuthenticatedAccount,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service.delete_payment(account.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
