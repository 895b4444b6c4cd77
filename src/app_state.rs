//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::AuthService;
use crate::services::{AccountService, LoanService, PaymentService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub account_service: Arc<AccountService>,
    pub loan_service: Arc<LoanService>,
    pub payment_service: Arc<PaymentService>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        account_service: Arc<AccountService>,
        loan_service: Arc<LoanService>,
        payment_service: Arc<PaymentService>,
    ) -> Self {
        Self {
            auth_service,
            account_service,
            loan_service,
            payment_service,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<AccountService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.account_service.clone()
    }
}

impl FromRef<AppState> for Arc<LoanService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.loan_service.clone()
    }
}

impl FromRef<AppState> for Arc<PaymentService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.payment_service.clone()
    }
}
