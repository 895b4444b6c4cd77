//! Loan route definitions

use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::handlers::*;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/loans", get(list_loans).post(create_loan))
        .route(
            "/api/loans/:id",
            get(get_loan).put(update_loan).delete(delete_loan),
        )
        .route("/api/loans/:id/payments", get(list_loan_payments))
}
