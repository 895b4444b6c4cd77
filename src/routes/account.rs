//! Account route definitions (admin only)

use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::handlers::*;

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/accounts", get(list_accounts).post(create_account))
        .route(
            "/api/accounts/:id",
            get(get_account).delete(delete_account),
        )
}
