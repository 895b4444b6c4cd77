//! Authentication route definitions

use axum::{routing::get, routing::post, Router};

use crate::app_state::AppState;
use crate::handlers::*;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}
