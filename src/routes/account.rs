//! Account routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::account;
use crate::state::AppState;

/// Create account registration and profile routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/users/register", post(account::register))
        .route(
            "/api/v1/users/me",
            get(account::current_account).patch(account::update_profile),
        )
}
