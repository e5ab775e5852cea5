//! Session routes

use axum::{routing::post, Router};

use crate::handlers::auth;
use crate::state::AppState;

/// Create session lifecycle routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/users/login", post(auth::login))
        .route("/api/v1/users/refresh-token", post(auth::refresh_token))
        .route("/api/v1/users/logout", post(auth::logout))
        .route("/api/v1/users/change-password", post(auth::change_password))
}
