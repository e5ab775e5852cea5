//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::account::AccountService;
use crate::auth::SessionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub account_service: Arc<AccountService>,
    pub db: PgPool,
}

impl AppState {
    pub fn new(
        session_service: Arc<SessionService>,
        account_service: Arc<AccountService>,
        db: PgPool,
    ) -> Self {
        Self {
            session_service,
            account_service,
            db,
        }
    }
}

impl FromRef<AppState> for Arc<SessionService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.session_service.clone()
    }
}

impl FromRef<AppState> for Arc<AccountService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.account_service.clone()
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db.clone()
    }
}
