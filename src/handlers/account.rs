//! Account HTTP handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use super::AuthenticatedAccount;
use crate::error::ApiError;
use crate::models::{AccountResponse, RegisterRequest, UpdateProfileRequest};
use crate::state::AppState;

/// POST /api/v1/users/register - Create a new account
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    request.validate()?;

    let account = state.account_service.register(request).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /api/v1/users/me - Get the authenticated account's profile
pub async fn current_account(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
) -> Result<Json<AccountResponse>, ApiError> {
    let profile = state.account_service.current(account.account_id).await?;

    Ok(Json(profile))
}

/// PATCH /api/v1/users/me - Update profile fields
pub async fn update_profile(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let profile = state
        .account_service
        .update_profile(
            account.account_id,
            request.fullname.as_deref(),
            request.email.as_deref(),
        )
        .await?;

    Ok(Json(profile))
}
