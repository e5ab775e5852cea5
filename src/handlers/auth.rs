//! Session HTTP handlers
//!
//! Login, refresh, logout and password change. Tokens travel both in the
//! JSON body and as host-only, HttpOnly + Secure cookies; which channel a
//! client uses is up to it.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::AuthenticatedAccount;
use crate::error::ApiError;
use crate::models::{ChangePasswordRequest, LoginRequest, LoginResponse, RefreshRequest, TokenPair};
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// POST /api/v1/users/login - Verify credentials and issue a token pair
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let response = state
        .session_service
        .login(
            request.username.as_deref(),
            request.email.as_deref(),
            &request.password,
        )
        .await?;

    let jar = jar
        .add(auth_cookie(ACCESS_TOKEN_COOKIE, response.access_token.clone()))
        .add(auth_cookie(
            REFRESH_TOKEN_COOKIE,
            response.refresh_token.clone(),
        ));

    Ok((jar, Json(response)))
}

/// POST /api/v1/users/refresh-token - Rotate the refresh token
///
/// The presented token is read from the refresh cookie first, then from the
/// JSON body.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<TokenPair>), ApiError> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| body.and_then(|Json(request)| request.refresh_token));

    let pair = state.session_service.refresh(presented.as_deref()).await?;

    let jar = jar
        .add(auth_cookie(ACCESS_TOKEN_COOKIE, pair.access_token.clone()))
        .add(auth_cookie(REFRESH_TOKEN_COOKIE, pair.refresh_token.clone()));

    Ok((jar, Json(pair)))
}

/// POST /api/v1/users/logout - Invalidate the stored refresh token
pub async fn logout(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    state.session_service.logout(account.account_id).await?;

    let jar = jar
        .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(removal_cookie(REFRESH_TOKEN_COOKIE));

    Ok((jar, StatusCode::NO_CONTENT))
}

/// POST /api/v1/users/change-password - Re-hash and persist a new password
pub async fn change_password(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .session_service
        .change_password(
            account.account_id,
            &request.old_password,
            &request.new_password,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// Host-only: no Domain attribute, so the cookie is bound to the exact host.
fn auth_cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::from(name);
    cookie.set_path("/");
    cookie
}
