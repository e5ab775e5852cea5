//! Authentication middleware
//!
//! Extractor that verifies the access token and resolves the calling
//! account. Tokens arrive either as an `Authorization: Bearer` header or as
//! the `access_token` cookie set at login.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{SessionService, TokenError};
use crate::error::ApiError;

/// Authenticated account extracted from a verified access token
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub account_id: Uuid,
    pub username: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    Arc<SessionService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
        {
            Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
            Err(_) => CookieJar::from_headers(&parts.headers)
                .get("access_token")
                .map(|cookie| cookie.value().to_string())
                .ok_or_else(|| {
                    ApiError::MissingToken(
                        "Authorization bearer token or access_token cookie required".to_string(),
                    )
                })?,
        };

        let session_service = Arc::<SessionService>::from_ref(state);

        let claims = session_service.verify_access(&token).map_err(|e| match e {
            TokenError::Expired => ApiError::TokenExpired("Access token has expired".to_string()),
            _ => ApiError::MalformedToken("Invalid access token".to_string()),
        })?;

        let account_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::MalformedToken("Invalid account id in token".to_string()))?;

        Ok(AuthenticatedAccount {
            account_id,
            username: claims.username,
            email: claims.email,
        })
    }
}
