//! Account models and request/response DTOs

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Account row as persisted by the credential store
///
/// `password_hash` and `refresh_token` never leave the store layer and the
/// session service; every outward representation goes through
/// [`AccountResponse`].
#[derive(Debug, sqlx::FromRow, Clone)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create an account row
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub password_hash: String,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Account representation sanitized for API responses
#[derive(Debug, Serialize, Clone)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            fullname: account.fullname,
            avatar_url: account.avatar_url,
            cover_image_url: account.cover_image_url,
            created_at: account.created_at,
        }
    }
}

/// Registration request
///
/// Media files live in remote storage; clients upload there first and
/// register with the resulting URLs.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "fullname is required"))]
    pub fullname: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Login request: at least one of username/email must be present
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: AccountResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh request body; the token may also arrive as a cookie
#[derive(Debug, Deserialize, Default)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Freshly issued access/refresh token pair
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
}
