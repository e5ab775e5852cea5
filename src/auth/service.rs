//! Session lifecycle service
//!
//! Orchestrates login, refresh, logout and password changes over the
//! credential store, the password hasher and the token issuer. All session
//! state lives in the store; the service holds nothing mutable between calls.
//!
//! The owned invariant: a refresh request succeeds only if the presented
//! token equals the one last persisted for that account. Rotation goes
//! through the store's compare-and-set, so of two refreshes racing with the
//! same stale token exactly one can win.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use super::password::{self, PasswordError};
use super::token::{AccessClaims, TokenError, TokenIssuer};
use crate::models::{Account, LoginResponse, TokenPair};
use crate::store::{CredentialStore, StoreError};

/// Why a presented token was rejected
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenRejection {
    #[error("No refresh token presented")]
    Missing,

    #[error("Refresh token has expired")]
    Expired,

    #[error("Invalid refresh token")]
    Malformed,

    #[error("Refresh token is expired or used")]
    Superseded,
}

/// Session service errors, one variant per taxonomy kind
#[derive(Error, Debug, PartialEq)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Account does not exist")]
    NotFound,

    #[error("Invalid account credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(TokenRejection),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => AuthError::Conflict(e.to_string()),
            StoreError::Database(_) => AuthError::Internal(e.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::Internal(e.to_string())
    }
}

/// Manages the credential and session-token lifecycle for all accounts
pub struct SessionService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenIssuer,
}

impl SessionService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Authenticate by username or email and issue a fresh token pair
    ///
    /// At least one identifier must be present. The issued refresh token is
    /// persisted unconditionally, superseding whatever was stored before.
    pub async fn login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<LoginResponse, AuthError> {
        let username = username
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let email = email.map(str::trim).filter(|s| !s.is_empty());

        if username.is_none() && email.is_none() {
            return Err(AuthError::Validation(
                "Username or email is required".to_string(),
            ));
        }

        let account = self
            .store
            .find_by_identifier(username.as_deref(), email)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !password::verify(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.issue_access(&account)?;
        let refresh_token = self.issue_refresh(account.id)?;
        self.store
            .set_refresh_token(account.id, Some(&refresh_token))
            .await?;

        tracing::debug!(account_id = %account.id, "login succeeded");

        Ok(LoginResponse {
            user: account.into(),
            access_token,
            refresh_token,
        })
    }

    /// Exchange a valid refresh token for a new access/refresh pair
    ///
    /// The presented token must verify against the refresh secret and match
    /// the stored value byte-for-byte; the rotation itself is the store's
    /// compare-and-set, which also rejects replay of a superseded token.
    pub async fn refresh(&self, presented: Option<&str>) -> Result<TokenPair, AuthError> {
        let presented = presented
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::Unauthorized(TokenRejection::Missing))?;

        let account_id = self
            .tokens
            .verify_refresh_token(presented)
            .map_err(|e| match e {
                TokenError::Expired => AuthError::Unauthorized(TokenRejection::Expired),
                _ => AuthError::Unauthorized(TokenRejection::Malformed),
            })?;

        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::Unauthorized(TokenRejection::Superseded))?;

        let access_token = self.issue_access(&account)?;
        let refresh_token = self.issue_refresh(account.id)?;

        let rotated = self
            .store
            .compare_and_set_refresh_token(account.id, presented, &refresh_token)
            .await?;
        if !rotated {
            return Err(AuthError::Unauthorized(TokenRejection::Superseded));
        }

        tracing::debug!(account_id = %account.id, "refresh token rotated");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Clear the stored refresh token for the account
    ///
    /// Unconditional and idempotent; authorization for this call is the
    /// adapter's access-token check.
    pub async fn logout(&self, account_id: Uuid) -> Result<(), AuthError> {
        self.store.set_refresh_token(account_id, None).await?;
        tracing::debug!(%account_id, "logged out");
        Ok(())
    }

    /// Re-hash and persist a new password after verifying the old one
    ///
    /// The stored refresh token is left untouched, so existing sessions
    /// remain valid.
    pub async fn change_password(
        &self,
        account_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.trim().is_empty() {
            return Err(AuthError::Validation(
                "New password is required".to_string(),
            ));
        }

        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !password::verify(old_password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = password::hash(new_password)?;
        self.store
            .update_password_hash(account_id, &password_hash)
            .await?;

        tracing::debug!(%account_id, "password changed");

        Ok(())
    }

    /// Verify an access token on behalf of the HTTP adapter
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.tokens.verify_access_token(token)
    }

    fn issue_access(&self, account: &Account) -> Result<String, AuthError> {
        self.tokens
            .issue_access_token(account)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    fn issue_refresh(&self, account_id: Uuid) -> Result<String, AuthError> {
        self.tokens
            .issue_refresh_token(account_id)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}
