//! Account service
//!
//! Registration and profile reads/updates. Registration issues no tokens;
//! a fresh account starts anonymous and logs in separately.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{password, AuthError};
use crate::models::{AccountResponse, NewAccount, RegisterRequest};
use crate::store::CredentialStore;

pub struct AccountService {
    store: Arc<dyn CredentialStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Create an account with a lower-cased username and a hashed password
    pub async fn register(&self, request: RegisterRequest) -> Result<AccountResponse, AuthError> {
        let username = request.username.trim().to_lowercase();
        let email = request.email.trim().to_string();
        let fullname = request.fullname.trim().to_string();

        if username.is_empty()
            || email.is_empty()
            || fullname.is_empty()
            || request.password.trim().is_empty()
        {
            return Err(AuthError::Validation(
                "Fill in the required fields".to_string(),
            ));
        }

        if self
            .store
            .find_by_identifier(Some(&username), Some(&email))
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict(
                "Account with email or username already exists".to_string(),
            ));
        }

        let password_hash = password::hash(&request.password)?;

        // The store's unique constraints close the window between the lookup
        // above and this insert.
        let account = self
            .store
            .insert(NewAccount {
                username,
                email,
                fullname,
                avatar_url: request.avatar_url,
                cover_image_url: request.cover_image_url,
                password_hash,
            })
            .await?;

        tracing::info!(account_id = %account.id, "account registered");

        Ok(account.into())
    }

    /// Fetch the sanitized profile for an account
    pub async fn current(&self, account_id: Uuid) -> Result<AccountResponse, AuthError> {
        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::NotFound)?;
        Ok(account.into())
    }

    /// Update profile fields; at least one must be present
    pub async fn update_profile(
        &self,
        account_id: Uuid,
        fullname: Option<&str>,
        email: Option<&str>,
    ) -> Result<AccountResponse, AuthError> {
        let fullname = fullname.map(str::trim).filter(|s| !s.is_empty());
        let email = email.map(str::trim).filter(|s| !s.is_empty());

        if fullname.is_none() && email.is_none() {
            return Err(AuthError::Validation(
                "At least one profile field is required".to_string(),
            ));
        }

        let account = self
            .store
            .update_profile(account_id, fullname, email)
            .await?
            .ok_or(AuthError::NotFound)?;

        Ok(account.into())
    }
}
