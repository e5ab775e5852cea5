//! Credential store abstraction
//!
//! The session and account services talk to persistence through the
//! [`CredentialStore`] trait. The production implementation is
//! [`postgres::PgCredentialStore`]; [`memory::InMemoryCredentialStore`] backs
//! the lifecycle tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Account, NewAccount};

/// Errors surfaced by credential store implementations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("account with this username or email already exists")]
    Duplicate,

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            // 23505: unique constraint violation
            if db.code().as_deref() == Some("23505") {
                return StoreError::Duplicate;
            }
        }
        StoreError::Database(e.to_string())
    }
}

/// Persistence port for account records
///
/// `compare_and_set_refresh_token` is the only rotation path: it must be a
/// single atomic conditional write so that two refreshes racing with the same
/// stale token cannot both succeed.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up an account by username or email; either identifier matches.
    async fn find_by_identifier(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Insert a new account; fails [`StoreError::Duplicate`] when the
    /// username or email is already taken.
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError>;

    /// Update profile fields; `None` leaves the field unchanged. Returns the
    /// updated account, or `None` when the id does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        fullname: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>, StoreError>;

    /// Unconditionally set or clear the stored refresh token.
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError>;

    /// Atomically replace the stored refresh token, but only if the current
    /// value equals `expected`. Returns whether the swap happened.
    async fn compare_and_set_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> Result<bool, StoreError>;
}
