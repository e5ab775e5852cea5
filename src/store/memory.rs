//! In-memory credential store
//!
//! Backs the session lifecycle tests. All mutations happen under one lock, so
//! the compare-and-set is serialized per store exactly like the single
//! conditional UPDATE in the PostgreSQL implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::models::{Account, NewAccount};

#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_identifier(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .values()
            .find(|a| {
                username.is_some_and(|u| a.username == u) || email.is_some_and(|e| a.email == e)
            })
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.get(&id).cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts
            .values()
            .any(|a| a.username == account.username || a.email == account.email)
        {
            return Err(StoreError::Duplicate);
        }

        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            fullname: account.fullname,
            avatar_url: account.avatar_url,
            cover_image_url: account.cover_image_url,
            password_hash: account.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.get_mut(&id) {
            account.password_hash = password_hash.to_string();
            account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        fullname: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(&id) {
            Some(account) => {
                if let Some(fullname) = fullname {
                    account.fullname = fullname.to_string();
                }
                if let Some(email) = email {
                    account.email = email.to_string();
                }
                account.updated_at = Utc::now();
                Ok(Some(account.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.get_mut(&id) {
            account.refresh_token = token.map(str::to_string);
            account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn compare_and_set_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(&id) {
            Some(account) if account.refresh_token.as_deref() == Some(expected) => {
                account.refresh_token = Some(new.to_string());
                account.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
