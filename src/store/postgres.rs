//! PostgreSQL credential store

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::models::{Account, NewAccount};

const ACCOUNT_COLUMNS: &str = "id, username, email, fullname, avatar_url, cover_image_url, \
                               password_hash, refresh_token, created_at, updated_at";

/// Credential store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_identifier(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            WHERE ($1::text IS NOT NULL AND username = $1)
               OR ($2::text IS NOT NULL AND email = $2)
            "#,
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let created = sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO accounts (id, username, email, fullname, avatar_url, cover_image_url, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ACCOUNT_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.fullname)
        .bind(&account.avatar_url)
        .bind(&account.cover_image_url)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        fullname: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            r#"
            UPDATE accounts
            SET fullname = COALESCE($2, fullname),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(fullname)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn compare_and_set_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> Result<bool, StoreError> {
        // Single conditional UPDATE: the row count tells us whether this call
        // won the rotation. A NULL stored token never matches.
        let rows_affected = sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token = $3, updated_at = NOW()
            WHERE id = $1 AND refresh_token = $2
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(new)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected == 1)
    }
}
