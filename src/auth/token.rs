//! Token issuance and verification
//!
//! Access and refresh tokens are signed JWTs bound to the same account id but
//! with independent secrets and lifetimes: access tokens are checked cheaply
//! on every request, while the refresh token is the sole path to renewal.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Account;

/// Token verification and signing errors
///
/// `Expired` and `Malformed` are distinct on purpose: an expired refresh
/// token means the client should re-login, a malformed one never reaches the
/// credential store at all.
#[derive(Error, Debug, PartialEq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Claims carried by access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (account id)
    pub sub: String,
    pub username: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    pub token_type: String,
}

/// Claims carried by refresh tokens; only the identity, nothing else
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Issues and verifies the access/refresh token pair
#[derive(Clone)]
pub struct TokenIssuer {
    access_secret: String,
    refresh_secret: String,
    access_ttl_seconds: i64,
    refresh_ttl_days: i64,
}

impl TokenIssuer {
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        access_ttl_seconds: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl_seconds,
            refresh_ttl_days,
        }
    }

    /// Issue a short-lived access token carrying the account identity
    pub fn issue_access_token(&self, account: &Account) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            email: account.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_ttl_seconds)).timestamp(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };
        sign(&claims, &self.access_secret)
    }

    /// Issue a refresh token; claims carry only the account id
    pub fn issue_refresh_token(&self, account_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.refresh_ttl_days)).timestamp(),
            token_type: TOKEN_TYPE_REFRESH.to_string(),
        };
        sign(&claims, &self.refresh_secret)
    }

    /// Verify an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims: AccessClaims = decode_claims(token, &self.access_secret)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }

    /// Verify a refresh token and return the account id it was issued for
    pub fn verify_refresh_token(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims: RefreshClaims = decode_claims(token, &self.refresh_secret)?;
        if claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(TokenError::Malformed);
        }
        Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)
    }
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

fn decode_claims<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, TokenError> {
    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            fullname: "Test User".to_string(),
            avatar_url: None,
            cover_image_url: None,
            password_hash: "hash".to_string(),
            refresh_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("access-secret", "refresh-secret", 900, 7)
    }

    #[test]
    fn test_access_token_round_trip() {
        let account = test_account();
        let token = issuer().issue_access_token(&account).unwrap();
        assert!(!token.is_empty());

        let claims = issuer().verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.username, account.username);
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let account_id = Uuid::new_v4();
        let token = issuer().issue_refresh_token(account_id).unwrap();

        let decoded = issuer().verify_refresh_token(&token).unwrap();
        assert_eq!(decoded, account_id);
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        assert_eq!(
            issuer().verify_refresh_token("not.a.token").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(
            issuer().verify_access_token("").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_wrong_secret_is_malformed() {
        let token = issuer().issue_refresh_token(Uuid::new_v4()).unwrap();
        let other = TokenIssuer::new("access-secret", "other-refresh-secret", 900, 7);
        assert_eq!(
            other.verify_refresh_token(&token).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        // The secrets differ, so an access token presented for refresh fails
        // signature validation before the type check even runs.
        let token = issuer().issue_access_token(&test_account()).unwrap();
        assert_eq!(
            issuer().verify_refresh_token(&token).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_token_type_is_checked_even_with_shared_secrets() {
        let shared = TokenIssuer::new("same-secret", "same-secret", 900, 7);
        let refresh = shared.issue_refresh_token(Uuid::new_v4()).unwrap();
        assert_eq!(
            shared.verify_access_token(&refresh).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_expired_token_is_distinct_from_malformed() {
        // Negative TTLs put the expiry far enough in the past to clear the
        // default validation leeway.
        let expired = TokenIssuer::new("access-secret", "refresh-secret", -300, -1);

        let token = expired.issue_access_token(&test_account()).unwrap();
        assert_eq!(
            issuer().verify_access_token(&token).unwrap_err(),
            TokenError::Expired
        );

        let token = expired.issue_refresh_token(Uuid::new_v4()).unwrap();
        assert_eq!(
            issuer().verify_refresh_token(&token).unwrap_err(),
            TokenError::Expired
        );
    }
}
