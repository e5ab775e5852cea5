//! Session Lifecycle Tests
//!
//! These tests exercise login, refresh-with-rotation, logout and password
//! change end to end against the in-memory credential store.

use std::sync::Arc;

use uuid::Uuid;

use vidtube_server::account::AccountService;
use vidtube_server::auth::{AuthError, SessionService, TokenIssuer, TokenRejection};
use vidtube_server::models::RegisterRequest;
use vidtube_server::store::memory::InMemoryCredentialStore;
use vidtube_server::store::CredentialStore;

const PASSWORD: &str = "correct horse battery staple";

fn issuer() -> TokenIssuer {
    TokenIssuer::new("access-secret", "refresh-secret", 900, 7)
}

fn services() -> (SessionService, AccountService, Arc<InMemoryCredentialStore>) {
    let store = Arc::new(InMemoryCredentialStore::new());
    let sessions = SessionService::new(store.clone() as Arc<dyn CredentialStore>, issuer());
    let accounts = AccountService::new(store.clone() as Arc<dyn CredentialStore>);
    (sessions, accounts, store)
}

async fn register(accounts: &AccountService, username: &str) -> Uuid {
    accounts
        .register(RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            fullname: "Test Account".to_string(),
            password: PASSWORD.to_string(),
            avatar_url: None,
            cover_image_url: None,
        })
        .await
        .unwrap()
        .id
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_returns_pair_bound_to_the_account() {
    let (sessions, accounts, _) = services();
    let id = register(&accounts, "u1").await;

    let response = sessions.login(Some("u1"), None, PASSWORD).await.unwrap();

    let access = sessions.verify_access(&response.access_token).unwrap();
    assert_eq!(access.sub, id.to_string());

    let refresh_id = issuer().verify_refresh_token(&response.refresh_token).unwrap();
    assert_eq!(refresh_id, id);

    assert_eq!(response.user.id, id);
}

#[tokio::test]
async fn login_works_by_email_and_by_uppercased_username() {
    let (sessions, accounts, _) = services();
    register(&accounts, "u1").await;

    assert!(sessions
        .login(None, Some("u1@example.com"), PASSWORD)
        .await
        .is_ok());

    // Usernames are lower-cased at creation and at login.
    assert!(sessions.login(Some("U1"), None, PASSWORD).await.is_ok());
}

#[tokio::test]
async fn login_with_wrong_password_fails_without_a_write() {
    let (sessions, accounts, store) = services();
    let id = register(&accounts, "u1").await;

    let err = sessions.login(Some("u1"), None, "wrong").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);

    let account = store.find_by_id(id).await.unwrap().unwrap();
    assert!(account.refresh_token.is_none());
}

#[tokio::test]
async fn login_requires_at_least_one_identifier() {
    let (sessions, _, _) = services();

    let err = sessions.login(None, None, PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));

    let err = sessions
        .login(Some("  "), Some(""), PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[tokio::test]
async fn login_with_unknown_identifier_fails_not_found() {
    let (sessions, _, _) = services();

    let err = sessions.login(Some("ghost"), None, PASSWORD).await.unwrap_err();
    assert_eq!(err, AuthError::NotFound);
}

// ============================================================================
// Refresh and rotation
// ============================================================================

#[tokio::test]
async fn refresh_rotates_and_rejects_replay_of_the_old_token() {
    let (sessions, accounts, _) = services();
    register(&accounts, "u1").await;

    // u1 logs in, receives (A1, R1).
    let login = sessions.login(Some("u1"), None, PASSWORD).await.unwrap();
    let r1 = login.refresh_token;

    // refresh(R1) yields (A2, R2) with R2 != R1.
    let second = sessions.refresh(Some(&r1)).await.unwrap();
    assert_ne!(second.refresh_token, r1);

    // refresh(R1) again: the old token is permanently unusable.
    let err = sessions.refresh(Some(&r1)).await.unwrap_err();
    assert_eq!(err, AuthError::Unauthorized(TokenRejection::Superseded));

    // refresh(R2) succeeds with a third distinct pair.
    let third = sessions.refresh(Some(&second.refresh_token)).await.unwrap();
    assert_ne!(third.refresh_token, second.refresh_token);
}

#[tokio::test]
async fn refresh_without_a_token_is_unauthorized() {
    let (sessions, _, _) = services();

    let err = sessions.refresh(None).await.unwrap_err();
    assert_eq!(err, AuthError::Unauthorized(TokenRejection::Missing));

    let err = sessions.refresh(Some("   ")).await.unwrap_err();
    assert_eq!(err, AuthError::Unauthorized(TokenRejection::Missing));
}

#[tokio::test]
async fn refresh_with_garbage_or_foreign_token_is_malformed() {
    let (sessions, accounts, _) = services();
    register(&accounts, "u1").await;
    sessions.login(Some("u1"), None, PASSWORD).await.unwrap();

    // Garbage input fails before any store lookup; even with a stored token
    // on record the rejection is Malformed, not Superseded.
    let err = sessions.refresh(Some("garbage.token.value")).await.unwrap_err();
    assert_eq!(err, AuthError::Unauthorized(TokenRejection::Malformed));

    // A token signed under a different secret is equally malformed.
    let foreign = TokenIssuer::new("access-secret", "some-other-secret", 900, 7)
        .issue_refresh_token(Uuid::new_v4())
        .unwrap();
    let err = sessions.refresh(Some(&foreign)).await.unwrap_err();
    assert_eq!(err, AuthError::Unauthorized(TokenRejection::Malformed));
}

#[tokio::test]
async fn refresh_with_expired_token_reports_expiry() {
    let (_, accounts, store) = services();
    let id = register(&accounts, "u1").await;

    // An issuer whose refresh TTL is already in the past.
    let expired_issuer = TokenIssuer::new("access-secret", "refresh-secret", 900, -1);
    let stale = expired_issuer.issue_refresh_token(id).unwrap();
    store.set_refresh_token(id, Some(&stale)).await.unwrap();

    let sessions = SessionService::new(store as Arc<dyn CredentialStore>, issuer());
    let err = sessions.refresh(Some(&stale)).await.unwrap_err();
    assert_eq!(err, AuthError::Unauthorized(TokenRejection::Expired));
}

#[tokio::test]
async fn racing_refreshes_with_the_same_token_produce_one_winner() {
    let (sessions, accounts, _) = services();
    register(&accounts, "u1").await;

    let login = sessions.login(Some("u1"), None, PASSWORD).await.unwrap();
    let r1 = login.refresh_token;

    let (first, second) = tokio::join!(sessions.refresh(Some(&r1)), sessions.refresh(Some(&r1)));

    // Exactly one racer observes the compare-and-set succeed.
    assert!(
        first.is_ok() != second.is_ok(),
        "expected exactly one refresh to win the rotation"
    );
    let loser = if first.is_ok() { second } else { first };
    assert_eq!(
        loser.unwrap_err(),
        AuthError::Unauthorized(TokenRejection::Superseded)
    );
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn logout_blocks_refresh_and_is_idempotent() {
    let (sessions, accounts, store) = services();
    let id = register(&accounts, "u1").await;

    let login = sessions.login(Some("u1"), None, PASSWORD).await.unwrap();

    sessions.logout(id).await.unwrap();
    let account = store.find_by_id(id).await.unwrap().unwrap();
    assert!(account.refresh_token.is_none());

    // The previously valid refresh token no longer matches anything.
    let err = sessions.refresh(Some(&login.refresh_token)).await.unwrap_err();
    assert_eq!(err, AuthError::Unauthorized(TokenRejection::Superseded));

    // A second logout succeeds and leaves the account in the same state.
    sessions.logout(id).await.unwrap();
    let account = store.find_by_id(id).await.unwrap().unwrap();
    assert!(account.refresh_token.is_none());
}

// ============================================================================
// Password change
// ============================================================================

#[tokio::test]
async fn change_password_round_trip() {
    let (sessions, accounts, _) = services();
    let id = register(&accounts, "u1").await;

    sessions
        .change_password(id, PASSWORD, "a brand new passphrase")
        .await
        .unwrap();

    assert!(sessions
        .login(Some("u1"), None, "a brand new passphrase")
        .await
        .is_ok());

    let err = sessions.login(Some("u1"), None, PASSWORD).await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn change_password_requires_the_old_password() {
    let (sessions, accounts, _) = services();
    let id = register(&accounts, "u1").await;

    let err = sessions
        .change_password(id, "wrong old password", "new password")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn change_password_leaves_existing_sessions_valid() {
    let (sessions, accounts, _) = services();
    let id = register(&accounts, "u1").await;

    let login = sessions.login(Some("u1"), None, PASSWORD).await.unwrap();

    sessions
        .change_password(id, PASSWORD, "a brand new passphrase")
        .await
        .unwrap();

    // The refresh token on record was untouched by the password change.
    assert!(sessions.refresh(Some(&login.refresh_token)).await.is_ok());
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_lowercases_username_and_rejects_duplicates() {
    let (_, accounts, _) = services();

    let created = accounts
        .register(RegisterRequest {
            username: "MixedCase".to_string(),
            email: "mixed@example.com".to_string(),
            fullname: "Mixed Case".to_string(),
            password: PASSWORD.to_string(),
            avatar_url: Some("https://cdn.example.com/avatar.png".to_string()),
            cover_image_url: None,
        })
        .await
        .unwrap();
    assert_eq!(created.username, "mixedcase");

    let err = accounts
        .register(RegisterRequest {
            username: "mixedcase".to_string(),
            email: "other@example.com".to_string(),
            fullname: "Other".to_string(),
            password: PASSWORD.to_string(),
            avatar_url: None,
            cover_image_url: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Conflict(_)));
}

#[tokio::test]
async fn register_rejects_blank_fields() {
    let (_, accounts, _) = services();

    let err = accounts
        .register(RegisterRequest {
            username: "  ".to_string(),
            email: "u1@example.com".to_string(),
            fullname: "Test".to_string(),
            password: PASSWORD.to_string(),
            avatar_url: None,
            cover_image_url: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}
