mod common;

use common::{keys, store};
use daybook_domain::SessionStore;

// ── Refresh tokens ───────────────────────────────────────────────

#[tokio::test]
async fn put_then_verify_refresh_token() {
    let sessions = SessionStore::new(store(), &keys());

    sessions.put_refresh_token("u1", "tok-abc", 3600).await.unwrap();

    assert!(sessions.verify_refresh_token("u1", "tok-abc").await.unwrap());
    assert!(!sessions.verify_refresh_token("u1", "tok-other").await.unwrap());
    assert!(!sessions.verify_refresh_token("u2", "tok-abc").await.unwrap());
}

#[tokio::test]
async fn new_token_replaces_the_old_one() {
    let sessions = SessionStore::new(store(), &keys());

    sessions.put_refresh_token("u1", "tok-old", 3600).await.unwrap();
    sessions.put_refresh_token("u1", "tok-new", 3600).await.unwrap();

    assert!(!sessions.verify_refresh_token("u1", "tok-old").await.unwrap());
    assert!(sessions.verify_refresh_token("u1", "tok-new").await.unwrap());
}

#[tokio::test]
async fn revoke_drops_the_token() {
    let sessions = SessionStore::new(store(), &keys());

    sessions.put_refresh_token("u1", "tok-abc", 3600).await.unwrap();
    assert!(sessions.revoke_refresh_token("u1").await.unwrap());
    assert!(!sessions.revoke_refresh_token("u1").await.unwrap());
    assert!(!sessions.verify_refresh_token("u1", "tok-abc").await.unwrap());
}

#[tokio::test]
async fn expired_refresh_token_no_longer_verifies() {
    let sessions = SessionStore::new(store(), &keys());

    sessions.put_refresh_token("u1", "tok-abc", 0).await.unwrap();
    assert!(!sessions.verify_refresh_token("u1", "tok-abc").await.unwrap());
}

// ── Access-token deny list ───────────────────────────────────────

#[tokio::test]
async fn denied_access_token_is_flagged_until_expiry() {
    let sessions = SessionStore::new(store(), &keys());

    assert!(!sessions.is_access_token_denied("jwt-xyz").await.unwrap());
    sessions.deny_access_token("jwt-xyz", 600).await.unwrap();
    assert!(sessions.is_access_token_denied("jwt-xyz").await.unwrap());
}

#[tokio::test]
async fn deny_list_entry_lapses_with_its_ttl() {
    let sessions = SessionStore::new(store(), &keys());

    sessions.deny_access_token("jwt-xyz", 0).await.unwrap();
    assert!(!sessions.is_access_token_denied("jwt-xyz").await.unwrap());
}
