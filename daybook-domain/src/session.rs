//! Session-token persistence for the auth layer.
//!
//! Tokens are plain string keys with TTLs, not entities: one refresh token
//! per account under `{prefix}:refresh_token:{account}`, and a deny list
//! for revoked access tokens under `{prefix}:denied_token:{token}` that
//! outlives the token itself. Token issuance and validation live in the
//! auth layer; this store only remembers.

use std::sync::Arc;

use daybook_store::{KeyBuilder, KeySpace, Store, StoreResult};

/// Persists refresh tokens and the access-token deny list.
pub struct SessionStore<S: Store> {
    store: Arc<S>,
    refresh: KeySpace,
    denied: KeySpace,
}

impl<S: Store> SessionStore<S> {
    #[must_use]
    pub fn new(store: Arc<S>, keys: &KeyBuilder) -> Self {
        Self {
            store,
            refresh: keys.namespace("refresh_token"),
            denied: keys.namespace("denied_token"),
        }
    }

    /// Stores an account's refresh token, replacing any previous one.
    pub async fn put_refresh_token(
        &self,
        account_id: &str,
        token: &str,
        ttl_secs: u64,
    ) -> StoreResult<()> {
        self.store
            .set(&self.refresh.primary(account_id), token, Some(ttl_secs))
            .await
    }

    /// Whether the presented refresh token matches the stored one.
    pub async fn verify_refresh_token(&self, account_id: &str, token: &str) -> StoreResult<bool> {
        let stored = self.store.get(&self.refresh.primary(account_id)).await?;
        Ok(stored.as_deref() == Some(token))
    }

    /// Drops an account's refresh token. Returns whether one existed.
    pub async fn revoke_refresh_token(&self, account_id: &str) -> StoreResult<bool> {
        Ok(self.store.del(&self.refresh.primary(account_id)).await? > 0)
    }

    /// Marks an access token revoked for the rest of its lifetime.
    pub async fn deny_access_token(&self, token: &str, remaining_ttl_secs: u64) -> StoreResult<()> {
        self.store
            .set(&self.denied.primary(token), "1", Some(remaining_ttl_secs))
            .await
    }

    /// Whether an access token has been revoked.
    pub async fn is_access_token_denied(&self, token: &str) -> StoreResult<bool> {
        self.store.exists(&self.denied.primary(token)).await
    }
}
