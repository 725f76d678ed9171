//! Store client configuration and connection-retry policy.
//!
//! Retries, backoff, and reconnects belong to the wire client, never to the
//! repositories: a repository call either completes against a live
//! connection or surfaces a [`StoreError`](crate::StoreError).

use std::env;
use std::time::Duration;

use crate::error::StoreError;

/// Connection settings for the store client.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    /// Logical database index.
    pub db: u32,
    /// Deployment prefix for every key (see [`crate::KeyBuilder`]).
    pub key_prefix: String,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    /// Retry attempts per request before the client gives up.
    pub max_retries_per_request: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            key_prefix: crate::keys::DEFAULT_KEY_PREFIX.to_string(),
            connect_timeout: Duration::from_secs(60),
            command_timeout: Duration::from_secs(5),
            max_retries_per_request: 3,
        }
    }
}

impl StoreConfig {
    /// Builds a config from `STORE_HOST`, `STORE_PORT`, `STORE_PASSWORD`,
    /// and `STORE_DB`, falling back to defaults for anything unset or
    /// unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = env::var("STORE_HOST") {
            config.host = host;
        }
        if let Some(port) = env::var("STORE_PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        config.password = env::var("STORE_PASSWORD").ok().filter(|p| !p.is_empty());
        if let Some(db) = env::var("STORE_DB").ok().and_then(|d| d.parse().ok()) {
            config.db = db;
        }
        config
    }
}

/// Capped linear backoff between connection attempts.
///
/// Attempt `n` (1-based) waits `min(n * step, cap)`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    step: Duration,
    cap: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given step and cap.
    #[must_use]
    pub const fn new(step: Duration, cap: Duration) -> Self {
        Self { step, cap }
    }

    /// Delay before the given 1-based attempt.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt).min(self.cap)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // 50ms, 100ms, ... capped at 2s.
        Self::new(Duration::from_millis(50), Duration::from_millis(2000))
    }
}

/// Whether an error came from a replica that rejected a write.
///
/// Happens after a failover when the client is still pointed at the old
/// primary; the only recovery is a forced reconnect.
#[must_use]
pub fn is_read_only_replica(err: &StoreError) -> bool {
    match err {
        StoreError::Command(msg) | StoreError::Protocol(msg) => msg.contains("READONLY"),
        _ => false,
    }
}
