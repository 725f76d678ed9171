use std::time::Duration;

use daybook_store::{is_read_only_replica, RetryPolicy, StoreConfig, StoreError};

// ── RetryPolicy ──────────────────────────────────────────────────

#[test]
fn delay_grows_linearly() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay(1), Duration::from_millis(50));
    assert_eq!(policy.delay(2), Duration::from_millis(100));
    assert_eq!(policy.delay(10), Duration::from_millis(500));
}

#[test]
fn delay_caps_at_two_seconds() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay(40), Duration::from_millis(2000));
    assert_eq!(policy.delay(41), Duration::from_millis(2000));
    assert_eq!(policy.delay(u32::MAX), Duration::from_millis(2000));
}

#[test]
fn custom_policy() {
    let policy = RetryPolicy::new(Duration::from_millis(10), Duration::from_millis(25));
    assert_eq!(policy.delay(1), Duration::from_millis(10));
    assert_eq!(policy.delay(2), Duration::from_millis(20));
    assert_eq!(policy.delay(3), Duration::from_millis(25));
}

// ── Read-only replica detection ──────────────────────────────────

#[test]
fn readonly_command_error_forces_reconnect() {
    let err = StoreError::Command("READONLY You can't write against a read only replica.".into());
    assert!(is_read_only_replica(&err));
}

#[test]
fn other_errors_do_not_force_reconnect() {
    assert!(!is_read_only_replica(&StoreError::Command("ERR wrong number of arguments".into())));
    assert!(!is_read_only_replica(&StoreError::Connection("refused".into())));
    assert!(!is_read_only_replica(&StoreError::Timeout));
}

// ── StoreConfig ──────────────────────────────────────────────────

#[test]
fn default_config() {
    let config = StoreConfig::default();
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 6379);
    assert_eq!(config.password, None);
    assert_eq!(config.db, 0);
    assert_eq!(config.key_prefix, "daybook");
    assert_eq!(config.max_retries_per_request, 3);
    assert_eq!(config.command_timeout, Duration::from_secs(5));
}
