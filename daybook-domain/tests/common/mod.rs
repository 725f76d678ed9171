//! Shared test fixtures for the domain repositories.

// Not every test binary touches every fixture.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use daybook_store::{KeyBuilder, MemoryStore};

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub fn keys() -> KeyBuilder {
    KeyBuilder::new("test")
}

/// Fixed timestamp helper so list scores are deterministic.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}
