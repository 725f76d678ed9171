//! The abstract store interface.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::command::{CommandOutcome, Pipeline};
use crate::error::StoreResult;

/// A remote key-value store with hashes, sorted sets, and batched pipelines.
///
/// This is the seam between the repositories and the wire client. Reads
/// report absence as empty values (`None`, empty map, empty list), never as
/// errors; an `Err` always means the store itself misbehaved.
///
/// Sorted-set rank ranges follow store conventions: `start`/`stop` are
/// zero-based ranks, negative values count from the end (`-1` is the last
/// member), and both ends are inclusive.
#[async_trait]
pub trait Store: Send + Sync {
    // ── String operations ────────────────────────────────────────

    /// Reads a string value.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a string value, optionally expiring after `expiry_secs`.
    async fn set(&self, key: &str, value: &str, expiry_secs: Option<u64>) -> StoreResult<()>;

    /// Deletes a key of any type. Returns the number of keys removed.
    async fn del(&self, key: &str) -> StoreResult<i64>;

    /// Whether a key of any type exists.
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    // ── Hash operations ──────────────────────────────────────────

    /// Reads one hash field.
    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Writes one hash field. Returns 1 when the field is new.
    async fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<i64>;

    /// Deletes one hash field. Returns the number of fields removed.
    async fn hdel(&self, key: &str, field: &str) -> StoreResult<i64>;

    /// Reads all fields of a hash; empty map when the key is absent.
    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>>;

    /// Writes all given fields of a hash in one command.
    async fn hset_all(&self, key: &str, fields: HashMap<String, String>) -> StoreResult<()>;

    // ── Sorted-set operations ────────────────────────────────────

    /// Adds (or rescores) a member. Returns 1 when the member is new.
    async fn zadd(&self, key: &str, score: f64, member: &str) -> StoreResult<i64>;

    /// Removes a member. Returns the number of members removed.
    async fn zrem(&self, key: &str, member: &str) -> StoreResult<i64>;

    /// Members in ascending score order within the rank range.
    async fn zrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>>;

    /// Members in descending score order within the rank range.
    async fn zrevrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>>;

    /// Members whose score lies in `[min, max]`, ascending.
    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> StoreResult<Vec<String>>;

    /// Cardinality of the sorted set.
    async fn zcard(&self, key: &str) -> StoreResult<u64>;

    // ── Pipelining ───────────────────────────────────────────────

    /// Executes a command queue in one round trip.
    ///
    /// Returns one outcome per command in submission order. Commands after
    /// a failed one still execute; nothing is rolled back. An `Err` from
    /// this method means the round trip itself failed and no outcome is
    /// known for any command.
    async fn exec(&self, pipeline: Pipeline) -> StoreResult<Vec<CommandOutcome>>;
}
