//! In-memory store backend for tests and development.
//!
//! Implements the full [`Store`] surface over process-local tables with
//! real sorted-set semantics (score order, negative rank bounds, inclusive
//! score ranges) and lazy expiry for `SET` TTLs. Pipelines execute their
//! commands in submission order under a single write lock, so one
//! `MemoryStore` behaves like one single-threaded store node.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::command::{Command, CommandOutcome, Pipeline, Reply};
use crate::error::StoreResult;
use crate::store::Store;

#[derive(Debug, Clone)]
struct StringEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl StringEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

#[derive(Debug, Default)]
struct Tables {
    strings: HashMap<String, StringEntry>,
    hashes: HashMap<String, HashMap<String, String>>,
    /// member → score; ordering is derived on read.
    zsets: HashMap<String, HashMap<String, f64>>,
}

impl Tables {
    /// Drops the string entry if its TTL has passed.
    fn purge_expired(&mut self, key: &str) {
        if self.strings.get(key).is_some_and(StringEntry::is_expired) {
            self.strings.remove(key);
        }
    }

    fn del(&mut self, key: &str) -> i64 {
        self.purge_expired(key);
        let removed = self.strings.remove(key).is_some()
            || self.hashes.remove(key).is_some()
            || self.zsets.remove(key).is_some();
        i64::from(removed)
    }

    fn zadd(&mut self, key: &str, score: f64, member: &str) -> i64 {
        let zset = self.zsets.entry(key.to_string()).or_default();
        let added = !zset.contains_key(member);
        zset.insert(member.to_string(), score);
        i64::from(added)
    }

    fn zrem(&mut self, key: &str, member: &str) -> i64 {
        let Some(zset) = self.zsets.get_mut(key) else {
            return 0;
        };
        let removed = zset.remove(member).is_some();
        if zset.is_empty() {
            self.zsets.remove(key);
        }
        i64::from(removed)
    }

    /// Members ordered by (score, member), ascending.
    fn sorted_members(&self, key: &str) -> Vec<String> {
        let Some(zset) = self.zsets.get(key) else {
            return Vec::new();
        };
        let mut members: Vec<(&String, f64)> = zset.iter().map(|(m, s)| (m, *s)).collect();
        members.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        members.into_iter().map(|(m, _)| m.clone()).collect()
    }

    fn apply(&mut self, command: Command) -> CommandOutcome {
        match command {
            Command::Set {
                key,
                value,
                expiry_secs,
            } => {
                let expires_at =
                    expiry_secs.map(|secs| Instant::now() + std::time::Duration::from_secs(secs));
                self.strings.insert(key, StringEntry { value, expires_at });
                Ok(Reply::Ok)
            }
            Command::Del { key } => Ok(Reply::Int(self.del(&key))),
            Command::HGetAll { key } => {
                Ok(Reply::Map(self.hashes.get(&key).cloned().unwrap_or_default()))
            }
            Command::HSetAll { key, fields } => {
                self.hashes.entry(key).or_default().extend(fields);
                Ok(Reply::Ok)
            }
            Command::ZAdd { key, score, member } => {
                Ok(Reply::Int(self.zadd(&key, score, &member)))
            }
            Command::ZRem { key, member } => Ok(Reply::Int(self.zrem(&key, &member))),
        }
    }
}

/// Resolves a rank range with store conventions: zero-based, negative
/// values count from the end, both bounds inclusive.
fn resolve_rank_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// Process-local [`Store`] implementation.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut tables = self.tables.write().await;
        tables.purge_expired(key);
        Ok(tables.strings.get(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, expiry_secs: Option<u64>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.apply(Command::Set {
            key: key.to_string(),
            value: value.to_string(),
            expiry_secs,
        })?;
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<i64> {
        let mut tables = self.tables.write().await;
        Ok(tables.del(key))
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.purge_expired(key);
        Ok(tables.strings.contains_key(key)
            || tables.hashes.contains_key(key)
            || tables.zsets.contains_key(key))
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .hashes
            .get(key)
            .and_then(|hash| hash.get(field).cloned()))
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<i64> {
        let mut tables = self.tables.write().await;
        let hash = tables.hashes.entry(key.to_string()).or_default();
        let created = !hash.contains_key(field);
        hash.insert(field.to_string(), value.to_string());
        Ok(i64::from(created))
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<i64> {
        let mut tables = self.tables.write().await;
        let Some(hash) = tables.hashes.get_mut(key) else {
            return Ok(0);
        };
        let removed = hash.remove(field).is_some();
        if hash.is_empty() {
            tables.hashes.remove(key);
        }
        Ok(i64::from(removed))
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let tables = self.tables.read().await;
        Ok(tables.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn hset_all(&self, key: &str, fields: HashMap<String, String>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.apply(Command::HSetAll {
            key: key.to_string(),
            fields,
        })?;
        Ok(())
    }

    async fn zadd(&self, key: &str, score: f64, member: &str) -> StoreResult<i64> {
        let mut tables = self.tables.write().await;
        Ok(tables.zadd(key, score, member))
    }

    async fn zrem(&self, key: &str, member: &str) -> StoreResult<i64> {
        let mut tables = self.tables.write().await;
        Ok(tables.zrem(key, member))
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        let members = tables.sorted_members(key);
        Ok(match resolve_rank_range(members.len(), start, stop) {
            Some((from, to)) => members[from..=to].to_vec(),
            None => Vec::new(),
        })
    }

    async fn zrevrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        let mut members = tables.sorted_members(key);
        members.reverse();
        Ok(match resolve_rank_range(members.len(), start, stop) {
            Some((from, to)) => members[from..=to].to_vec(),
            None => Vec::new(),
        })
    }

    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        let Some(zset) = tables.zsets.get(key) else {
            return Ok(Vec::new());
        };
        let mut members: Vec<(&String, f64)> = zset
            .iter()
            .filter(|(_, score)| **score >= min && **score <= max)
            .map(|(m, s)| (m, *s))
            .collect();
        members.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        Ok(members.into_iter().map(|(m, _)| m.clone()).collect())
    }

    async fn zcard(&self, key: &str) -> StoreResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables.zsets.get(key).map_or(0, |zset| zset.len() as u64))
    }

    async fn exec(&self, pipeline: Pipeline) -> StoreResult<Vec<CommandOutcome>> {
        let mut tables = self.tables.write().await;
        Ok(pipeline
            .into_commands()
            .into_iter()
            .map(|command| tables.apply(command))
            .collect())
    }
}
