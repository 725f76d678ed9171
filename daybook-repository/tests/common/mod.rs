//! Shared fixtures: a small "note" kind with one global and one
//! owner-scoped index, plus a store wrapper that records pipelined
//! commands and can inject per-key failures.

// Not every test binary touches every fixture.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use daybook_repository::{
    fields, generate_id, DecodeError, EntityCodec, IndexHooks, OwnedEntityCodec, OwnerIndexHooks,
};
use daybook_store::{
    Command, CommandOutcome, KeySpace, MemoryStore, Pipeline, Store, StoreError, StoreResult,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fixed timestamp helper so list scores are deterministic.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

// ── The note kind ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub folder: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub owner_id: String,
    pub title: String,
    pub folder: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl NoteDraft {
    pub fn new(owner: &str, title: &str) -> Self {
        Self {
            owner_id: owner.to_string(),
            title: title.to_string(),
            folder: "inbox".to_string(),
            created_at: None,
        }
    }

    pub fn created(mut self, when: DateTime<Utc>) -> Self {
        self.created_at = Some(when);
        self
    }

    pub fn folder(mut self, folder: &str) -> Self {
        self.folder = folder.to_string();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub folder: Option<String>,
    pub archived: Option<bool>,
}

pub struct NoteCodec;

impl EntityCodec for NoteCodec {
    type Entity = Note;
    type Draft = NoteDraft;
    type Patch = NotePatch;

    const KIND: &'static str = "note";

    fn id(entity: &Note) -> &str {
        &entity.id
    }

    fn created_at(entity: &Note) -> DateTime<Utc> {
        entity.created_at
    }

    fn encode(entity: &Note) -> HashMap<String, String> {
        HashMap::from([
            ("id".to_string(), entity.id.clone()),
            ("owner_id".to_string(), entity.owner_id.clone()),
            ("title".to_string(), entity.title.clone()),
            ("folder".to_string(), entity.folder.clone()),
            ("archived".to_string(), fields::encode_bool(entity.archived)),
            ("created_at".to_string(), fields::encode_date(entity.created_at)),
            ("updated_at".to_string(), fields::encode_date(entity.updated_at)),
        ])
    }

    fn decode(record: &HashMap<String, String>) -> Result<Note, DecodeError> {
        let created_at = fields::decode_date(record, "created_at")?;
        Ok(Note {
            id: fields::require_str(record, "id")?,
            owner_id: fields::require_str(record, "owner_id")?,
            title: fields::opt_str(record, "title").unwrap_or_default(),
            folder: fields::opt_str(record, "folder").unwrap_or_else(|| "inbox".to_string()),
            archived: fields::decode_bool(record, "archived"),
            created_at,
            updated_at: fields::decode_date(record, "updated_at").unwrap_or(created_at),
        })
    }

    fn from_draft(draft: NoteDraft) -> Note {
        let created_at = draft.created_at.unwrap_or_else(Utc::now);
        Note {
            id: generate_id(),
            owner_id: draft.owner_id,
            title: draft.title,
            folder: draft.folder,
            archived: false,
            created_at,
            updated_at: created_at,
        }
    }

    fn apply_patch(existing: &Note, patch: NotePatch) -> Note {
        Note {
            id: existing.id.clone(),
            owner_id: existing.owner_id.clone(),
            title: patch.title.unwrap_or_else(|| existing.title.clone()),
            folder: patch.folder.unwrap_or_else(|| existing.folder.clone()),
            archived: patch.archived.unwrap_or(existing.archived),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        }
    }
}

impl OwnedEntityCodec for NoteCodec {
    fn owner_id(entity: &Note) -> &str {
        &entity.owner_id
    }
}

// ── Note indexing ────────────────────────────────────────────────

fn score(note: &Note) -> f64 {
    note.created_at.timestamp_millis() as f64
}

/// Global index on `folder`, owner-scoped index on `archived`.
pub struct NoteIndexes;

impl IndexHooks<Note> for NoteIndexes {
    fn update_indexes(&self, batch: &mut Pipeline, keys: &KeySpace, new: &Note, old: Option<&Note>) {
        if let Some(old) = old {
            if old.folder != new.folder {
                batch.zrem(keys.index("folder", &old.folder), &new.id);
            }
        }
        batch.zadd(keys.index("folder", &new.folder), score(new), &new.id);
    }

    fn remove_from_indexes(&self, batch: &mut Pipeline, keys: &KeySpace, entity: &Note) {
        batch.zrem(keys.index("folder", &entity.folder), &entity.id);
    }
}

impl OwnerIndexHooks<Note> for NoteIndexes {
    fn update_owner_indexes(
        &self,
        batch: &mut Pipeline,
        keys: &KeySpace,
        new: &Note,
        old: Option<&Note>,
    ) {
        if let Some(old) = old {
            if old.archived != new.archived {
                batch.zrem(
                    keys.owner_index(&new.owner_id, "archived", &old.archived.to_string()),
                    &new.id,
                );
            }
        }
        batch.zadd(
            keys.owner_index(&new.owner_id, "archived", &new.archived.to_string()),
            score(new),
            &new.id,
        );
    }

    fn remove_owner_entity_indexes(&self, batch: &mut Pipeline, keys: &KeySpace, entity: &Note) {
        batch.zrem(
            keys.owner_index(&entity.owner_id, "archived", &entity.archived.to_string()),
            &entity.id,
        );
    }

    fn remove_owner_indexes(&self, batch: &mut Pipeline, keys: &KeySpace, owner: &str) {
        batch.del(keys.owner_index(owner, "archived", "true"));
        batch.del(keys.owner_index(owner, "archived", "false"));
    }
}

// ── Recording / fault-injecting store ────────────────────────────

/// Wraps a [`MemoryStore`], logging every pipelined command and failing
/// the ones whose key was marked with [`RecordingStore::fail_key`].
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    commands: Mutex<Vec<Command>>,
    fail_keys: Mutex<HashSet<String>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pipelined command targeting `key` will report a failure.
    pub fn fail_key(&self, key: &str) {
        self.fail_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn command_count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub fn clear_log(&self) {
        self.commands.lock().unwrap().clear();
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, expiry_secs: Option<u64>) -> StoreResult<()> {
        self.inner.set(key, value, expiry_secs).await
    }

    async fn del(&self, key: &str) -> StoreResult<i64> {
        self.inner.del(key).await
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.inner.exists(key).await
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.inner.hget(key, field).await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<i64> {
        self.inner.hset(key, field, value).await
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<i64> {
        self.inner.hdel(key, field).await
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        self.inner.hgetall(key).await
    }

    async fn hset_all(&self, key: &str, data: HashMap<String, String>) -> StoreResult<()> {
        self.inner.hset_all(key, data).await
    }

    async fn zadd(&self, key: &str, score: f64, member: &str) -> StoreResult<i64> {
        self.inner.zadd(key, score, member).await
    }

    async fn zrem(&self, key: &str, member: &str) -> StoreResult<i64> {
        self.inner.zrem(key, member).await
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        self.inner.zrange(key, start, stop).await
    }

    async fn zrevrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        self.inner.zrevrange(key, start, stop).await
    }

    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> StoreResult<Vec<String>> {
        self.inner.zrange_by_score(key, min, max).await
    }

    async fn zcard(&self, key: &str) -> StoreResult<u64> {
        self.inner.zcard(key).await
    }

    async fn exec(&self, pipeline: Pipeline) -> StoreResult<Vec<CommandOutcome>> {
        let mut outcomes = Vec::new();
        for command in pipeline.into_commands() {
            self.commands.lock().unwrap().push(command.clone());
            if self.fail_keys.lock().unwrap().contains(command.key()) {
                outcomes.push(Err(StoreError::Command("simulated failure".to_string())));
                continue;
            }
            let mut single = Pipeline::new();
            single.push(command);
            let mut executed = self.inner.exec(single).await?;
            outcomes.push(executed.remove(0));
        }
        Ok(outcomes)
    }
}
