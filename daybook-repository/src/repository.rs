//! The generic store-backed repository.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daybook_store::{CommandOutcome, KeyBuilder, KeySpace, Pipeline, Reply, Store};
use tracing::warn;

use crate::codec::EntityCodec;
use crate::error::RepoResult;
use crate::hooks::{IndexHooks, NoIndexes};
use crate::pagination::{Page, PageRequest};

/// Sorted-set score of an entity: its creation time in epoch milliseconds.
pub(crate) fn creation_score(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64
}

/// Logs a partial pipeline failure without failing the operation.
///
/// The store gives no rollback across a pipeline, so a mixed outcome means
/// the primary write and its index mutations may have diverged until a
/// later write heals them. That tradeoff is accepted; the log line is the
/// reconciliation trail.
pub(crate) fn warn_on_partial(outcomes: &[CommandOutcome], kind: &str, op: &str) {
    let failed = outcomes.iter().filter(|outcome| outcome.is_err()).count();
    if failed > 0 {
        warn!(
            kind,
            op,
            failed,
            total = outcomes.len(),
            "pipeline completed with failed commands"
        );
    }
}

/// Primary CRUD, listing, and pagination for one entity kind.
///
/// Absence is a value (`None` / `false`), not an error; an `Err` always
/// means the store itself failed.
#[async_trait]
pub trait Repository<C: EntityCodec>: Send + Sync {
    /// Looks up one entity by id.
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<C::Entity>>;

    /// All entities of this kind, oldest first.
    async fn find_all(&self) -> RepoResult<Vec<C::Entity>>;

    /// Batch lookup preserving input order.
    ///
    /// Best effort: ids whose read failed, returned nothing, or decoded to
    /// garbage are dropped from the result rather than failing the call.
    async fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<C::Entity>>;

    /// Persists a new entity built from the draft.
    async fn create(&self, draft: C::Draft) -> RepoResult<C::Entity>;

    /// Merges a patch over the stored entity; `None` when the id is absent.
    async fn update(&self, id: &str, patch: C::Patch) -> RepoResult<Option<C::Entity>>;

    /// Removes an entity; `false` when the id was already absent.
    async fn delete(&self, id: &str) -> RepoResult<bool>;

    /// Whether the entity's hash record exists.
    async fn exists(&self, id: &str) -> RepoResult<bool>;

    /// One page of entities, newest first.
    async fn find_paginated(&self, request: PageRequest) -> RepoResult<Page<C::Entity>>;
}

/// Store-backed [`Repository`] implementation.
///
/// Holds the key space for its kind and an [`IndexHooks`] strategy whose
/// mutations are queued into the same pipeline as the primary write.
pub struct EntityRepository<C: EntityCodec, S: Store> {
    store: Arc<S>,
    keys: KeySpace,
    hooks: Arc<dyn IndexHooks<C::Entity>>,
    _codec: PhantomData<fn() -> C>,
}

impl<C: EntityCodec, S: Store> EntityRepository<C, S> {
    /// Creates a repository with no secondary indexes.
    #[must_use]
    pub fn new(store: Arc<S>, keys: &KeyBuilder) -> Self {
        Self::with_hooks(store, keys, Arc::new(NoIndexes))
    }

    /// Creates a repository with the given index strategy.
    #[must_use]
    pub fn with_hooks(
        store: Arc<S>,
        keys: &KeyBuilder,
        hooks: Arc<dyn IndexHooks<C::Entity>>,
    ) -> Self {
        Self {
            store,
            keys: keys.namespace(C::KIND),
            hooks,
            _codec: PhantomData,
        }
    }

    /// The key space of this repository's kind.
    #[must_use]
    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// The underlying store, for kind-specific queries built on top.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn decode(&self, record: &HashMap<String, String>) -> Option<C::Entity> {
        match C::decode(record) {
            Ok(entity) => Some(entity),
            Err(error) => {
                warn!(kind = self.keys.kind(), %error, "dropping undecodable record");
                None
            }
        }
    }
}

#[async_trait]
impl<C: EntityCodec, S: Store> Repository<C> for EntityRepository<C, S> {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<C::Entity>> {
        let record = self.store.hgetall(&self.keys.primary(id)).await?;
        if record.is_empty() {
            return Ok(None);
        }
        Ok(self.decode(&record))
    }

    async fn find_all(&self) -> RepoResult<Vec<C::Entity>> {
        let ids = self.store.zrange(&self.keys.list(), 0, -1).await?;
        self.find_by_ids(&ids).await
    }

    async fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<C::Entity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch = Pipeline::new();
        for id in ids {
            batch.hgetall(self.keys.primary(id));
        }
        let outcomes = self.store.exec(batch).await?;

        let mut entities = Vec::with_capacity(ids.len());
        for (id, outcome) in ids.iter().zip(outcomes) {
            match outcome {
                Ok(reply) => {
                    if let Some(record) = reply.into_map() {
                        if !record.is_empty() {
                            if let Some(entity) = self.decode(&record) {
                                entities.push(entity);
                            }
                        }
                    }
                }
                Err(error) => {
                    warn!(kind = self.keys.kind(), id = %id, %error, "skipping failed batch read");
                }
            }
        }
        Ok(entities)
    }

    async fn create(&self, draft: C::Draft) -> RepoResult<C::Entity> {
        let entity = C::from_draft(draft);
        let id = C::id(&entity).to_string();

        let mut batch = Pipeline::new();
        batch.hset_all(self.keys.primary(&id), C::encode(&entity));
        batch.zadd(self.keys.list(), creation_score(C::created_at(&entity)), &id);
        self.hooks.update_indexes(&mut batch, &self.keys, &entity, None);

        let outcomes = self.store.exec(batch).await?;
        warn_on_partial(&outcomes, self.keys.kind(), "create");
        Ok(entity)
    }

    async fn update(&self, id: &str, patch: C::Patch) -> RepoResult<Option<C::Entity>> {
        let record = self.store.hgetall(&self.keys.primary(id)).await?;
        if record.is_empty() {
            return Ok(None);
        }
        let Some(existing) = self.decode(&record) else {
            return Ok(None);
        };

        let updated = C::apply_patch(&existing, patch);
        let mut batch = Pipeline::new();
        batch.hset_all(self.keys.primary(id), C::encode(&updated));
        self.hooks
            .update_indexes(&mut batch, &self.keys, &updated, Some(&existing));

        let outcomes = self.store.exec(batch).await?;
        warn_on_partial(&outcomes, self.keys.kind(), "update");
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let record = self.store.hgetall(&self.keys.primary(id)).await?;
        if record.is_empty() {
            return Ok(false);
        }
        // Indexes can only be cleaned for a record we can still read.
        let existing = self.decode(&record);

        let mut batch = Pipeline::new();
        batch.del(self.keys.primary(id));
        batch.zrem(self.keys.list(), id);
        if let Some(entity) = &existing {
            self.hooks.remove_from_indexes(&mut batch, &self.keys, entity);
        }

        let outcomes = self.store.exec(batch).await?;
        warn_on_partial(&outcomes, self.keys.kind(), "delete");

        let removed = outcomes
            .first()
            .and_then(|outcome| outcome.as_ref().ok())
            .and_then(Reply::as_int)
            .unwrap_or(0);
        Ok(removed > 0)
    }

    async fn exists(&self, id: &str) -> RepoResult<bool> {
        Ok(self.store.exists(&self.keys.primary(id)).await?)
    }

    async fn find_paginated(&self, request: PageRequest) -> RepoResult<Page<C::Entity>> {
        let page = request.page.max(1);
        let limit = request.limit;

        let total = self.store.zcard(&self.keys.list()).await?;
        let offset = (page - 1) * limit;
        let ids = if limit == 0 {
            Vec::new()
        } else {
            self.store
                .zrevrange(
                    &self.keys.list(),
                    offset as i64,
                    (offset + limit - 1) as i64,
                )
                .await?
        };
        let items = self.find_by_ids(&ids).await?;

        Ok(Page {
            items,
            total,
            page,
            limit,
            has_next: page * limit < total,
            has_prev: page > 1,
        })
    }
}
