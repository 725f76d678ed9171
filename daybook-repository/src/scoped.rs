//! Owner-scoped repository composition.
//!
//! Layers per-owner listing and indexing on top of [`EntityRepository`]
//! without subclassing: the owner layer is itself an [`IndexHooks`]
//! strategy wrapped around the domain's [`OwnerIndexHooks`], so owner-list
//! maintenance rides in the same pipeline as every primary write.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daybook_store::{KeyBuilder, KeySpace, Pipeline, Store};
use tracing::warn;

use crate::codec::OwnedEntityCodec;
use crate::error::RepoResult;
use crate::hooks::{IndexHooks, NoIndexes, OwnerIndexHooks};
use crate::pagination::{Page, PageRequest};
use crate::repository::{creation_score, warn_on_partial, EntityRepository, Repository};

/// Per-owner queries over an owner-scoped entity kind.
#[async_trait]
pub trait OwnerRepository<C: OwnedEntityCodec>: Repository<C> {
    /// One owner's entities, newest first.
    async fn find_by_owner(&self, owner: &str) -> RepoResult<Vec<C::Entity>>;

    /// Ownership-checked lookup: `None` when the entity is absent **or**
    /// belongs to someone else. Callers never re-check ownership.
    async fn find_by_owner_and_id(&self, owner: &str, id: &str) -> RepoResult<Option<C::Entity>>;

    /// Removes everything one owner has.
    ///
    /// Idempotent: an owner with no entities is `Ok(true)` and issues no
    /// commands. Otherwise reports `true` when at least one command of the
    /// batch succeeded.
    async fn delete_all_by_owner(&self, owner: &str) -> RepoResult<bool>;

    /// Number of entities one owner has.
    async fn count_by_owner(&self, owner: &str) -> RepoResult<u64>;

    /// One owner's entities created within `[start, end]`, oldest first.
    async fn find_by_owner_and_date_range(
        &self,
        owner: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<C::Entity>>;
}

/// The owner layer: maintains the owner list and delegates to the domain's
/// hooks on both the global and owner-scoped sides.
struct OwnerLayer<C: OwnedEntityCodec> {
    hooks: Arc<dyn OwnerIndexHooks<C::Entity>>,
    _codec: PhantomData<fn() -> C>,
}

impl<C: OwnedEntityCodec> IndexHooks<C::Entity> for OwnerLayer<C> {
    fn update_indexes(
        &self,
        batch: &mut Pipeline,
        keys: &KeySpace,
        new: &C::Entity,
        old: Option<&C::Entity>,
    ) {
        self.hooks.update_indexes(batch, keys, new, old);

        // Owner membership is re-asserted on every write with the immutable
        // creation score, so a lost list entry heals on the next update.
        batch.zadd(
            keys.owner_list(C::owner_id(new)),
            creation_score(C::created_at(new)),
            C::id(new),
        );

        self.hooks.update_owner_indexes(batch, keys, new, old);
    }

    fn remove_from_indexes(&self, batch: &mut Pipeline, keys: &KeySpace, entity: &C::Entity) {
        self.hooks.remove_from_indexes(batch, keys, entity);
        batch.zrem(keys.owner_list(C::owner_id(entity)), C::id(entity));
        self.hooks.remove_owner_entity_indexes(batch, keys, entity);
    }
}

/// Store-backed [`OwnerRepository`] implementation.
pub struct OwnerEntityRepository<C: OwnedEntityCodec, S: Store> {
    base: EntityRepository<C, S>,
    store: Arc<S>,
    keys: KeySpace,
    hooks: Arc<dyn OwnerIndexHooks<C::Entity>>,
}

impl<C: OwnedEntityCodec, S: Store> OwnerEntityRepository<C, S> {
    /// Creates a repository with no secondary indexes beyond the owner list.
    #[must_use]
    pub fn new(store: Arc<S>, keys: &KeyBuilder) -> Self {
        Self::with_hooks(store, keys, Arc::new(NoIndexes))
    }

    /// Creates a repository with the given owner-aware index strategy.
    #[must_use]
    pub fn with_hooks(
        store: Arc<S>,
        keys: &KeyBuilder,
        hooks: Arc<dyn OwnerIndexHooks<C::Entity>>,
    ) -> Self {
        let layer: Arc<dyn IndexHooks<C::Entity>> = Arc::new(OwnerLayer::<C> {
            hooks: hooks.clone(),
            _codec: PhantomData,
        });
        Self {
            base: EntityRepository::with_hooks(store.clone(), keys, layer),
            store,
            keys: keys.namespace(C::KIND),
            hooks,
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
}

#[async_trait]
impl<C: OwnedEntityCodec, S: Store> Repository<C> for OwnerEntityRepository<C, S> {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<C::Entity>> {
        self.base.find_by_id(id).await
    }

    async fn find_all(&self) -> RepoResult<Vec<C::Entity>> {
        self.base.find_all().await
    }

    async fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<C::Entity>> {
        self.base.find_by_ids(ids).await
    }

    async fn create(&self, draft: C::Draft) -> RepoResult<C::Entity> {
        self.base.create(draft).await
    }

    async fn update(&self, id: &str, patch: C::Patch) -> RepoResult<Option<C::Entity>> {
        self.base.update(id, patch).await
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }

    async fn exists(&self, id: &str) -> RepoResult<bool> {
        self.base.exists(id).await
    }

    async fn find_paginated(&self, request: PageRequest) -> RepoResult<Page<C::Entity>> {
        self.base.find_paginated(request).await
    }
}

#[async_trait]
impl<C: OwnedEntityCodec, S: Store> OwnerRepository<C> for OwnerEntityRepository<C, S> {
    async fn find_by_owner(&self, owner: &str) -> RepoResult<Vec<C::Entity>> {
        let ids = self.store.zrevrange(&self.keys.owner_list(owner), 0, -1).await?;
        self.base.find_by_ids(&ids).await
    }

    async fn find_by_owner_and_id(&self, owner: &str, id: &str) -> RepoResult<Option<C::Entity>> {
        let entity = self.base.find_by_id(id).await?;
        Ok(entity.filter(|e| C::owner_id(e) == owner))
    }

    async fn delete_all_by_owner(&self, owner: &str) -> RepoResult<bool> {
        let ids = self.store.zrange(&self.keys.owner_list(owner), 0, -1).await?;
        if ids.is_empty() {
            return Ok(true);
        }

        // Fetch what is being deleted so value-keyed index entries can be
        // cleaned exactly; undecodable records still lose their hash and
        // list entries below.
        let entities = self.base.find_by_ids(&ids).await?;
        if entities.len() < ids.len() {
            warn!(
                kind = self.keys.kind(),
                owner,
                missing = ids.len() - entities.len(),
                "owner list entries without readable records during bulk delete"
            );
        }

        let mut batch = Pipeline::new();
        for id in &ids {
            batch.del(self.keys.primary(id));
        }
        batch.del(self.keys.owner_list(owner));
        for id in &ids {
            batch.zrem(self.keys.list(), id);
        }
        for entity in &entities {
            self.hooks.remove_from_indexes(&mut batch, &self.keys, entity);
            self.hooks
                .remove_owner_entity_indexes(&mut batch, &self.keys, entity);
        }
        self.hooks.remove_owner_indexes(&mut batch, &self.keys, owner);

        let outcomes = self.store.exec(batch).await?;
        warn_on_partial(&outcomes, self.keys.kind(), "delete_all_by_owner");
        Ok(outcomes.iter().any(|outcome| outcome.is_ok()))
    }

    async fn count_by_owner(&self, owner: &str) -> RepoResult<u64> {
        Ok(self.store.zcard(&self.keys.owner_list(owner)).await?)
    }

    async fn find_by_owner_and_date_range(
        &self,
        owner: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<C::Entity>> {
        let ids = self
            .store
            .zrange_by_score(
                &self.keys.owner_list(owner),
                creation_score(start),
                creation_score(end),
            )
            .await?;
        self.base.find_by_ids(&ids).await
    }
}
