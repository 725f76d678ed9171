//! In-memory repository adapter.
//!
//! Implements the same [`Repository`] / [`OwnerRepository`] contracts over
//! a plain vector, for consumer tests that don't care about key layouts or
//! pipelines. Never wired into store-backed paths.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::codec::{EntityCodec, OwnedEntityCodec};
use crate::error::RepoResult;
use crate::pagination::{Page, PageRequest};
use crate::repository::Repository;
use crate::scoped::OwnerRepository;

/// Vector-backed [`Repository`] implementation for tests.
pub struct InMemoryRepository<C: EntityCodec> {
    records: RwLock<Vec<C::Entity>>,
}

impl<C: EntityCodec> InMemoryRepository<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Records ordered oldest-first, the way list scores order them.
    fn chronological(&self) -> Vec<C::Entity> {
        let mut records = self.records.read().unwrap().clone();
        records.sort_by_key(|e| (C::created_at(e).timestamp_millis(), C::id(e).to_string()));
        records
    }
}

impl<C: EntityCodec> Default for InMemoryRepository<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C: EntityCodec> Repository<C> for InMemoryRepository<C> {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<C::Entity>> {
        let records = self.records.read().unwrap();
        Ok(records.iter().find(|e| C::id(e) == id).cloned())
    }

    async fn find_all(&self) -> RepoResult<Vec<C::Entity>> {
        Ok(self.chronological())
    }

    async fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<C::Entity>> {
        let records = self.records.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| records.iter().find(|e| C::id(e) == id).cloned())
            .collect())
    }

    async fn create(&self, draft: C::Draft) -> RepoResult<C::Entity> {
        let entity = C::from_draft(draft);
        self.records.write().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: &str, patch: C::Patch) -> RepoResult<Option<C::Entity>> {
        let mut records = self.records.write().unwrap();
        let Some(slot) = records.iter_mut().find(|e| C::id(e) == id) else {
            return Ok(None);
        };
        let updated = C::apply_patch(slot, patch);
        *slot = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|e| C::id(e) != id);
        Ok(records.len() < before)
    }

    async fn exists(&self, id: &str) -> RepoResult<bool> {
        let records = self.records.read().unwrap();
        Ok(records.iter().any(|e| C::id(e) == id))
    }

    async fn find_paginated(&self, request: PageRequest) -> RepoResult<Page<C::Entity>> {
        let page = request.page.max(1);
        let limit = request.limit;

        let mut records = self.chronological();
        records.reverse();
        let total = records.len() as u64;

        let offset = ((page - 1) * limit) as usize;
        let items = records
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect();

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

#[async_trait]
impl<C: OwnedEntityCodec> OwnerRepository<C> for InMemoryRepository<C> {
    async fn find_by_owner(&self, owner: &str) -> RepoResult<Vec<C::Entity>> {
        let mut records: Vec<C::Entity> = self
            .chronological()
            .into_iter()
            .filter(|e| C::owner_id(e) == owner)
            .collect();
        records.reverse();
        Ok(records)
    }

    async fn find_by_owner_and_id(&self, owner: &str, id: &str) -> RepoResult<Option<C::Entity>> {
        let entity = self.find_by_id(id).await?;
        Ok(entity.filter(|e| C::owner_id(e) == owner))
    }

    async fn delete_all_by_owner(&self, owner: &str) -> RepoResult<bool> {
        self.records
            .write()
            .unwrap()
            .retain(|e| C::owner_id(e) != owner);
        Ok(true)
    }

    async fn count_by_owner(&self, owner: &str) -> RepoResult<u64> {
        let records = self.records.read().unwrap();
        Ok(records.iter().filter(|e| C::owner_id(e) == owner).count() as u64)
    }

    async fn find_by_owner_and_date_range(
        &self,
        owner: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<C::Entity>> {
        Ok(self
            .chronological()
            .into_iter()
            .filter(|e| {
                C::owner_id(e) == owner && C::created_at(e) >= start && C::created_at(e) <= end
            })
            .collect())
    }
}
