//! In-process [`ChunkStore`] backed by `RwLock`-guarded maps.
//!
//! Used by the engine's unit tests and by embeddable deployments that do
//! not want a database. All operations are infallible; the async surface
//! exists only to satisfy the trait.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{TimeDelta, Utc};
use terraclaim_types::{BaseValue, CachedCostEntry, ChunkKey, GroupId, PlayerId};

use crate::chunk_store::ChunkStore;
use crate::error::StoreError;

/// Mutable state behind the lock.
#[derive(Debug, Default)]
struct Inner {
    /// Chunks currently unlocked.
    unlocked: HashSet<ChunkKey>,
    /// Persisted base values.
    base_values: HashMap<ChunkKey, BaseValue>,
    /// Chunk ownership.
    owners: HashMap<ChunkKey, GroupId>,
    /// Durable-tier cost cache rows.
    costs: HashMap<(ChunkKey, PlayerId), CachedCostEntry>,
}

/// An in-memory chunk store.
///
/// Clone-cheap via interior sharing is deliberately *not* provided; wrap in
/// `Arc` like any other store implementation.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    inner: RwLock<Inner>,
}

impl MemoryChunkStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read guard, tolerating poisoning (state stays usable after a
    /// panicked writer in test code).
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write guard, tolerating poisoning.
    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChunkStore for MemoryChunkStore {
    async fn is_unlocked(&self, chunk: &ChunkKey) -> Result<bool, StoreError> {
        Ok(self.read().unlocked.contains(chunk))
    }

    async fn set_unlocked(&self, chunk: &ChunkKey, unlocked: bool) -> Result<(), StoreError> {
        let mut inner = self.write();
        if unlocked {
            inner.unlocked.insert(chunk.clone());
        } else {
            inner.unlocked.remove(chunk);
        }
        Ok(())
    }

    async fn base_value(&self, chunk: &ChunkKey) -> Result<Option<BaseValue>, StoreError> {
        Ok(self.read().base_values.get(chunk).copied())
    }

    async fn set_base_value(&self, chunk: &ChunkKey, value: BaseValue) -> Result<(), StoreError> {
        self.write().base_values.insert(chunk.clone(), value);
        Ok(())
    }

    async fn owner(&self, chunk: &ChunkKey) -> Result<Option<GroupId>, StoreError> {
        Ok(self.read().owners.get(chunk).copied())
    }

    async fn set_owner(&self, chunk: &ChunkKey, owner: Option<GroupId>) -> Result<(), StoreError> {
        let mut inner = self.write();
        match owner {
            Some(group) => {
                inner.owners.insert(chunk.clone(), group);
            }
            None => {
                inner.owners.remove(chunk);
            }
        }
        Ok(())
    }

    async fn chunks_owned_by(&self, group: GroupId) -> Result<Vec<ChunkKey>, StoreError> {
        let inner = self.read();
        let mut chunks: Vec<ChunkKey> = inner
            .owners
            .iter()
            .filter(|(_, g)| **g == group)
            .map(|(k, _)| k.clone())
            .collect();
        chunks.sort();
        Ok(chunks)
    }

    async fn unlocked_count(&self, group: GroupId) -> Result<u64, StoreError> {
        let inner = self.read();
        let count = inner
            .owners
            .iter()
            .filter(|(chunk, g)| **g == group && inner.unlocked.contains(chunk))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn cached_cost(
        &self,
        chunk: &ChunkKey,
        player: PlayerId,
    ) -> Result<Option<CachedCostEntry>, StoreError> {
        Ok(self.read().costs.get(&(chunk.clone(), player)).cloned())
    }

    async fn put_cached_cost(
        &self,
        chunk: &ChunkKey,
        player: PlayerId,
        entry: &CachedCostEntry,
    ) -> Result<(), StoreError> {
        self.write()
            .costs
            .insert((chunk.clone(), player), entry.clone());
        Ok(())
    }

    async fn purge_cached_costs(&self, older_than: TimeDelta) -> Result<u64, StoreError> {
        let cutoff = Utc::now() - older_than;
        let mut inner = self.write();
        let before = inner.costs.len();
        inner.costs.retain(|_, entry| entry.computed_at >= cutoff);
        let removed = before.saturating_sub(inner.costs.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
