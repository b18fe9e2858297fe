//! Two-tier cost cache: process memory in front of the durable store.
//!
//! Reads probe memory first, then the store; a durable hit is promoted
//! into memory. Writes go through both tiers. Each tier judges validity
//! itself via [`CachedCostEntry::is_valid`], so a settings change (new
//! fingerprint) makes every old entry a transparent miss in both tiers
//! with no eviction sweep.
//!
//! The durable tier is best-effort on the hot path: a store failure
//! during read-through or write-through is logged and absorbed, because
//! a price can always be recomputed. Only explicit maintenance
//! ([`CostCache::purge_durable`]) surfaces store errors.

use std::collections::HashMap;
use std::sync::PoisonError;
use std::sync::RwLock;

use chrono::{TimeDelta, Utc};
use terraclaim_store::ChunkStore;
use terraclaim_types::{CachedCostEntry, ChunkKey, PlayerId};

use crate::error::EngineError;

type MemoryKey = (ChunkKey, PlayerId);

/// The two-tier cost cache.
#[derive(Default)]
pub struct CostCache {
    memory: RwLock<HashMap<MemoryKey, CachedCostEntry>>,
}

impl CostCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe the memory tier only. Synchronous: this is the fast path the
    /// orchestrator's non-blocking lookup uses.
    pub fn memory_probe(
        &self,
        chunk: &ChunkKey,
        player: PlayerId,
        config_hash: u64,
        ttl: TimeDelta,
    ) -> Option<CachedCostEntry> {
        let memory = self.memory.read().unwrap_or_else(PoisonError::into_inner);
        let entry = memory.get(&(chunk.clone(), player))?;
        entry
            .is_valid(config_hash, ttl, Utc::now())
            .then(|| entry.clone())
    }

    /// Probe memory, then the durable tier, promoting a durable hit.
    pub async fn read_through<S: ChunkStore>(
        &self,
        store: &S,
        chunk: &ChunkKey,
        player: PlayerId,
        config_hash: u64,
        memory_ttl: TimeDelta,
        durable_ttl: TimeDelta,
    ) -> Option<CachedCostEntry> {
        if let Some(entry) = self.memory_probe(chunk, player, config_hash, memory_ttl) {
            tracing::trace!(%chunk, %player, "cost cache memory hit");
            return Some(entry);
        }

        let row = match store.cached_cost(chunk, player).await {
            Ok(row) => row,
            Err(error) => {
                tracing::warn!(%chunk, %player, %error, "durable cost read failed");
                return None;
            }
        };

        let entry = row?;
        if !entry.is_valid(config_hash, durable_ttl, Utc::now()) {
            return None;
        }
        tracing::trace!(%chunk, %player, "cost cache durable hit");
        self.insert_memory(chunk, player, entry.clone());
        Some(entry)
    }

    /// Write an entry through both tiers.
    pub async fn write_through<S: ChunkStore>(
        &self,
        store: &S,
        chunk: &ChunkKey,
        player: PlayerId,
        entry: CachedCostEntry,
    ) {
        if let Err(error) = store.put_cached_cost(chunk, player, &entry).await {
            tracing::warn!(%chunk, %player, %error, "durable cost write failed");
        }
        self.insert_memory(chunk, player, entry);
    }

    /// Drop every memory-tier entry. Durable rows age out on their own.
    pub fn clear_memory(&self) {
        self.memory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Delete durable rows older than the given age.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the deletion fails; maintenance
    /// callers want to know.
    pub async fn purge_durable<S: ChunkStore>(
        &self,
        store: &S,
        older_than: TimeDelta,
    ) -> Result<u64, EngineError> {
        let removed = store.purge_cached_costs(older_than).await?;
        if removed > 0 {
            tracing::info!(removed, "purged stale durable cost rows");
        }
        Ok(removed)
    }

    fn insert_memory(&self, chunk: &ChunkKey, player: PlayerId, entry: CachedCostEntry) {
        self.memory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((chunk.clone(), player), entry);
    }
}

#[cfg(test)]
mod tests {
    use terraclaim_store::MemoryChunkStore;
    use terraclaim_types::PaymentRequirement;

    use super::*;

    const HASH: u64 = 0xFEED;
    const MEMORY_TTL: TimeDelta = TimeDelta::minutes(5);
    const DURABLE_TTL: TimeDelta = TimeDelta::hours(1);

    fn chunk() -> ChunkKey {
        ChunkKey::new("overworld", 4, 4)
    }

    #[tokio::test]
    async fn write_through_hits_both_tiers() {
        let cache = CostCache::new();
        let store = MemoryChunkStore::new();
        let player = PlayerId::new();
        let entry = CachedCostEntry::new(PaymentRequirement::currency(80.0), HASH);

        cache.write_through(&store, &chunk(), player, entry.clone()).await;

        assert!(cache.memory_probe(&chunk(), player, HASH, MEMORY_TTL).is_some());
        let durable = store.cached_cost(&chunk(), player).await.ok().flatten();
        assert_eq!(durable.map(|e| e.requirement), Some(entry.requirement));
    }

    #[tokio::test]
    async fn durable_hit_is_promoted_to_memory() {
        let cache = CostCache::new();
        let store = MemoryChunkStore::new();
        let player = PlayerId::new();
        let entry = CachedCostEntry::new(PaymentRequirement::currency(42.0), HASH);
        store.put_cached_cost(&chunk(), player, &entry).await.ok();

        assert!(cache.memory_probe(&chunk(), player, HASH, MEMORY_TTL).is_none());
        let read = cache
            .read_through(&store, &chunk(), player, HASH, MEMORY_TTL, DURABLE_TTL)
            .await;
        assert!(read.is_some());
        // Promoted: the next probe answers from memory alone.
        assert!(cache.memory_probe(&chunk(), player, HASH, MEMORY_TTL).is_some());
    }

    #[tokio::test]
    async fn fingerprint_mismatch_misses_in_both_tiers() {
        let cache = CostCache::new();
        let store = MemoryChunkStore::new();
        let player = PlayerId::new();
        let entry = CachedCostEntry::new(PaymentRequirement::currency(42.0), HASH);
        cache.write_through(&store, &chunk(), player, entry).await;

        let stale = cache
            .read_through(&store, &chunk(), player, HASH ^ 1, MEMORY_TTL, DURABLE_TTL)
            .await;
        assert!(stale.is_none());
    }

    #[tokio::test]
    async fn aged_out_entries_are_misses() {
        let cache = CostCache::new();
        let store = MemoryChunkStore::new();
        let player = PlayerId::new();
        let mut entry = CachedCostEntry::new(PaymentRequirement::currency(9.0), HASH);
        entry.computed_at = Utc::now() - TimeDelta::hours(2);
        cache.write_through(&store, &chunk(), player, entry).await;

        assert!(cache.memory_probe(&chunk(), player, HASH, MEMORY_TTL).is_none());
        let read = cache
            .read_through(&store, &chunk(), player, HASH, MEMORY_TTL, DURABLE_TTL)
            .await;
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn purge_reports_removed_rows() {
        let cache = CostCache::new();
        let store = MemoryChunkStore::new();
        let player = PlayerId::new();
        let mut old = CachedCostEntry::new(PaymentRequirement::currency(1.0), HASH);
        old.computed_at = Utc::now() - TimeDelta::hours(30);
        store.put_cached_cost(&chunk(), player, &old).await.ok();

        let removed = cache.purge_durable(&store, TimeDelta::hours(24)).await;
        assert_eq!(removed.ok(), Some(1));
    }
}
