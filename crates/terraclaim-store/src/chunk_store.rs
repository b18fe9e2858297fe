//! The [`ChunkStore`] trait: the engine's only view of persistence.
//!
//! Methods return `impl Future + Send` rather than using `async fn` in the
//! trait declaration so that generic engine code can spawn work onto the
//! background pool without naming unspeakable future types.
//!
//! The durable cost-cache methods are keyed by (chunk, player); fingerprint
//! and age validity are judged by the caller against the stored
//! [`CachedCostEntry`], so a settings change invalidates old rows without
//! any explicit eviction.

use std::future::Future;

use chrono::TimeDelta;
use terraclaim_types::{BaseValue, CachedCostEntry, ChunkKey, GroupId, PlayerId};

use crate::error::StoreError;

/// Key-value persistence surface required by the unlock-cost engine.
///
/// Implementations must serialize writes per connection but tolerate
/// concurrent readers; every engine write is idempotent, so concurrent
/// overwrites of the same key are always safe.
pub trait ChunkStore: Send + Sync {
    /// Whether the chunk is currently unlocked.
    fn is_unlocked(
        &self,
        chunk: &ChunkKey,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Set the chunk's lock state.
    fn set_unlocked(
        &self,
        chunk: &ChunkKey,
        unlocked: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// The stored base value, or `None` when no scan has completed yet.
    fn base_value(
        &self,
        chunk: &ChunkKey,
    ) -> impl Future<Output = Result<Option<BaseValue>, StoreError>> + Send;

    /// Persist a base value (normally once per chunk, or on forced
    /// recompute).
    fn set_base_value(
        &self,
        chunk: &ChunkKey,
        value: BaseValue,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// The group that owns the chunk, if any.
    fn owner(
        &self,
        chunk: &ChunkKey,
    ) -> impl Future<Output = Result<Option<GroupId>, StoreError>> + Send;

    /// Set or clear the chunk's owner.
    fn set_owner(
        &self,
        chunk: &ChunkKey,
        owner: Option<GroupId>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Every chunk key owned by the group (used by the resource scanner).
    fn chunks_owned_by(
        &self,
        group: GroupId,
    ) -> impl Future<Output = Result<Vec<ChunkKey>, StoreError>> + Send;

    /// How many chunks the group has unlocked (progression input).
    fn unlocked_count(
        &self,
        group: GroupId,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// The durable cost-cache row for (chunk, player), if one exists.
    fn cached_cost(
        &self,
        chunk: &ChunkKey,
        player: PlayerId,
    ) -> impl Future<Output = Result<Option<CachedCostEntry>, StoreError>> + Send;

    /// Write (or overwrite) the durable cost-cache row for (chunk, player).
    fn put_cached_cost(
        &self,
        chunk: &ChunkKey,
        player: PlayerId,
        entry: &CachedCostEntry,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete cost-cache rows older than the given age; returns how many
    /// were removed. Periodic maintenance, not correctness-critical.
    fn purge_cached_costs(
        &self,
        older_than: TimeDelta,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Shared handles are stores too: the engine consumes its store by value,
/// and embedders routinely need to keep a second handle.
impl<T: ChunkStore> ChunkStore for std::sync::Arc<T> {
    fn is_unlocked(
        &self,
        chunk: &ChunkKey,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send {
        self.as_ref().is_unlocked(chunk)
    }

    fn set_unlocked(
        &self,
        chunk: &ChunkKey,
        unlocked: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.as_ref().set_unlocked(chunk, unlocked)
    }

    fn base_value(
        &self,
        chunk: &ChunkKey,
    ) -> impl Future<Output = Result<Option<BaseValue>, StoreError>> + Send {
        self.as_ref().base_value(chunk)
    }

    fn set_base_value(
        &self,
        chunk: &ChunkKey,
        value: BaseValue,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.as_ref().set_base_value(chunk, value)
    }

    fn owner(
        &self,
        chunk: &ChunkKey,
    ) -> impl Future<Output = Result<Option<GroupId>, StoreError>> + Send {
        self.as_ref().owner(chunk)
    }

    fn set_owner(
        &self,
        chunk: &ChunkKey,
        owner: Option<GroupId>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.as_ref().set_owner(chunk, owner)
    }

    fn chunks_owned_by(
        &self,
        group: GroupId,
    ) -> impl Future<Output = Result<Vec<ChunkKey>, StoreError>> + Send {
        self.as_ref().chunks_owned_by(group)
    }

    fn unlocked_count(
        &self,
        group: GroupId,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send {
        self.as_ref().unlocked_count(group)
    }

    fn cached_cost(
        &self,
        chunk: &ChunkKey,
        player: PlayerId,
    ) -> impl Future<Output = Result<Option<CachedCostEntry>, StoreError>> + Send {
        self.as_ref().cached_cost(chunk, player)
    }

    fn put_cached_cost(
        &self,
        chunk: &ChunkKey,
        player: PlayerId,
        entry: &CachedCostEntry,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.as_ref().put_cached_cost(chunk, player, entry)
    }

    fn purge_cached_costs(
        &self,
        older_than: TimeDelta,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send {
        self.as_ref().purge_cached_costs(older_than)
    }
}
