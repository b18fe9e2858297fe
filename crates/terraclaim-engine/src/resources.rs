//! Owned-territory resource scanner.
//!
//! Resource-aware pricing asks a simple question: what can this group
//! actually harvest? The scanner walks every chunk the group owns,
//! samples strided columns for tiered materials, density-scales the
//! tallies back to full-chunk estimates, and keeps the result in a
//! per-group cache for a short TTL. Unloaded chunks are skipped rather
//! than force-loaded; a group that unlocks new territory invalidates its
//! own entry.

use std::collections::HashMap;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use terraclaim_types::{GroupId, Material, ResourceEntry, ScanSummary};

use crate::config::{ResourceScanConfig, SamplingConfig};
use crate::error::EngineError;
use crate::world::WorldOracle;
use terraclaim_store::ChunkStore;

/// Blocks per chunk edge.
const CHUNK_EDGE: u8 = 16;

/// Result of one territory scan: what is harvestable, and how reliable
/// the sampling was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceScanOutcome {
    /// Harvestable materials, best tier first, then most abundant first.
    pub entries: Vec<ResourceEntry>,
    /// Sample tally across every scanned chunk.
    pub summary: ScanSummary,
    /// Owned chunks that were skipped because they were not loaded.
    pub chunks_skipped: u32,
}

impl ResourceScanOutcome {
    /// The single best payment candidate, if the territory yields anything.
    pub fn best(&self) -> Option<&ResourceEntry> {
        self.entries.first()
    }
}

struct CachedScan {
    outcome: ResourceScanOutcome,
    at: Instant,
}

/// Scans group territory for harvestable materials, caching per group.
#[derive(Default)]
pub struct ResourceScanner {
    cache: RwLock<HashMap<GroupId, CachedScan>>,
}

impl ResourceScanner {
    /// Create a scanner with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the group's territory, serving from cache within the TTL.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the owned-chunk enumeration
    /// fails; there is no meaningful resource answer without it.
    pub async fn scan<S, W>(
        &self,
        store: &S,
        world: &W,
        resources: &ResourceScanConfig,
        sampling: &SamplingConfig,
        group: GroupId,
    ) -> Result<ResourceScanOutcome, EngineError>
    where
        S: ChunkStore,
        W: WorldOracle,
    {
        let ttl = Duration::from_secs(resources.ttl_secs);
        if let Some(cached) = self.cached(group, ttl) {
            tracing::trace!(%group, "resource scan cache hit");
            return Ok(cached);
        }

        let chunks = store.chunks_owned_by(group).await?;
        let mut tally: HashMap<Material, u64> = HashMap::new();
        let mut summary = ScanSummary::default();
        let mut skipped = 0u32;

        for chunk in &chunks {
            if !world.is_loaded(chunk) {
                skipped = skipped.saturating_add(1);
                continue;
            }
            let top = world.highest_block_y(chunk).unwrap_or(sampling.max_y);
            let mut chunk_summary = ScanSummary::default();
            sample_chunk_columns(
                world,
                chunk,
                resources.horizontal_step.max(1),
                sampling.min_y,
                top.min(sampling.max_y),
                &mut tally,
                &mut chunk_summary,
            );
            summary.merge(chunk_summary);
        }

        let step = u64::from(resources.horizontal_step.max(1));
        let density = step.saturating_mul(step);

        let mut entries: Vec<ResourceEntry> = tally
            .into_iter()
            .filter_map(|(material, count)| {
                let tier = material.tier()?;
                let scaled = count.saturating_mul(density);
                (scaled >= resources.min_abundance).then_some(ResourceEntry {
                    material,
                    count: scaled,
                    tier,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.tier
                .rank()
                .cmp(&a.tier.rank())
                .then(b.count.cmp(&a.count))
                .then(a.material.as_key().cmp(b.material.as_key()))
        });

        let outcome = ResourceScanOutcome {
            entries,
            summary,
            chunks_skipped: skipped,
        };
        tracing::debug!(
            %group,
            chunks = chunks.len(),
            skipped,
            materials = outcome.entries.len(),
            "resource scan complete"
        );

        self.write().insert(
            group,
            CachedScan {
                outcome: outcome.clone(),
                at: Instant::now(),
            },
        );
        Ok(outcome)
    }

    /// Drop the cached scan for one group (territory changed).
    pub fn invalidate(&self, group: GroupId) {
        self.write().remove(&group);
    }

    /// Drop every cached scan (settings changed).
    pub fn clear(&self) {
        self.write().clear();
    }

    fn cached(&self, group: GroupId, ttl: Duration) -> Option<ResourceScanOutcome> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        let entry = cache.get(&group)?;
        (entry.at.elapsed() <= ttl).then(|| entry.outcome.clone())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<GroupId, CachedScan>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Sample every `step`-th column of a chunk from `min_y` up to `top_y`,
/// tallying tiered materials.
fn sample_chunk_columns<W: WorldOracle>(
    world: &W,
    chunk: &terraclaim_types::ChunkKey,
    step: u8,
    min_y: i32,
    top_y: i32,
    tally: &mut HashMap<Material, u64>,
    summary: &mut ScanSummary,
) {
    let mut x = 0u8;
    while x < CHUNK_EDGE {
        let mut z = 0u8;
        while z < CHUNK_EDGE {
            let mut y = min_y;
            while y <= top_y {
                match world.block_at(chunk, x, y, z) {
                    Ok(material) => {
                        summary.record_ok();
                        if material.tier().is_some() {
                            let slot = tally.entry(material).or_insert(0);
                            *slot = slot.saturating_add(1);
                        }
                    }
                    Err(error) => {
                        tracing::trace!(%chunk, x, y, z, %error, "resource sample failed");
                        summary.record_failed();
                    }
                }
                y = y.saturating_add(1);
            }
            z = z.saturating_add(step);
        }
        x = x.saturating_add(step);
    }
}

#[cfg(test)]
mod tests {
    use terraclaim_types::{ChunkKey, PlayerId, ResourceTier};
    use terraclaim_store::MemoryChunkStore;

    use super::*;
    use crate::world::{FlatWorldOracle, SoloTeamResolver, TeamResolver};

    fn sampling() -> SamplingConfig {
        SamplingConfig {
            horizontal_step: 4,
            vertical_step: 8,
            min_y: 0,
            max_y: 70,
        }
    }

    async fn owned_chunk(store: &MemoryChunkStore, group: GroupId, x: i32, z: i32) -> ChunkKey {
        let chunk = ChunkKey::new("overworld", x, z);
        store.set_owner(&chunk, Some(group)).await.ok();
        chunk
    }

    #[tokio::test]
    async fn scan_finds_tiered_materials_sorted_by_tier() {
        let store = MemoryChunkStore::new();
        let world = FlatWorldOracle::standard();
        let group = SoloTeamResolver.group_of(PlayerId::new());
        let chunk = owned_chunk(&store, group, 0, 0).await;
        world.set_chunk_layers(
            chunk,
            [
                (i32::MIN, Material::Stone),
                (30, Material::IronOre),
                (40, Material::DiamondOre),
                (45, Material::Dirt),
                (65, Material::Air),
            ],
        );

        let scanner = ResourceScanner::new();
        let outcome = scanner
            .scan(&store, &world, &ResourceScanConfig::default(), &sampling(), group)
            .await;
        assert!(outcome.is_ok());
        let outcome = outcome.unwrap_or_default();

        let best = outcome.best().copied();
        assert!(best.is_some(), "expected at least one material");
        let Some(best) = best else { return };
        assert_eq!(best.tier, ResourceTier::RareOre);
        assert_eq!(best.material, Material::DiamondOre);
    }

    #[tokio::test]
    async fn empty_territory_yields_nothing() {
        let store = MemoryChunkStore::new();
        let world = FlatWorldOracle::standard();
        let group = GroupId::new();

        let scanner = ResourceScanner::new();
        let outcome = scanner
            .scan(&store, &world, &ResourceScanConfig::default(), &sampling(), group)
            .await;
        assert!(outcome.is_ok());
        assert!(outcome.unwrap_or_default().entries.is_empty());
    }

    #[tokio::test]
    async fn unloaded_chunks_are_skipped() {
        let store = MemoryChunkStore::new();
        let world = FlatWorldOracle::standard();
        let group = GroupId::new();
        let chunk = owned_chunk(&store, group, 2, 2).await;
        world.set_unloaded(chunk);

        let scanner = ResourceScanner::new();
        let outcome = scanner
            .scan(&store, &world, &ResourceScanConfig::default(), &sampling(), group)
            .await
            .unwrap_or_default();
        assert_eq!(outcome.chunks_skipped, 1);
        assert_eq!(outcome.summary.total(), 0);
    }

    #[tokio::test]
    async fn cache_serves_within_ttl_and_invalidates_on_demand() {
        let store = MemoryChunkStore::new();
        let world = FlatWorldOracle::standard();
        let group = GroupId::new();
        owned_chunk(&store, group, 0, 0).await;

        let scanner = ResourceScanner::new();
        let config = ResourceScanConfig::default();
        let first = scanner
            .scan(&store, &world, &config, &sampling(), group)
            .await
            .unwrap_or_default();

        // New territory is invisible until the cache is invalidated.
        owned_chunk(&store, group, 1, 0).await;
        let cached = scanner
            .scan(&store, &world, &config, &sampling(), group)
            .await
            .unwrap_or_default();
        assert_eq!(first.summary, cached.summary);

        scanner.invalidate(group);
        let fresh = scanner
            .scan(&store, &world, &config, &sampling(), group)
            .await
            .unwrap_or_default();
        assert!(fresh.summary.total() > cached.summary.total());
    }

    #[tokio::test]
    async fn min_abundance_filters_trace_amounts() {
        let store = MemoryChunkStore::new();
        let world = FlatWorldOracle::standard();
        let group = GroupId::new();
        let chunk = owned_chunk(&store, group, 0, 0).await;
        // One thin diamond layer: 64 columns sampled * 1 block * 4 density
        // = 256 estimated; raising min_abundance above that hides it.
        world.set_chunk_layers(
            chunk,
            [(i32::MIN, Material::Air), (10, Material::DiamondOre), (11, Material::Air)],
        );

        let scanner = ResourceScanner::new();
        let strict = ResourceScanConfig {
            min_abundance: 10_000,
            ..ResourceScanConfig::default()
        };
        let outcome = scanner
            .scan(&store, &world, &strict, &sampling(), group)
            .await
            .unwrap_or_default();
        assert!(outcome.entries.is_empty());
    }
}
