//! Ports to the surrounding game server: world access and team membership.
//!
//! The engine never talks to a real world directly. [`WorldOracle`] is the
//! synchronous block/biome sampling surface the host adapts onto its own
//! world representation; [`TeamResolver`] maps players to their pricing
//! group. Both are cheap per-call interfaces -- scanners drive the
//! iteration, the oracle only answers point queries.
//!
//! [`FlatWorldOracle`] and [`SoloTeamResolver`] are the in-process
//! implementations used throughout the test suites.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;
use std::sync::PoisonError;

use terraclaim_types::{Biome, ChunkKey, GroupId, Material, PlayerId};

/// A world sample that could not be answered.
#[derive(Debug, thiserror::Error)]
pub enum WorldAccessError {
    /// The chunk holding the sample is not resident in memory.
    #[error("chunk {0} is not loaded")]
    ChunkNotLoaded(ChunkKey),

    /// The host world failed to answer for another reason.
    #[error("world access failed at {chunk} ({x},{y},{z}): {reason}")]
    Sample {
        /// The chunk being sampled.
        chunk: ChunkKey,
        /// Block x offset within the chunk, 0..16.
        x: u8,
        /// Absolute block y coordinate.
        y: i32,
        /// Block z offset within the chunk, 0..16.
        z: u8,
        /// Host-provided failure description.
        reason: String,
    },
}

/// Point-query access to the game world.
///
/// All methods are synchronous and expected to be cheap; scanners call
/// them in tight loops. Implementations must be shareable across the
/// engine's spawned tasks.
pub trait WorldOracle: Send + Sync {
    /// The block at the given offset within a chunk.
    ///
    /// `x` and `z` are offsets within the chunk (0..16), `y` is absolute.
    ///
    /// # Errors
    ///
    /// Returns [`WorldAccessError`] when the sample cannot be answered;
    /// scanners record the failure and move on.
    fn block_at(&self, chunk: &ChunkKey, x: u8, y: i32, z: u8)
    -> Result<Material, WorldAccessError>;

    /// The dominant biome of a chunk, or `None` when the host cannot say.
    fn biome_at(&self, chunk: &ChunkKey) -> Option<Biome>;

    /// Whether the chunk is resident and sampleable right now.
    fn is_loaded(&self, chunk: &ChunkKey) -> bool;

    /// The highest non-air block in a chunk, or `None` for an empty column.
    fn highest_block_y(&self, chunk: &ChunkKey) -> Option<i32>;
}

/// Shared handles are oracles too; the engine consumes its world by
/// value, and tests keep a second handle to mutate synthetic worlds.
impl<T: WorldOracle> WorldOracle for std::sync::Arc<T> {
    fn block_at(
        &self,
        chunk: &ChunkKey,
        x: u8,
        y: i32,
        z: u8,
    ) -> Result<Material, WorldAccessError> {
        self.as_ref().block_at(chunk, x, y, z)
    }

    fn biome_at(&self, chunk: &ChunkKey) -> Option<Biome> {
        self.as_ref().biome_at(chunk)
    }

    fn is_loaded(&self, chunk: &ChunkKey) -> bool {
        self.as_ref().is_loaded(chunk)
    }

    fn highest_block_y(&self, chunk: &ChunkKey) -> Option<i32> {
        self.as_ref().highest_block_y(chunk)
    }
}

/// Maps players to the group whose territory and discounts they share.
pub trait TeamResolver: Send + Sync {
    /// The pricing group a player belongs to.
    fn group_of(&self, player: PlayerId) -> GroupId;

    /// The group's cost multiplier (team perks, events). 1.0 is neutral.
    fn cost_multiplier(&self, group: GroupId) -> f64;
}

/// Resolver for servers without teams: every player is their own group.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoloTeamResolver;

impl TeamResolver for SoloTeamResolver {
    fn group_of(&self, player: PlayerId) -> GroupId {
        GroupId::from(player.into_inner())
    }

    fn cost_multiplier(&self, _group: GroupId) -> f64 {
        1.0
    }
}

/// A synthetic layered world for tests and benchmarks.
///
/// Every chunk shares the same vertical layer stack unless overridden;
/// biomes, loadedness, and forced sample failures are set per chunk.
pub struct FlatWorldOracle {
    state: RwLock<FlatWorldState>,
}

struct FlatWorldState {
    /// Layer start y -> material; a layer extends until the next start.
    layers: BTreeMap<i32, Material>,
    /// Per-chunk layer overrides.
    chunk_layers: HashMap<ChunkKey, BTreeMap<i32, Material>>,
    biomes: HashMap<ChunkKey, Biome>,
    unloaded: HashSet<ChunkKey>,
    failing: HashSet<ChunkKey>,
    surface_y: i32,
}

impl FlatWorldOracle {
    /// A world of dirt over stone with a grass surface at y = 64.
    pub fn standard() -> Self {
        let mut layers = BTreeMap::new();
        layers.insert(i32::MIN, Material::Bedrock);
        layers.insert(-63, Material::Stone);
        layers.insert(56, Material::Dirt);
        layers.insert(64, Material::GrassBlock);
        layers.insert(65, Material::Air);
        Self {
            state: RwLock::new(FlatWorldState {
                layers,
                chunk_layers: HashMap::new(),
                biomes: HashMap::new(),
                unloaded: HashSet::new(),
                failing: HashSet::new(),
                surface_y: 64,
            }),
        }
    }

    /// A world built from an explicit layer stack.
    ///
    /// Each `(start_y, material)` pair begins a layer that extends upward
    /// until the next start; everything above the last start is air.
    pub fn layered(layers: impl IntoIterator<Item = (i32, Material)>, surface_y: i32) -> Self {
        let layers: BTreeMap<i32, Material> = layers.into_iter().collect();
        Self {
            state: RwLock::new(FlatWorldState {
                layers,
                chunk_layers: HashMap::new(),
                biomes: HashMap::new(),
                unloaded: HashSet::new(),
                failing: HashSet::new(),
                surface_y,
            }),
        }
    }

    /// Override the layer stack for a single chunk.
    pub fn set_chunk_layers(
        &self,
        chunk: ChunkKey,
        layers: impl IntoIterator<Item = (i32, Material)>,
    ) {
        self.write().chunk_layers.insert(chunk, layers.into_iter().collect());
    }

    /// Set the biome of a chunk.
    pub fn set_biome(&self, chunk: ChunkKey, biome: Biome) {
        self.write().biomes.insert(chunk, biome);
    }

    /// Mark a chunk as not resident.
    pub fn set_unloaded(&self, chunk: ChunkKey) {
        self.write().unloaded.insert(chunk);
    }

    /// Make every sample in a chunk fail.
    pub fn set_failing(&self, chunk: ChunkKey) {
        self.write().failing.insert(chunk);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, FlatWorldState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FlatWorldState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FlatWorldState {
    fn material_at(&self, chunk: &ChunkKey, y: i32) -> Material {
        let layers = self.chunk_layers.get(chunk).unwrap_or(&self.layers);
        layers
            .range(..=y)
            .next_back()
            .map_or(Material::Air, |(_, material)| *material)
    }
}

impl WorldOracle for FlatWorldOracle {
    fn block_at(
        &self,
        chunk: &ChunkKey,
        x: u8,
        y: i32,
        z: u8,
    ) -> Result<Material, WorldAccessError> {
        let state = self.read();
        if state.unloaded.contains(chunk) {
            return Err(WorldAccessError::ChunkNotLoaded(chunk.clone()));
        }
        if state.failing.contains(chunk) {
            return Err(WorldAccessError::Sample {
                chunk: chunk.clone(),
                x,
                y,
                z,
                reason: "injected failure".to_owned(),
            });
        }
        Ok(state.material_at(chunk, y))
    }

    fn biome_at(&self, chunk: &ChunkKey) -> Option<Biome> {
        self.read().biomes.get(chunk).copied()
    }

    fn is_loaded(&self, chunk: &ChunkKey) -> bool {
        !self.read().unloaded.contains(chunk)
    }

    fn highest_block_y(&self, chunk: &ChunkKey) -> Option<i32> {
        let state = self.read();
        if state.unloaded.contains(chunk) {
            return None;
        }
        Some(state.surface_y)
    }
}
