//! Shared type definitions for the Terraclaim unlock-cost engine.
//!
//! This crate is the single source of truth for the value objects that flow
//! between the engine, the chunk store, and the AI cost oracle. Everything
//! here is plain data: no I/O, no interior mutability, no async.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for player and group identifiers
//! - [`enums`] -- Biomes, materials with their harvest tiers, difficulty
//!   ratings, and the economy kind selector
//! - [`structs`] -- Chunk identity, evaluations, base values, payment
//!   requirements, and cache entries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Biome, Difficulty, EconomyKind, Material, ResourceTier};
pub use ids::{GroupId, PlayerId};
pub use structs::{
    BaseValue, CachedCostEntry, ChunkEvaluation, ChunkKey, MaterialCost, PaymentRequirement,
    ResourceEntry, ScanSummary,
};
