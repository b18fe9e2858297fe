//! Unlock-cost computation and caching engine for chunk claims.
//!
//! Given a player and a world grid cell, this crate decides how much
//! currency or which materials must be spent to unlock it: a terrain
//! scoring model, a neighbor-relative pricing multiplier, a
//! resource-availability scanner, five interchangeable pricing strategies,
//! and a two-tier cost cache, all behind a non-blocking orchestrator.
//!
//! The engine owns the algorithms and their fallback chains. It does not
//! own strategy selection (external config), chunk lock/unlock state (the
//! chunk store's concern), or any rendering.
//!
//! # Modules
//!
//! - [`cache`] -- Two-tier (memory + durable) cost cache.
//! - [`config`] -- Typed configuration with serde defaults and the
//!   price-relevant settings fingerprint.
//! - [`error`] -- [`EngineError`].
//! - [`evaluation`] -- Score-to-difficulty derivation with threshold
//!   validation.
//! - [`multiplier`] -- Neighbor-relative difficulty multiplier.
//! - [`orchestrator`] -- [`CostEngine`], the async-first public surface.
//! - [`pricing`] -- The five pricing strategies as total functions.
//! - [`resources`] -- Owned-territory resource scanner with per-group TTL
//!   cache.
//! - [`terrain`] -- Coarse terrain sampling into a permanent base value.
//! - [`world`] -- World oracle and team resolver ports.

pub mod cache;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod multiplier;
pub mod orchestrator;
pub mod pricing;
pub mod resources;
pub mod terrain;
pub mod world;

pub use cache::CostCache;
pub use config::{
    AiConfig, CacheConfig, ConfigError, EngineConfig, EvaluationConfig, MultiplierConfig,
    PricingConfig, ResourceScanConfig, SamplingConfig, TerrainWeights,
};
pub use error::EngineError;
pub use orchestrator::CostEngine;
pub use pricing::PricingContext;
pub use resources::{ResourceScanOutcome, ResourceScanner};
pub use world::{FlatWorldOracle, SoloTeamResolver, TeamResolver, WorldAccessError, WorldOracle};
