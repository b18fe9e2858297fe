//! Chunk store port for the Terraclaim unlock-cost engine.
//!
//! The engine only needs key-value get/set/enumerate semantics from its
//! storage backend: lock state, base values, ownership, and the durable
//! tier of the cost cache. The [`ChunkStore`] trait captures exactly that
//! surface; schema and backend selection are this crate's concern, not the
//! engine's.
//!
//! # Modules
//!
//! - [`chunk_store`] -- The [`ChunkStore`] trait.
//! - [`error`] -- [`StoreError`].
//! - [`memory`] -- [`MemoryChunkStore`], an in-process implementation used
//!   by tests and embeddable deployments.
//! - [`postgres`] -- [`PostgresChunkStore`], the durable implementation.

pub mod chunk_store;
pub mod error;
pub mod memory;
pub mod postgres;

pub use chunk_store::ChunkStore;
pub use error::StoreError;
pub use memory::MemoryChunkStore;
pub use postgres::{PostgresChunkStore, PostgresConfig};
