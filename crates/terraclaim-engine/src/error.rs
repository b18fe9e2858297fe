//! Error types for the engine crate.
//!
//! Very little in this engine is allowed to fail outward: transient
//! collaborator failures are logged and absorbed by fallback chains, so
//! [`EngineError`] only surfaces from maintenance operations and the
//! resource scanner, where callers genuinely need to know.

use terraclaim_store::StoreError;

/// Errors that can escape the engine's fallback chains.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The chunk store failed on a path with no meaningful fallback
    /// (maintenance recompute, territory enumeration).
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
