//! Error types for the storage layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the underlying
//! [`sqlx`] and [`serde_json`] errors with context about what failed.

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A cached payload could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value was malformed (bad fingerprint, bad UUID).
    #[error("corrupt stored value: {0}")]
    Corrupt(String),

    /// A configuration error (bad connection URL, bad pool settings).
    #[error("configuration error: {0}")]
    Config(String),
}
