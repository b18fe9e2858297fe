//! Error types for the oracle crate.

/// Errors that can occur when asking the oracle for a cost suggestion.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The HTTP call failed or the API returned a non-success status.
    #[error("oracle backend error: {0}")]
    Backend(String),

    /// The model's response could not be parsed into a suggestion.
    #[error("oracle response parse error: {0}")]
    Parse(String),

    /// The oracle is administratively disabled.
    #[error("oracle is disabled")]
    Disabled,
}
