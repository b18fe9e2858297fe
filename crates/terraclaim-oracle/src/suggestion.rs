//! The oracle port: request/response types and the trait the engine
//! programs against.

use std::future::Future;

use serde::{Deserialize, Serialize};
use terraclaim_types::{Biome, ChunkKey, Difficulty, Material, PlayerId};

use crate::error::OracleError;

/// Context handed to the oracle for one suggestion.
///
/// Everything the model needs to reason about a fair price; assembled by
/// the engine from its own evaluation, never fetched by the oracle itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRequest {
    /// The player asking for the unlock.
    pub player: PlayerId,
    /// The chunk being priced.
    pub chunk: ChunkKey,
    /// Biome at the chunk.
    pub biome: Biome,
    /// Terrain score from the evaluation.
    pub score: f64,
    /// Difficulty band from the evaluation.
    pub difficulty: Difficulty,
    /// How many chunks the player's group has already unlocked.
    pub unlocked_count: u64,
}

/// A cost suggestion produced by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSuggestion {
    /// The material the model wants the player to pay with.
    pub material: Material,
    /// How many of it.
    pub amount: u32,
    /// The model's justification, surfaced to players only when the
    /// engine's config allows it.
    pub reasoning: Option<String>,
    /// Whether a model actually produced this (false for static fallbacks).
    pub ai_processed: bool,
}

/// A source of AI cost suggestions.
///
/// Declared with explicit `impl Future + Send` return types so generic
/// engine code can spawn suggestion calls onto background tasks.
pub trait CostSuggestionOracle: Send + Sync {
    /// Ask for a cost suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] on any transport, API, or parse failure.
    /// Callers are expected to fall back, not retry.
    fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> impl Future<Output = Result<CostSuggestion, OracleError>> + Send;
}

/// An oracle that always reports itself disabled.
///
/// Lets engines be composed without AI: every AI-assisted strategy then
/// takes its traditional fallback path immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOracle;

impl DisabledOracle {
    /// Create a disabled oracle.
    pub const fn new() -> Self {
        Self
    }
}

impl CostSuggestionOracle for DisabledOracle {
    async fn suggest(&self, _request: &SuggestionRequest) -> Result<CostSuggestion, OracleError> {
        Err(OracleError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_oracle_always_errors() {
        let oracle = DisabledOracle::new();
        let request = SuggestionRequest {
            player: PlayerId::new(),
            chunk: ChunkKey::new("overworld", 0, 0),
            biome: Biome::Plains,
            score: 10.0,
            difficulty: Difficulty::Normal,
            unlocked_count: 0,
        };
        assert!(matches!(
            oracle.suggest(&request).await,
            Err(OracleError::Disabled)
        ));
    }
}
