//! AI cost-suggestion oracle for the Terraclaim unlock-cost engine.
//!
//! The engine's AI-assisted pricing strategies delegate to an external
//! cost-suggestion oracle. This crate defines that port
//! ([`CostSuggestionOracle`]) and ships an HTTP implementation speaking to
//! OpenAI-compatible and Anthropic Messages APIs over `reqwest`.
//!
//! Every failure mode here -- transport, bad status, malformed response --
//! surfaces as [`OracleError`]; the engine treats any of them as a trigger
//! for its silent fallback to the traditional strategy. Nothing in this
//! crate retries.
//!
//! # Modules
//!
//! - [`error`] -- [`OracleError`].
//! - [`llm`] -- Enum-dispatched HTTP backends.
//! - [`parse`] -- Resilient extraction of a suggestion from model output.
//! - [`suggestion`] -- The port trait and its request/response types.

pub mod error;
pub mod llm;
pub mod parse;
pub mod suggestion;

pub use error::OracleError;
pub use llm::{AnthropicBackend, LlmCostOracle, LlmOracleConfig, OpenAiBackend, OracleBackendKind};
pub use suggestion::{CostSuggestion, CostSuggestionOracle, DisabledOracle, SuggestionRequest};
