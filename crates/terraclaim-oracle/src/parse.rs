//! Parsing of model output into a typed [`CostSuggestion`].
//!
//! The model returns raw text (ideally JSON). Recovery strategies are
//! applied in order before giving up:
//!
//! 1. Direct `serde_json` deserialization
//! 2. Extract JSON from a markdown code block
//!
//! A failure here is not special -- the engine's fallback chain treats it
//! exactly like a transport error.

use terraclaim_types::Material;

use crate::error::OracleError;
use crate::suggestion::CostSuggestion;

/// Intermediate struct for the model's raw JSON response.
///
/// The model produces a flat object with `material`, `amount`, and an
/// optional `reasoning`. This captures that shape before material
/// validation.
#[derive(Debug, serde::Deserialize)]
struct RawSuggestion {
    material: String,
    amount: u64,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Parse a model response into a validated [`CostSuggestion`].
///
/// # Errors
///
/// Returns [`OracleError::Parse`] if no strategy yields valid JSON, if the
/// material is outside the known vocabulary, or if the amount is not a
/// positive quantity.
pub fn parse_suggestion(raw: &str) -> Result<CostSuggestion, OracleError> {
    let trimmed = raw.trim();

    // Strategy 1: direct parse.
    if let Ok(parsed) = serde_json::from_str::<RawSuggestion>(trimmed) {
        return convert(parsed);
    }

    // Strategy 2: extract from markdown code block.
    if let Some(json_str) = extract_json_from_codeblock(trimmed)
        && let Ok(parsed) = serde_json::from_str::<RawSuggestion>(json_str)
    {
        return convert(parsed);
    }

    Err(OracleError::Parse(format!(
        "no JSON suggestion found in response ({} chars)",
        trimmed.len()
    )))
}

/// Validate the raw shape into the typed suggestion.
fn convert(raw: RawSuggestion) -> Result<CostSuggestion, OracleError> {
    let material: Material =
        serde_json::from_value(serde_json::Value::String(raw.material.clone()))
            .map_err(|_| OracleError::Parse(format!("unknown material {:?}", raw.material)))?;

    if raw.amount == 0 {
        return Err(OracleError::Parse(
            "amount must be a positive quantity".to_owned(),
        ));
    }
    let amount = u32::try_from(raw.amount).unwrap_or(u32::MAX);

    Ok(CostSuggestion {
        material,
        amount,
        reasoning: raw.reasoning,
        ai_processed: true,
    })
}

/// Pull the contents of the first fenced code block, tolerating a `json`
/// language tag.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = text.get(start.checked_add(3)?..)?;
    let body = after_fence.strip_prefix("json").unwrap_or(after_fence);
    let end = body.find("```")?;
    Some(body.get(..end)?.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let raw = r#"{"material": "diamond", "amount": 3, "reasoning": "rare biome"}"#;
        let suggestion = parse_suggestion(raw).ok();
        assert!(suggestion.is_some());
        let Some(suggestion) = suggestion else {
            return;
        };
        assert_eq!(suggestion.material, Material::Diamond);
        assert_eq!(suggestion.amount, 3);
        assert!(suggestion.ai_processed);
        assert_eq!(suggestion.reasoning.as_deref(), Some("rare biome"));
    }

    #[test]
    fn parses_markdown_wrapped_json() {
        let raw = "Here you go:\n```json\n{\"material\": \"coal\", \"amount\": 16}\n```";
        let suggestion = parse_suggestion(raw).ok();
        assert_eq!(suggestion.as_ref().map(|s| s.material), Some(Material::Coal));
        assert_eq!(suggestion.map(|s| s.amount), Some(16));
    }

    #[test]
    fn rejects_unknown_material() {
        let raw = r#"{"material": "philosopher_stone", "amount": 1}"#;
        assert!(matches!(parse_suggestion(raw), Err(OracleError::Parse(_))));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let raw = r#"{"material": "coal", "amount": 0}"#;
        assert!(matches!(parse_suggestion(raw), Err(OracleError::Parse(_))));
    }

    #[test]
    fn rejects_prose_without_json() {
        assert!(parse_suggestion("I think coal would be fair.").is_err());
    }
}
