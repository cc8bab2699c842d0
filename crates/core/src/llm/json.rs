use crate::domain::contract::LlmSuggestion;
use crate::domain::suggestion::Suggestion;
use anyhow::Context;

pub fn extract_json(text: &str) -> Option<String> {
    let mut trimmed = text.trim();
    if let Some(fenced) = trimmed.strip_prefix("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```), which may share
        // a line with the object.
        trimmed = fenced.rfind("```").map_or(fenced, |end| &fenced[..end]);
    }

    // First '{' to last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

/// Pulls the single JSON object out of a model reply and validates it as a
/// suggestion for `token`.
pub fn parse_suggestion(text: &str, token: &str) -> anyhow::Result<Suggestion> {
    let json_str = extract_json(text).context("Failed to parse AI response: no JSON object found")?;
    let parsed = serde_json::from_str::<LlmSuggestion>(&json_str)
        .with_context(|| format!("Failed to parse AI response: {json_str}"))?;
    parsed.validate_and_into_suggestion(token)
}
