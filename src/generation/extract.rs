//! JSON object extraction from free-form completion text.
//!
//! Models sometimes wrap the requested object in prose or code fences. The
//! scanner tracks brace depth and JSON string state, so nested objects and
//! braces inside string values do not end the object early.

use crate::error::BuildError;
use crate::templates::value_to_text;
use crate::types::PageValues;
use serde_json::Value;

/// Balanced top-level `{...}` spans in `text`, in order of appearance.
pub fn top_level_objects(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            // Quotes only open strings inside an object; prose quotes are ignored.
            b'"' if depth > 0 => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    spans
}

/// First balanced top-level object in `text`, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
    top_level_objects(text).into_iter().next()
}

/// Parse completion text into page values.
///
/// The whole text is tried first; otherwise each balanced top-level object in turn,
/// and the first one that parses as a JSON object wins. Non-string values are
/// stringified.
pub fn parse_page_values(text: &str) -> Result<PageValues, BuildError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BuildError::Validation("Empty completion".to_string()));
    }

    let parsed = serde_json::from_str::<Value>(trimmed)
        .ok()
        .filter(Value::is_object)
        .or_else(|| {
            top_level_objects(trimmed)
                .into_iter()
                .filter_map(|span| serde_json::from_str::<Value>(span).ok())
                .find(Value::is_object)
        });

    match parsed {
        Some(Value::Object(map)) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, value_to_text(value)))
            .collect()),
        _ => Err(BuildError::Validation(format!(
            "No JSON object found in completion ({} chars)",
            trimmed.len()
        ))),
    }
}
