//! Prompt contracts sent to the text-generation service.

use crate::error::BuildError;
use crate::types::PageValues;

/// System instruction for regenerating one page's placeholder values.
pub const VALUES_SYSTEM: &str = "You write website copy. \
    You receive a description of a business and a JSON object whose keys are placeholder \
    tokens in an HTML page and whose values are sample text for those placeholders. \
    Respond with exactly one JSON object that has the SAME keys, spelled exactly as given, \
    and new values written for the described business. \
    Keep each value close to the length and tone of its sample. \
    Values must be plain strings. \
    Do NOT add or remove keys. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// User payload template for value regeneration.
/// Replace `{description}` and `{reference_json}` before sending.
pub const VALUES_PROMPT_TEMPLATE: &str = r#"Business description:
{description}

Placeholder JSON to rewrite:
{reference_json}"#;

/// System instruction for closed-set theme classification.
pub const THEME_SYSTEM: &str = "You pick website templates. \
    You receive a business description and a list of template names. \
    Respond with exactly one template name from the list, copied verbatim. \
    Do NOT explain your choice. \
    Do NOT respond with anything other than the name.";

/// User payload template for theme classification.
/// Replace `{description}` and `{themes}` before sending.
pub const THEME_PROMPT_TEMPLATE: &str = r#"Business description:
{description}

Template names:
{themes}"#;

/// Build the value-regeneration payload for one page.
pub fn values_prompt(description: &str, reference: &PageValues) -> Result<String, BuildError> {
    let reference_json = serde_json::to_string_pretty(reference)
        .map_err(|e| BuildError::Validation(format!("Cannot serialize reference values: {}", e)))?;
    Ok(VALUES_PROMPT_TEMPLATE
        .replace("{reference_json}", &reference_json)
        .replace("{description}", description.trim()))
}

/// Build the classification payload listing every candidate theme, one per line.
pub fn theme_prompt(description: &str, themes: &[String]) -> String {
    let listed = themes
        .iter()
        .map(|t| format!("- {}", t))
        .collect::<Vec<_>>()
        .join("\n");
    THEME_PROMPT_TEMPLATE
        .replace("{themes}", &listed)
        .replace("{description}", description.trim())
}
