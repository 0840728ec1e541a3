//! Request builder: preferences + free text -> completion request.
//! Pure and deterministic; identical inputs give byte-identical instructions.

use super::CompletionRequest;
use crate::catalog;
use crate::preferences::PreferenceRecord;

const FORMAT_DIRECTIVE: &str =
    "Preserve all formatting (bold, italic, line breaks, bullet points, etc.).";
const NOTES_DIRECTIVE: &str =
    "Add brief explanatory notes in parentheses for difficult terms if needed.";
const ONLY_TRANSLATION_DIRECTIVE: &str =
    "Return only the translation without any additional explanation.";

/// Compose the user-level instruction. Directives are joined by single spaces
/// in a fixed order, the input text last under its own header.
pub fn build_user_instruction(text: &str, preferences: &PreferenceRecord) -> String {
    let target = catalog::language_name(&preferences.target_language_code);

    let mut parts = Vec::with_capacity(5);
    parts.push(format!("Translate the following text to {target}."));
    if preferences.preserve_formatting {
        parts.push(FORMAT_DIRECTIVE.to_string());
    }
    if preferences.add_explanatory_notes {
        parts.push(NOTES_DIRECTIVE.to_string());
    }
    parts.push(ONLY_TRANSLATION_DIRECTIVE.to_string());
    parts.push(format!("\nText to translate:\n{text}"));
    parts.join(" ")
}

pub fn build_request(
    text: &str,
    preferences: &PreferenceRecord,
    max_output_tokens: u32,
) -> CompletionRequest {
    let style = catalog::style_or_default(&preferences.style_key);
    CompletionRequest {
        system_instruction: style.system_instruction.to_string(),
        user_instruction: build_user_instruction(text, preferences),
        temperature: preferences.temperature,
        max_output_tokens,
    }
}
