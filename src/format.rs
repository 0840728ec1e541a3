//! Response formatter: gateway outcome + preferences -> reply text.
//! The translated body is inserted verbatim; nothing is escaped or re-encoded.

use crate::catalog;
use crate::preferences::PreferenceRecord;
use crate::translate::TranslateError;

pub const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━";

pub fn format_reply(
    result: &Result<String, TranslateError>,
    preferences: &PreferenceRecord,
    original_text: &str,
) -> String {
    match result {
        Ok(translated) => format_success(translated, preferences, original_text),
        Err(e) => format_failure(e),
    }
}

fn format_success(translated: &str, preferences: &PreferenceRecord, original_text: &str) -> String {
    let style = catalog::style_or_default(&preferences.style_key);
    let language = catalog::get_language(&preferences.target_language_code);
    let language_name = language.map_or(catalog::FALLBACK_LANGUAGE_NAME, |l| l.display_name);
    let flag = language.map_or("🌍", |l| l.flag());

    let mut parts = vec![
        format!("{} *Phong cách:* {}", style.emoji(), style.display_name),
        format!("{flag} *Ngôn ngữ:* {language_name}"),
        DIVIDER.to_string(),
        translated.to_string(),
    ];
    if preferences.show_original_text {
        parts.push(format!("\n{DIVIDER}"));
        parts.push("📄 *Bản gốc:*".to_string());
        parts.push(format!("_{original_text}_"));
    }
    parts.join("\n")
}

/// Single user-facing error line; never carries partial translation content.
pub fn format_failure(error: &TranslateError) -> String {
    let cause = error.to_string();
    let cause = cause.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("❌ Lỗi khi dịch: {cause}")
}
