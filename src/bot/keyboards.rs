//! Inline keyboards. Labels come from the catalog; payloads from `CallbackAction`.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::callback::{CallbackAction, MenuKind};
use super::messages::on_off;
use crate::catalog;
use crate::preferences::PreferenceRecord;

fn button(label: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.encode())
}

fn checked(label: &str, selected: bool) -> String {
    if selected {
        format!("✅ {label}")
    } else {
        label.to_string()
    }
}

pub fn start_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("🎨 Chọn phong cách", CallbackAction::Menu(MenuKind::Style))],
        vec![button("🌍 Chọn ngôn ngữ", CallbackAction::Menu(MenuKind::Language))],
        vec![button("📚 Hướng dẫn", CallbackAction::Menu(MenuKind::Help))],
    ])
}

pub fn style_menu(current: &str) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = catalog::list_styles()
        .iter()
        .map(|style| {
            vec![button(
                checked(style.display_name, style.key == current),
                CallbackAction::SelectStyle(style.key.to_string()),
            )]
        })
        .collect();
    rows.push(vec![button("ℹ️ Chi tiết phong cách", CallbackAction::StyleInfo)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn language_menu(current: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(catalog::list_languages().iter().map(|language| {
        vec![button(
            checked(language.display_name, language.code == current),
            CallbackAction::SelectLanguage(language.code.to_string()),
        )]
    }))
}

pub fn settings_menu(preferences: &PreferenceRecord) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button(
                format!("📝 Format: {}", on_off(preferences.preserve_formatting)),
                CallbackAction::Toggle("format".into()),
            ),
            button(
                format!("📌 Ghi chú: {}", on_off(preferences.add_explanatory_notes)),
                CallbackAction::Toggle("notes".into()),
            ),
        ],
        vec![button(
            format!("👁️ Bản gốc: {}", on_off(preferences.show_original_text)),
            CallbackAction::Toggle("original".into()),
        )],
        vec![
            button("🎨 Đổi phong cách", CallbackAction::Menu(MenuKind::Style)),
            button("🌍 Đổi ngôn ngữ", CallbackAction::Menu(MenuKind::Language)),
        ],
        vec![button("🔄 Đặt lại mặc định", CallbackAction::ResetSettings)],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn payloads(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn language_menu_follows_catalog_and_marks_current() {
        let markup = language_menu("en");
        let expected: Vec<String> = catalog::list_languages()
            .iter()
            .map(|l| format!("lang_{}", l.code))
            .collect();
        assert_eq!(payloads(&markup), expected);

        let labels: Vec<&str> = markup
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(labels[0], "🇻🇳 Tiếng Việt");
        assert_eq!(labels[1], "✅ 🇬🇧 English");
    }

    #[test]
    fn style_menu_ends_with_info_button() {
        let payloads = payloads(&style_menu("professional"));
        assert_eq!(payloads.len(), catalog::list_styles().len() + 1);
        assert_eq!(payloads[0], "style_professional");
        assert_eq!(payloads.last().map(String::as_str), Some("style_info"));
    }

    #[test]
    fn every_settings_button_decodes() {
        for payload in payloads(&settings_menu(&PreferenceRecord::default())) {
            assert!(
                !matches!(
                    CallbackAction::decode(&payload),
                    CallbackAction::Unrecognized(_)
                ),
                "{payload}"
            );
        }
    }
}
