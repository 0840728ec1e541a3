//! Static catalog of translation styles and target languages.
//! Both sets are closed; their order drives the selection menus.

/// Display name used when a stored language code no longer resolves.
pub const FALLBACK_LANGUAGE_NAME: &str = "Tiếng Việt";

/// Style used when a stored style key no longer resolves.
pub const DEFAULT_STYLE_KEY: &str = "professional";

/// A translation tone, steering the completion service via its system instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleDefinition {
    pub key: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub system_instruction: &'static str,
    pub default_temperature: f64,
}

impl StyleDefinition {
    /// Leading emoji of the display name.
    pub fn emoji(&self) -> &'static str {
        self.display_name
            .split_whitespace()
            .next()
            .unwrap_or(self.display_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageDefinition {
    pub code: &'static str,
    pub display_name: &'static str,
}

impl LanguageDefinition {
    /// Leading flag of the display name.
    pub fn flag(&self) -> &'static str {
        self.display_name
            .split_whitespace()
            .next()
            .unwrap_or(self.display_name)
    }
}

static STYLES: [StyleDefinition; 5] = [
    StyleDefinition {
        key: "professional",
        display_name: "💼 Chuyên nghiệp",
        description: "Phong cách trang trọng, chính xác về thuật ngữ",
        system_instruction: "Bạn là một dịch giả chuyên nghiệp với kinh nghiệm cao. Dịch văn bản với phong cách trang trọng, chính xác về mặt thuật ngữ chuyên môn.",
        default_temperature: 0.3,
    },
    StyleDefinition {
        key: "casual",
        display_name: "😊 Thân thiện",
        description: "Phong cách tự nhiên, dễ hiểu",
        system_instruction: "Bạn là một dịch giả thân thiện. Dịch văn bản với phong cách tự nhiên, dễ hiểu, gần gũi với người đọc.",
        default_temperature: 0.5,
    },
    StyleDefinition {
        key: "academic",
        display_name: "🎓 Học thuật",
        description: "Chính xác cao, giữ thuật ngữ chuyên ngành",
        system_instruction: "Bạn là một dịch giả học thuật chuyên sâu. Dịch văn bản với độ chính xác cao, giữ nguyên thuật ngữ chuyên ngành khi cần thiết, kèm giải thích.",
        default_temperature: 0.2,
    },
    StyleDefinition {
        key: "creative",
        display_name: "🎨 Sáng tạo",
        description: "Linh hoạt, giữ thần văn bản",
        system_instruction: "Bạn là một dịch giả sáng tạo. Dịch văn bản một cách linh hoạt, sáng tạo nhưng vẫn giữ được tinh thần và ý nghĩa của văn bản gốc.",
        default_temperature: 0.7,
    },
    StyleDefinition {
        key: "technical",
        display_name: "⚙️ Kỹ thuật",
        description: "Chuyên cho tài liệu kỹ thuật, IT",
        system_instruction: "Bạn là một dịch giả chuyên về kỹ thuật và công nghệ. Dịch chính xác các thuật ngữ kỹ thuật, giữ nguyên code, commands và technical terms khi cần.",
        default_temperature: 0.2,
    },
];

static LANGUAGES: [LanguageDefinition; 10] = [
    LanguageDefinition { code: "vi", display_name: "🇻🇳 Tiếng Việt" },
    LanguageDefinition { code: "en", display_name: "🇬🇧 English" },
    LanguageDefinition { code: "zh", display_name: "🇨🇳 中文" },
    LanguageDefinition { code: "ja", display_name: "🇯🇵 日本語" },
    LanguageDefinition { code: "ko", display_name: "🇰🇷 한국어" },
    LanguageDefinition { code: "fr", display_name: "🇫🇷 Français" },
    LanguageDefinition { code: "de", display_name: "🇩🇪 Deutsch" },
    LanguageDefinition { code: "es", display_name: "🇪🇸 Español" },
    LanguageDefinition { code: "ru", display_name: "🇷🇺 Русский" },
    LanguageDefinition { code: "th", display_name: "🇹🇭 ไทย" },
];

/// All styles in menu order.
pub fn list_styles() -> &'static [StyleDefinition] {
    &STYLES
}

/// All target languages in menu order.
pub fn list_languages() -> &'static [LanguageDefinition] {
    &LANGUAGES
}

/// Look up a style by key. Keys are case-sensitive.
pub fn get_style(key: &str) -> Option<&'static StyleDefinition> {
    STYLES.iter().find(|s| s.key == key)
}

/// Look up a language by its lowercase code.
pub fn get_language(code: &str) -> Option<&'static LanguageDefinition> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Resolve a style key, falling back to the default style for stale keys.
pub fn style_or_default(key: &str) -> &'static StyleDefinition {
    get_style(key).unwrap_or(&STYLES[0])
}

/// Display name for a language code, or [`FALLBACK_LANGUAGE_NAME`] when unknown.
pub fn language_name(code: &str) -> &'static str {
    get_language(code)
        .map(|l| l.display_name)
        .unwrap_or(FALLBACK_LANGUAGE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_keep_menu_order() {
        let keys: Vec<_> = list_styles().iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            ["professional", "casual", "academic", "creative", "technical"]
        );
    }

    #[test]
    fn languages_keep_menu_order() {
        let codes: Vec<_> = list_languages().iter().map(|l| l.code).collect();
        assert_eq!(
            codes,
            ["vi", "en", "zh", "ja", "ko", "fr", "de", "es", "ru", "th"]
        );
    }

    #[test]
    fn lookups_resolve_known_entries() {
        assert_eq!(get_style("casual").map(|s| s.default_temperature), Some(0.5));
        assert_eq!(
            get_language("vi").map(|l| l.display_name),
            Some("🇻🇳 Tiếng Việt")
        );
        assert_eq!(get_style(DEFAULT_STYLE_KEY).map(|s| s.key), Some("professional"));
    }

    #[test]
    fn unknown_entries_are_not_found() {
        assert!(get_style("poetic").is_none());
        assert!(get_language("xx").is_none());
        assert!(get_language("VI").is_none());
    }

    #[test]
    fn stale_codes_fall_back() {
        assert_eq!(language_name("pt"), FALLBACK_LANGUAGE_NAME);
        assert_eq!(style_or_default("gone").key, DEFAULT_STYLE_KEY);
    }

    #[test]
    fn labels_split_leading_symbol() {
        assert_eq!(get_language("vi").unwrap().flag(), "🇻🇳");
        assert_eq!(get_style("professional").unwrap().emoji(), "💼");
        assert_eq!(get_style("technical").unwrap().emoji(), "⚙️");
    }

    #[test]
    fn default_temperatures_stay_in_unit_range() {
        for style in list_styles() {
            assert!((0.0..=1.0).contains(&style.default_temperature), "{}", style.key);
        }
    }
}
