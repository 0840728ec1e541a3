//! Inline-button actions. Payloads follow `<category>_<value>` and decode into
//! a closed set of variants; anything else is `Unrecognized`.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, info, warn};

use super::{edit_markdown, keyboards, messages, report_failure, BotState};
use crate::catalog;
use crate::error::BotResult;
use crate::preferences::PreferenceFlag;
use crate::stats::UsageAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Style,
    Language,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    SelectStyle(String),
    StyleInfo,
    SelectLanguage(String),
    Toggle(String),
    Menu(MenuKind),
    ResetSettings,
    Unrecognized(String),
}

impl CallbackAction {
    pub fn decode(data: &str) -> Self {
        match data {
            "style_info" => return CallbackAction::StyleInfo,
            "reset_settings" => return CallbackAction::ResetSettings,
            _ => {}
        }
        match data.split_once('_') {
            Some(("style", key)) => CallbackAction::SelectStyle(key.to_string()),
            Some(("lang", code)) => CallbackAction::SelectLanguage(code.to_string()),
            Some(("toggle", flag)) => CallbackAction::Toggle(flag.to_string()),
            Some(("menu", "style")) => CallbackAction::Menu(MenuKind::Style),
            Some(("menu", "language")) => CallbackAction::Menu(MenuKind::Language),
            Some(("menu", "help")) => CallbackAction::Menu(MenuKind::Help),
            _ => CallbackAction::Unrecognized(data.to_string()),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            CallbackAction::SelectStyle(key) => format!("style_{key}"),
            CallbackAction::StyleInfo => "style_info".to_string(),
            CallbackAction::SelectLanguage(code) => format!("lang_{code}"),
            CallbackAction::Toggle(flag) => format!("toggle_{flag}"),
            CallbackAction::Menu(MenuKind::Style) => "menu_style".to_string(),
            CallbackAction::Menu(MenuKind::Language) => "menu_language".to_string(),
            CallbackAction::Menu(MenuKind::Help) => "menu_help".to_string(),
            CallbackAction::ResetSettings => "reset_settings".to_string(),
            CallbackAction::Unrecognized(raw) => raw.clone(),
        }
    }
}

/// Dispatcher endpoint for callback queries.
pub(crate) async fn callback_endpoint(
    bot: Bot,
    query: CallbackQuery,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let chat_id = query.message.as_ref().map(|m| m.chat().id);
    if let Err(e) = handle_callback(&bot, &query, &state).await {
        match chat_id {
            Some(chat_id) => report_failure(&bot, chat_id, &e).await,
            None => error!(error = %e, "callback handling failed"),
        }
    }
    Ok(())
}

async fn handle_callback(bot: &Bot, query: &CallbackQuery, state: &BotState) -> BotResult<()> {
    let caller = query.from.id.0;
    let Some(data) = query.data.as_deref() else {
        bot.answer_callback_query(&query.id).await?;
        return Ok(());
    };
    let target = query.message.as_ref().map(|m| (m.chat().id, m.id()));
    info!(caller, data, "callback received");

    let (text, markup) = match CallbackAction::decode(data) {
        CallbackAction::SelectStyle(key) => match state.preferences.set_style(caller, &key) {
            Ok(()) => {
                bot.answer_callback_query(&query.id).await?;
                let style = catalog::style_or_default(&key);
                (messages::style_selected(style), None)
            }
            Err(e) => {
                bot.answer_callback_query(&query.id)
                    .text(messages::rejected(&e))
                    .await?;
                return Ok(());
            }
        },
        CallbackAction::StyleInfo => {
            bot.answer_callback_query(&query.id).await?;
            (messages::style_info(), None)
        }
        CallbackAction::SelectLanguage(code) => {
            match state.preferences.set_language(caller, &code) {
                Ok(()) => {
                    bot.answer_callback_query(&query.id).await?;
                    let name = catalog::get_language(&code)
                        .map(messages::language_selected)
                        .unwrap_or_default();
                    (name, None)
                }
                Err(e) => {
                    bot.answer_callback_query(&query.id)
                        .text(messages::rejected(&e))
                        .await?;
                    return Ok(());
                }
            }
        }
        CallbackAction::Toggle(name) => match state.preferences.toggle(caller, &name) {
            Ok(value) => {
                let notice = name
                    .parse::<PreferenceFlag>()
                    .map(|flag| messages::toggle_notice(flag, value))
                    .unwrap_or_default();
                bot.answer_callback_query(&query.id).text(notice).await?;
                let prefs = state.preferences.get(caller);
                (
                    messages::settings(&prefs),
                    Some(keyboards::settings_menu(&prefs)),
                )
            }
            Err(e) => {
                bot.answer_callback_query(&query.id)
                    .text(messages::rejected(&e))
                    .await?;
                return Ok(());
            }
        },
        CallbackAction::Menu(kind) => {
            bot.answer_callback_query(&query.id).await?;
            state.usage.record(caller, UsageAction::Command);
            let prefs = state.preferences.get(caller);
            match kind {
                MenuKind::Style => (
                    messages::style_menu_title().to_string(),
                    Some(keyboards::style_menu(&prefs.style_key)),
                ),
                MenuKind::Language => (
                    messages::language_menu_title().to_string(),
                    Some(keyboards::language_menu(&prefs.target_language_code)),
                ),
                MenuKind::Help => (messages::help(state.translator.max_message_length()), None),
            }
        }
        CallbackAction::ResetSettings => {
            state.preferences.reset(caller);
            bot.answer_callback_query(&query.id).await?;
            (messages::reset_done().to_string(), None)
        }
        CallbackAction::Unrecognized(raw) => {
            warn!(caller, data = %raw, "unrecognized callback action");
            bot.answer_callback_query(&query.id)
                .text(messages::unsupported_action())
                .await?;
            return Ok(());
        }
    };

    if let Some((chat_id, message_id)) = target {
        edit_markdown(bot, chat_id, message_id, text, markup).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_documented_payloads() {
        let cases = [
            ("style_casual", CallbackAction::SelectStyle("casual".into())),
            ("lang_en", CallbackAction::SelectLanguage("en".into())),
            ("toggle_format", CallbackAction::Toggle("format".into())),
            ("toggle_notes", CallbackAction::Toggle("notes".into())),
            ("toggle_original", CallbackAction::Toggle("original".into())),
            ("menu_style", CallbackAction::Menu(MenuKind::Style)),
            ("menu_language", CallbackAction::Menu(MenuKind::Language)),
            ("menu_help", CallbackAction::Menu(MenuKind::Help)),
            ("reset_settings", CallbackAction::ResetSettings),
            ("style_info", CallbackAction::StyleInfo),
        ];
        for (raw, expected) in cases {
            assert_eq!(CallbackAction::decode(raw), expected, "{raw}");
            assert_eq!(expected.encode(), raw);
        }
    }

    #[test]
    fn unknown_payloads_are_unrecognized() {
        for raw in ["", "menu_admin", "reset", "theme_dark", "noseparator"] {
            assert_eq!(
                CallbackAction::decode(raw),
                CallbackAction::Unrecognized(raw.to_string())
            );
        }
    }

    #[test]
    fn unknown_values_still_decode_to_their_category() {
        // The store rejects these; decoding only routes by category.
        assert_eq!(
            CallbackAction::decode("style_poetic"),
            CallbackAction::SelectStyle("poetic".into())
        );
        assert_eq!(
            CallbackAction::decode("toggle_bold"),
            CallbackAction::Toggle("bold".into())
        );
    }
}
