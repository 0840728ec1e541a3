//! Slash commands.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use super::{caller_of, keyboards, messages, report_failure, send_markdown, BotState};
use crate::error::BotResult;
use crate::preferences::PreferenceError;
use crate::stats::UsageAction;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Các lệnh được hỗ trợ:")]
pub enum Command {
    #[command(description = "khởi động bot")]
    Start,
    #[command(description = "hướng dẫn chi tiết")]
    Help,
    #[command(description = "thông tin bot")]
    About,
    #[command(description = "chọn phong cách dịch")]
    Style,
    #[command(description = "chọn ngôn ngữ đích")]
    Language,
    #[command(description = "tùy chỉnh cài đặt")]
    Settings,
    #[command(description = "điều chỉnh độ sáng tạo (0.1-1.0)")]
    Temp(String),
    #[command(description = "xem thống kê sử dụng")]
    Stats,
    #[command(description = "đặt lại cài đặt mặc định")]
    Reset,
    #[command(description = "thống kê hệ thống (admin)")]
    Admin,
}

/// Outcome of a `/temp` argument.
#[derive(Debug, Clone, PartialEq)]
pub enum TempArgument {
    Missing,
    NotANumber,
    Value(f64),
}

pub fn parse_temp_argument(raw: &str) -> TempArgument {
    let raw = raw.trim();
    if raw.is_empty() {
        return TempArgument::Missing;
    }
    match raw.replace(',', ".").parse::<f64>() {
        Ok(value) => TempArgument::Value(value),
        Err(_) => TempArgument::NotANumber,
    }
}

/// Dispatcher endpoint for parsed commands.
pub(crate) async fn command_endpoint(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    if let Err(e) = handle_command(&bot, &msg, cmd, &state).await {
        report_failure(&bot, msg.chat.id, &e).await;
    }
    Ok(())
}

async fn handle_command(bot: &Bot, msg: &Message, cmd: Command, state: &BotState) -> BotResult<()> {
    let chat_id = msg.chat.id;
    let caller = caller_of(msg);
    state.usage.record(caller, UsageAction::Command);
    debug!(caller, command = ?cmd, "command received");

    match cmd {
        Command::Start => {
            let first_name = msg.from.as_ref().map(|u| u.first_name.as_str()).unwrap_or("");
            send_markdown(
                bot,
                chat_id,
                messages::welcome(first_name),
                Some(keyboards::start_menu()),
            )
            .await?;
        }
        Command::Help => {
            let text = messages::help(state.translator.max_message_length());
            send_markdown(bot, chat_id, text, None).await?;
        }
        Command::About => {
            let text = messages::about(&state.config.completion.model);
            send_markdown(bot, chat_id, text, None).await?;
        }
        Command::Style => {
            let prefs = state.preferences.get(caller);
            send_markdown(
                bot,
                chat_id,
                messages::style_menu_title(),
                Some(keyboards::style_menu(&prefs.style_key)),
            )
            .await?;
        }
        Command::Language => {
            let prefs = state.preferences.get(caller);
            send_markdown(
                bot,
                chat_id,
                messages::language_menu_title(),
                Some(keyboards::language_menu(&prefs.target_language_code)),
            )
            .await?;
        }
        Command::Settings => {
            let prefs = state.preferences.get(caller);
            send_markdown(
                bot,
                chat_id,
                messages::settings(&prefs),
                Some(keyboards::settings_menu(&prefs)),
            )
            .await?;
        }
        Command::Temp(raw) => {
            let reply = match parse_temp_argument(&raw) {
                TempArgument::Missing => {
                    messages::temp_usage(state.preferences.get(caller).temperature)
                }
                TempArgument::NotANumber => messages::temp_invalid().to_string(),
                TempArgument::Value(value) => {
                    match state.preferences.set_temperature(caller, value) {
                        Ok(stored) => messages::temp_set(stored),
                        Err(PreferenceError::OutOfRange(_)) => {
                            messages::temp_out_of_range().to_string()
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            };
            send_markdown(bot, chat_id, reply, None).await?;
        }
        Command::Stats => {
            let reply = if !state.usage.is_enabled() {
                messages::stats_disabled().to_string()
            } else {
                match state.usage.get(caller) {
                    Some(stats) => messages::stats(&stats, &state.preferences.get(caller)),
                    None => messages::stats_empty().to_string(),
                }
            };
            send_markdown(bot, chat_id, reply, None).await?;
        }
        Command::Reset => {
            state.preferences.reset(caller);
            send_markdown(bot, chat_id, messages::reset_done(), None).await?;
        }
        Command::Admin => {
            let reply = if state.config.is_admin(caller) {
                info!(caller, "admin report requested");
                messages::admin_report(&state.usage.summary(), &state.metrics.summary())
            } else {
                messages::admin_denied().to_string()
            };
            send_markdown(bot, chat_id, reply, None).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_commands() {
        assert_eq!(Command::parse("/start", "polyglot_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/stats", "polyglot_bot").unwrap(), Command::Stats);
        assert_eq!(
            Command::parse("/temp 0.5", "polyglot_bot").unwrap(),
            Command::Temp("0.5".into())
        );
        assert!(Command::parse("/translate", "polyglot_bot").is_err());
    }

    #[test]
    fn temp_argument_forms() {
        assert_eq!(parse_temp_argument("  "), TempArgument::Missing);
        assert_eq!(parse_temp_argument("0.5"), TempArgument::Value(0.5));
        assert_eq!(parse_temp_argument(" 0,7 "), TempArgument::Value(0.7));
        assert_eq!(parse_temp_argument("1.5"), TempArgument::Value(1.5));
        assert_eq!(parse_temp_argument("hot"), TempArgument::NotANumber);
    }

    #[test]
    fn every_command_has_a_description() {
        let descriptions = Command::descriptions().to_string();
        for name in ["/start", "/help", "/temp", "/reset", "/admin"] {
            assert!(descriptions.contains(name), "{name}");
        }
    }
}
