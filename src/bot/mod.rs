//! Telegram transport: update routing, the text-translation flow and the
//! send/edit helpers shared by the command and callback handlers.

mod callback;
mod commands;
mod keyboards;
mod messages;

use std::sync::Arc;

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InlineKeyboardMarkup, MessageId, ParseMode};
use teloxide::utils::command::BotCommands;
use teloxide::{ApiError, RequestError};
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::error::{BotError, BotResult};
use crate::format;
use crate::metrics::MetricsRegistry;
use crate::preferences::{CallerId, PreferenceStore};
use crate::stats::{UsageAction, UsageTracker};
use crate::translate::{TranslateError, TranslationService};

pub use callback::{CallbackAction, MenuKind};
pub use commands::Command;

/// Characters of user text kept in log lines.
const LOG_PREVIEW_CHARS: usize = 50;

/// Shared handler state, injected into every endpoint.
pub struct BotState {
    pub config: BotConfig,
    pub preferences: Arc<dyn PreferenceStore>,
    pub usage: UsageTracker,
    pub translator: TranslationService,
    pub metrics: Arc<MetricsRegistry>,
}

/// Commands first, then plain text, then inline-button presses.
pub fn schema() -> UpdateHandler<RequestError> {
    let commands = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(commands::command_endpoint);

    let text = Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|t| !t.starts_with('/')))
        .endpoint(translate_endpoint);

    let callbacks = Update::filter_callback_query().endpoint(callback::callback_endpoint);

    dptree::entry()
        .branch(commands)
        .branch(text)
        .branch(callbacks)
}

async fn translate_endpoint(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if let Err(e) = handle_text(&bot, &msg, text, &state).await {
        report_failure(&bot, msg.chat.id, &e).await;
    }
    Ok(())
}

pub(crate) fn caller_of(msg: &Message) -> CallerId {
    msg.from
        .as_ref()
        .map(|u| u.id.0)
        .unwrap_or(msg.chat.id.0.unsigned_abs())
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    if text.chars().nth(LOG_PREVIEW_CHARS).is_some() {
        out.push_str("...");
    }
    out
}

async fn handle_text(bot: &Bot, msg: &Message, text: &str, state: &BotState) -> BotResult<()> {
    let chat_id = msg.chat.id;
    let caller = caller_of(msg);

    if let Err(TranslateError::TooLong { max, actual }) = state.translator.check_length(text) {
        info!(caller, actual, max, "message rejected: too long");
        send_markdown(bot, chat_id, messages::too_long(max, actual), None).await?;
        return Ok(());
    }

    state.usage.record(caller, UsageAction::Translation);
    let preferences = state.preferences.get(caller);
    info!(
        caller,
        style = %preferences.style_key,
        language = %preferences.target_language_code,
        text = %preview(text),
        "translation requested"
    );

    let placeholder = send_markdown(bot, chat_id, messages::translating(), None).await?;
    if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
        debug!(error = %e, "typing indicator failed");
    }

    let outcome = state
        .translator
        .translate(text, &preferences)
        .await
        .map(|result| result.translated_text);
    let reply = format::format_reply(&outcome, &preferences, text);

    if let Err(e) = bot.delete_message(chat_id, placeholder.id).await {
        warn!(error = %e, "could not delete placeholder");
    }
    send_markdown(bot, chat_id, reply, None).await?;
    Ok(())
}

#[allow(deprecated)]
fn legacy_markdown() -> ParseMode {
    ParseMode::Markdown
}

/// Send with legacy Markdown; if Telegram rejects the entities, resend as
/// plain text so the caller still gets the content.
pub(crate) async fn send_markdown(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    markup: Option<InlineKeyboardMarkup>,
) -> ResponseResult<Message> {
    let text = text.into();
    let mut request = bot
        .send_message(chat_id, text.clone())
        .parse_mode(legacy_markdown());
    if let Some(markup) = markup.clone() {
        request = request.reply_markup(markup);
    }
    match request.await {
        Err(RequestError::Api(e)) => {
            debug!(error = %e, "markdown rejected, resending as plain text");
            let mut plain = bot.send_message(chat_id, text);
            if let Some(markup) = markup {
                plain = plain.reply_markup(markup);
            }
            plain.await
        }
        other => other,
    }
}

/// Edit a message in place. "Message is not modified" is not an error.
pub(crate) async fn edit_markdown(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: impl Into<String>,
    markup: Option<InlineKeyboardMarkup>,
) -> ResponseResult<()> {
    let text = text.into();
    let mut request = bot
        .edit_message_text(chat_id, message_id, text.clone())
        .parse_mode(legacy_markdown());
    if let Some(markup) = markup.clone() {
        request = request.reply_markup(markup);
    }
    let retry = match request.await {
        Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => return Ok(()),
        Err(RequestError::Api(e)) => {
            debug!(error = %e, "markdown edit rejected, retrying as plain text");
            let mut plain = bot.edit_message_text(chat_id, message_id, text);
            if let Some(markup) = markup {
                plain = plain.reply_markup(markup);
            }
            plain.await
        }
        Err(e) => return Err(e),
    };
    match retry {
        Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Log the failure and answer with the generic error text. Internal detail
/// stays in the log.
pub(crate) async fn report_failure(bot: &Bot, chat_id: ChatId, failure: &BotError) {
    error!(chat_id = chat_id.0, error = %failure, "handler failed");
    if let Err(e) = send_markdown(bot, chat_id, messages::generic_error(), None).await {
        warn!(chat_id = chat_id.0, error = %e, "could not deliver error notice");
    }
}

/// Register the command list, then poll until Ctrl-C.
pub async fn run_dispatcher(bot: Bot, state: Arc<BotState>) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "could not register bot commands");
    }

    info!("dispatcher starting");
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .default_handler(|update| async move {
            debug!(update_id = ?update.id, "unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "error in update handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    info!("dispatcher stopped");
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter;
/// `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("polyglot_bot=info,teloxide=warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundary() {
        let short = "Xin chào";
        assert_eq!(preview(short), short);

        let long: String = "ế".repeat(80);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), LOG_PREVIEW_CHARS + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn schema_builds() {
        let _ = schema();
    }
}
