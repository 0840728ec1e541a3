//! Crate-level error type. Handlers return it; the dispatcher boundary in
//! `bot` logs it and answers the caller instead of letting it escape.

use crate::config::ConfigError;
use crate::preferences::PreferenceError;
use crate::translate::TranslateError;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Preference(#[from] PreferenceError),
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

pub type BotResult<T> = Result<T, BotError>;
